use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;

use super::traits::{Quote, QuoteProvider};
use crate::config::Config;
use crate::errors::CoreError;

/// Yahoo Finance fallback for stock quotes.
///
/// - **Free**: no API key (unofficial public endpoints, via the
///   `yahoo_finance_api` crate).
/// - **Symbols**: Yahoo spells tickers differently from the
///   `CODE:MARKET` convention used everywhere else, so the symbol is
///   reformatted before the lookup (`2330:TPE` → `2330.TW`,
///   `6488:TWO` → `6488.TWO`, US tickers drop the market suffix).
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
    timezone: Tz,
}

impl YahooFinanceProvider {
    pub fn new(config: &Config) -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self {
            connector,
            timezone: config.display_timezone,
        })
    }
}

/// Reformat a `CODE:MARKET` symbol into Yahoo's convention.
pub fn to_yahoo_symbol(symbol: &str) -> String {
    match symbol.split_once(':') {
        Some((code, "TPE")) => format!("{code}.TW"),
        Some((code, "TWO")) => format!("{code}.TWO"),
        Some((code, _)) => code.to_string(),
        None => symbol.to_string(),
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        let yahoo_symbol = to_yahoo_symbol(symbol);

        let resp = self
            .connector
            .get_latest_quotes(&yahoo_symbol, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to fetch latest quote for {yahoo_symbol}: {e}"),
            })?;

        let quote = resp.last_quote().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("No quote data for {yahoo_symbol}: {e}"),
        })?;

        Ok(Quote {
            price: quote.close,
            timestamp: Utc::now().with_timezone(&self.timezone).to_rfc3339(),
        })
    }
}
