use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;
use reqwest::Client;
use scraper::{Html, Selector};

use super::traits::{ExchangeRateSource, Quote, QuoteProvider};
use crate::config::Config;
use crate::errors::CoreError;

/// Google Finance quote-page scraper: primary source for both stock
/// prices and currency-pair rates.
///
/// - **Free**: public HTML pages, no API key.
/// - **Symbols**: native `CODE:MARKET` form, no reformatting needed.
/// - **Rates**: the same page layout serves `USD-TWD` style pairs.
///
/// The page embeds the last trade price as a `data-last-price`
/// attribute; everything else in the document is ignored.
pub struct GoogleFinanceProvider {
    client: Client,
    base_url: String,
    timezone: Tz,
}

impl GoogleFinanceProvider {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: config.finance_base_url.trim_end_matches('/').to_string(),
            timezone: config.display_timezone,
        }
    }

    async fn fetch_last_price(&self, quote_path: &str) -> Result<f64, CoreError> {
        let url = format!("{}/{quote_path}", self.base_url);
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        extract_last_price(&body).ok_or_else(|| CoreError::Api {
            provider: "Google Finance".into(),
            message: format!("no last-price element on quote page for {quote_path}"),
        })
    }
}

/// Pull the `data-last-price` attribute out of a quote page.
pub fn extract_last_price(html: &str) -> Option<f64> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("div[data-last-price]").ok()?;
    document
        .select(&selector)
        .next()?
        .value()
        .attr("data-last-price")?
        .parse()
        .ok()
}

#[async_trait]
impl QuoteProvider for GoogleFinanceProvider {
    fn name(&self) -> &str {
        "Google Finance"
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        let price = self.fetch_last_price(symbol).await?;
        Ok(Quote {
            price,
            timestamp: Utc::now().with_timezone(&self.timezone).to_rfc3339(),
        })
    }
}

#[async_trait]
impl ExchangeRateSource for GoogleFinanceProvider {
    fn name(&self) -> &str {
        "Google Finance"
    }

    async fn fetch_rate(&self, pair: &str) -> Result<f64, CoreError> {
        let rate = self.fetch_last_price(pair).await?;
        // Stored downstream as a 2-decimal string.
        Ok((rate * 100.0).round() / 100.0)
    }
}
