use crate::errors::CoreError;
use crate::providers::traits::ExchangeRateSource;

/// Refreshes a currency pair through an ordered source chain, first
/// success wins. Same fallback shape as the quote service.
pub struct RateService {
    sources: Vec<Box<dyn ExchangeRateSource>>,
}

impl RateService {
    pub fn new(sources: Vec<Box<dyn ExchangeRateSource>>) -> Self {
        Self { sources }
    }

    /// Fetch the rate for a `BASE-TARGET` pair. An accepted rate must
    /// be finite and positive.
    pub async fn fetch_rate(&self, pair: &str) -> Result<f64, CoreError> {
        let mut last_error = None;

        for source in &self.sources {
            match source.fetch_rate(pair).await {
                Ok(rate) if rate.is_finite() && rate > 0.0 => {
                    tracing::info!(pair, source = source.name(), rate, "fetched exchange rate");
                    return Ok(rate);
                }
                Ok(rate) => {
                    last_error = Some(CoreError::Api {
                        provider: source.name().to_string(),
                        message: format!("invalid rate {rate} for {pair}"),
                    });
                }
                Err(e) => {
                    tracing::debug!(
                        pair,
                        source = source.name(),
                        error = %e,
                        "rate source failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(CoreError::RateFetchFailed {
            pair: pair.to_string(),
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no sources registered".into()),
        })
    }
}
