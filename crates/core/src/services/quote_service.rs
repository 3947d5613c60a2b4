use std::collections::HashMap;

use futures::stream::{self, StreamExt};

use crate::errors::CoreError;
use crate::providers::traits::{Quote, QuoteProvider};

/// Fetches quotes through an ordered provider chain with automatic
/// fallback.
///
/// Tries providers in registration order: if the primary fails
/// (markup change, rate limit, network), the next one gets the symbol.
/// Batches fan out with bounded concurrency so a slow upstream page
/// never sees the whole portfolio at once.
pub struct QuoteService {
    providers: Vec<Box<dyn QuoteProvider>>,
    concurrency: usize,
}

impl QuoteService {
    pub fn new(providers: Vec<Box<dyn QuoteProvider>>, concurrency: usize) -> Self {
        Self {
            providers,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch one symbol, trying providers in order. An accepted price
    /// must be finite and non-negative.
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        let mut last_error = None;

        for provider in &self.providers {
            match provider.fetch_quote(symbol).await {
                Ok(quote) if quote.price.is_finite() && quote.price >= 0.0 => {
                    tracing::info!(
                        symbol,
                        provider = provider.name(),
                        price = quote.price,
                        "fetched quote"
                    );
                    return Ok(quote);
                }
                Ok(quote) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!("invalid price {} for {symbol}", quote.price),
                    });
                }
                Err(e) => {
                    tracing::debug!(
                        symbol,
                        provider = provider.name(),
                        error = %e,
                        "provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(CoreError::PriceFetchFailed {
            symbol: symbol.to_string(),
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no providers registered".into()),
        })
    }

    /// Fetch a batch of symbols. Per-symbol failures are logged and
    /// skipped, never aborting the batch; results are keyed by symbol
    /// so the fold step is deterministic regardless of completion order.
    pub async fn fetch_many(&self, symbols: &[String]) -> HashMap<String, Quote> {
        let results: Vec<(String, Result<Quote, CoreError>)> = stream::iter(symbols)
            .map(|symbol| async move { (symbol.clone(), self.fetch_quote(symbol).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut quotes = HashMap::new();
        for (symbol, result) in results {
            match result {
                Ok(quote) => {
                    quotes.insert(symbol, quote);
                }
                Err(e) => {
                    tracing::warn!(symbol = %symbol, error = %e, "price fetch failed, keeping stored price");
                }
            }
        }
        quotes
    }
}
