use async_trait::async_trait;

use crate::errors::CoreError;

/// A fetched price with the instant it was taken (ISO-8601 with offset).
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub price: f64,
    pub timestamp: String,
}

/// Trait abstraction for current-price sources.
///
/// Each upstream page or API implements this trait; the quote service
/// tries them in registration order, and the rest of the codebase never
/// learns which one answered. If a source stops working or changes its
/// markup, we replace only that one implementation.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Current price for a `CODE:MARKET` symbol.
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, CoreError>;
}

/// Trait abstraction for currency-pair rate sources
/// (`"USD-TWD"` → home units per foreign unit).
#[async_trait]
pub trait ExchangeRateSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Current rate for a `BASE-TARGET` pair.
    async fn fetch_rate(&self, pair: &str) -> Result<f64, CoreError>;
}

/// Split a `BASE-TARGET` pair string into uppercased halves.
pub fn split_pair(pair: &str) -> Result<(String, String), CoreError> {
    pair.split_once('-')
        .filter(|(base, target)| !base.is_empty() && !target.is_empty())
        .map(|(base, target)| (base.to_uppercase(), target.to_uppercase()))
        .ok_or_else(|| CoreError::InvalidSymbol(pair.to_string()))
}
