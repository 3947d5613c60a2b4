use serde::{Deserialize, Serialize};

use super::holding::Holding;
use crate::errors::CoreError;

/// The persisted portfolio document.
///
/// JSON field names — including the space in `"exchange rate"` — are
/// the storage contract shared with the remote copy; do not rename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioDocument {
    /// Home-currency units per one foreign-currency unit, formatted to
    /// 2 decimals.
    #[serde(rename = "exchange rate")]
    pub exchange_rate: String,

    /// When the exchange rate was last refreshed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_rate_updated: Option<String>,

    /// Home-currency sum of all holdings' converted values.
    #[serde(rename = "totalValue")]
    pub total_value: f64,

    /// Holdings in display order.
    pub stocks: Vec<Holding>,
}

impl PortfolioDocument {
    /// Parse the stored rate string.
    pub fn parsed_exchange_rate(&self) -> Result<f64, CoreError> {
        self.exchange_rate
            .trim()
            .parse()
            .map_err(|e| CoreError::Deserialization(format!(
                "stored exchange rate {:?} is not a number: {e}",
                self.exchange_rate
            )))
    }

    /// Record a freshly fetched rate, keeping the 2-decimal string form.
    pub fn set_exchange_rate(&mut self, rate: f64, updated: String) {
        self.exchange_rate = format!("{rate:.2}");
        self.exchange_rate_updated = Some(updated);
    }
}
