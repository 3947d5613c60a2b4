use serde::{Deserialize, Serialize};

/// One portfolio line item.
///
/// Field names follow the on-disk JSON contract. `lastUpdated` is kept
/// as a raw string: a malformed timestamp must degrade to "needs
/// refresh" at the staleness check, not fail the whole document load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker in `CODE:MARKET` form, e.g. `AAPL:NASDAQ` or `2330:TPE`.
    pub name: String,

    /// Most recent known trade/close price, in `currency` units.
    pub price: f64,

    /// Shares/units held.
    pub quantity: f64,

    /// Currency code of `price` (`USD`, `TWD`, ...).
    pub currency: String,

    /// When `price` was last refreshed (ISO-8601 with offset).
    #[serde(rename = "lastUpdated", default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    /// Share of the portfolio total, recomputed every valuation pass.
    #[serde(rename = "percentageOfTotal", default)]
    pub percentage_of_total: f64,
}

impl Holding {
    /// Value of this holding in the home currency: the identity
    /// multiplier for home-currency holdings, the exchange rate for
    /// everything else.
    pub fn value_in_home(&self, home_currency: &str, exchange_rate: f64) -> f64 {
        let value = self.price * self.quantity;
        if self.currency == home_currency {
            value
        } else {
            value * exchange_rate
        }
    }
}
