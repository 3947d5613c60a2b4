use std::collections::BTreeMap;

use serde::Serialize;

use super::holding::Holding;

/// Open/closed state of one market, with its trading-hours description
/// for display.
#[derive(Debug, Clone, Serialize)]
pub struct MarketStatus {
    pub open: bool,
    pub hours: String,
}

/// One entry in the percentage-ranked holding listing.
#[derive(Debug, Clone, Serialize)]
pub struct HoldingRank {
    pub symbol: String,
    pub percentage: f64,
    pub value_home: f64,
}

/// Per-currency slice of the portfolio: how much is held in each
/// currency and what share of the total it represents.
#[derive(Debug, Clone, Serialize)]
pub struct CurrencySlice {
    pub currency: String,
    pub count: usize,
    pub value_native: f64,
    pub value_home: f64,
    pub percentage: f64,
}

/// Everything the presentation layer needs to describe one
/// reconciliation pass. Produced by the engine; rendering is the
/// caller's concern.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    /// Open/closed status of every distinct market touched.
    pub market_status: BTreeMap<String, MarketStatus>,

    /// Symbols that were flagged for a price refresh.
    pub requested: Vec<String>,

    /// Refreshed holdings trading on a US-session market.
    pub refreshed_us: usize,

    /// Refreshed holdings trading on a local market.
    pub refreshed_local: usize,

    /// Symbols whose price fetch failed; their stored prices were kept.
    pub failed: Vec<String>,

    /// Exchange rate the pass valued with.
    pub exchange_rate: f64,

    /// Whether the rate came from a live fetch or the stored fallback.
    pub rate_refreshed: bool,

    pub old_total: f64,
    pub new_total: f64,

    /// Whether the document was written back this pass.
    pub persisted: bool,

    /// Holdings ranked by descending percentage of total.
    pub rankings: Vec<HoldingRank>,

    /// Value split by holding currency.
    pub currency_distribution: Vec<CurrencySlice>,

    /// Post-pass holdings snapshot, in display order.
    pub holdings: Vec<Holding>,
}

impl ReconciliationReport {
    /// Total number of holdings whose price was refreshed.
    pub fn refreshed_total(&self) -> usize {
        self.refreshed_us + self.refreshed_local
    }
}
