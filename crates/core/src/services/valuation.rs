use crate::models::holding::Holding;

/// Recomputes the portfolio total and per-holding percentages.
///
/// Pure arithmetic, no I/O: home-currency holdings use the identity
/// multiplier, everything else converts at the supplied rate, and
/// percentages round to 2 decimals. A zero total (empty portfolio, or
/// all zero-valued holdings) assigns 0% everywhere rather than
/// dividing by zero. Running it twice on unchanged inputs yields
/// identical results.
pub struct ValuationEngine {
    home_currency: String,
}

impl ValuationEngine {
    pub fn new(home_currency: impl Into<String>) -> Self {
        Self {
            home_currency: home_currency.into(),
        }
    }

    /// Revalue in place; returns the new total in the home currency.
    pub fn revalue(&self, holdings: &mut [Holding], exchange_rate: f64) -> f64 {
        let total: f64 = holdings
            .iter()
            .map(|h| h.value_in_home(&self.home_currency, exchange_rate))
            .sum();

        for holding in holdings.iter_mut() {
            holding.percentage_of_total = if total > 0.0 {
                let value = holding.value_in_home(&self.home_currency, exchange_rate);
                round2(100.0 * value / total)
            } else {
                0.0
            };
        }

        total
    }
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
