use serde::Serialize;

use crate::models::holding::Holding;

/// One allocation slice, ready for an external chart frontend.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationPoint {
    pub symbol: String,
    pub value_home: f64,
    pub percentage: f64,
}

/// Produces chart-ready data; rendering is left to the caller.
pub struct ChartService {
    home_currency: String,
}

impl ChartService {
    pub fn new(home_currency: impl Into<String>) -> Self {
        Self {
            home_currency: home_currency.into(),
        }
    }

    /// Allocation breakdown, largest slice first.
    pub fn allocation(&self, holdings: &[Holding], exchange_rate: f64) -> Vec<AllocationPoint> {
        let mut points: Vec<AllocationPoint> = holdings
            .iter()
            .map(|holding| AllocationPoint {
                symbol: holding.name.clone(),
                value_home: holding.value_in_home(&self.home_currency, exchange_rate),
                percentage: holding.percentage_of_total,
            })
            .collect();

        points.sort_by(|a, b| {
            b.percentage
                .partial_cmp(&a.percentage)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        points
    }
}
