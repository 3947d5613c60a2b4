use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};

use super::calendar::{market_from_symbol, MarketCalendar};
use crate::errors::CoreError;

/// Which boundary ends a closed-market grace period.
///
/// Two policies have been in production use: the market-aware
/// session-close rule (primary) and a flat age window. Both stay
/// selectable rather than hardcoding one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalenessBoundary {
    /// Refresh once after the most recent session close, to capture
    /// the final price of the day.
    SessionClose,
    /// Refresh whenever the last update is older than the window.
    MaxAge(Duration),
}

/// Decides whether a holding's recorded price is old enough, relative
/// to market hours, to warrant a fresh fetch.
///
/// `should_update` never fails: lookup or parse problems answer "yes",
/// so a misconfigured holding cannot silently freeze its price forever.
pub struct StalenessPolicy {
    calendar: MarketCalendar,
    boundary: StalenessBoundary,
}

impl StalenessPolicy {
    pub fn new(calendar: MarketCalendar, boundary: StalenessBoundary) -> Self {
        Self { calendar, boundary }
    }

    pub fn calendar(&self) -> &MarketCalendar {
        &self.calendar
    }

    /// Whether `symbol` needs a price refresh now.
    pub fn should_update(&self, symbol: &str, last_updated: Option<&str>, force: bool) -> bool {
        self.should_update_at(symbol, last_updated, force, Utc::now())
    }

    /// Clock-injected variant of [`should_update`](Self::should_update).
    ///
    /// Rules, in order: force wins unconditionally; a holding that was
    /// never updated refreshes; an open market always refreshes; a
    /// closed market refreshes once past the configured boundary; any
    /// failure along the way fails open toward freshness.
    pub fn should_update_at(
        &self,
        symbol: &str,
        last_updated: Option<&str>,
        force: bool,
        now: DateTime<Utc>,
    ) -> bool {
        if force {
            return true;
        }
        let Some(raw) = last_updated else {
            return true;
        };
        match self.evaluate(symbol, raw, now) {
            Ok(stale) => stale,
            Err(e) => {
                tracing::debug!(symbol, error = %e, "freshness check failed, refreshing");
                true
            }
        }
    }

    fn evaluate(&self, symbol: &str, raw: &str, now: DateTime<Utc>) -> Result<bool, CoreError> {
        let market = market_from_symbol(symbol)?;
        if self.calendar.is_open(&market, now)? {
            return Ok(true);
        }

        let last = self.parse_last_updated(&market, raw)?;
        match self.boundary {
            StalenessBoundary::MaxAge(window) => Ok(now - last > window),
            StalenessBoundary::SessionClose => {
                let close = self.calendar.session_close(&market, now)?;
                Ok(last < close)
            }
        }
    }

    /// Parse a stored `lastUpdated` value. Timestamps without an
    /// explicit offset are assumed to be in the market's own timezone.
    fn parse_last_updated(&self, market: &str, raw: &str) -> Result<DateTime<Utc>, CoreError> {
        if let Ok(aware) = DateTime::parse_from_rfc3339(raw) {
            return Ok(aware.with_timezone(&Utc));
        }

        let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
            .map_err(|e| CoreError::InvalidTimestamp {
                value: raw.to_string(),
                message: e.to_string(),
            })?;

        let tz = self.calendar.timezone_of(market)?;
        tz.from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| CoreError::InvalidTimestamp {
                value: raw.to_string(),
                message: format!("nonexistent local time in {}", tz.name()),
            })
    }
}
