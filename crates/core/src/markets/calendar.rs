use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::errors::CoreError;

/// US equities trade 09:30–16:00 America/New_York; the calendar
/// converts that window into the market's reference timezone per date,
/// so daylight-saving shifts fall out of the timezone database instead
/// of a hardcoded offset pair.
const US_SESSION_OPEN: (u32, u32) = (9, 30);
const US_SESSION_CLOSE: (u32, u32) = (16, 0);

const WEEKDAYS: &[Weekday] = &[
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// Resolve the market code of a `CODE:MARKET` symbol, applying the
/// market-mapping table. Exactly one `:` separator is required.
pub fn market_from_symbol(symbol: &str) -> Result<String, CoreError> {
    let parts: Vec<&str> = symbol.split(':').collect();
    match parts.as_slice() {
        [code, market] if !code.is_empty() && !market.is_empty() => {
            Ok(map_market(market).to_string())
        }
        _ => Err(CoreError::InvalidSymbol(symbol.to_string())),
    }
}

/// Market-mapping table: `NYSE` and `NYSEARCA` share `NASDAQ`'s
/// US-session calendar; `TPE` and `TWO` keep distinct local calendars;
/// unrecognized codes pass through unchanged (and fail calendar lookup).
pub fn map_market(market: &str) -> &str {
    match market {
        "NYSE" | "NYSEARCA" => "NASDAQ",
        other => other,
    }
}

/// Whether a market code resolves to the US equity session.
pub fn is_us_market(market: &str) -> bool {
    map_market(market) == "NASDAQ"
}

/// How a market's daily session is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Session {
    /// Fixed local open/close pair.
    Fixed { open: NaiveTime, close: NaiveTime },
    /// The dynamic US-Eastern session rendered into the market's
    /// reference timezone. In Asia/Taipei this window crosses midnight,
    /// so the wrap-around comparison below is live, not theoretical.
    UsEquity,
}

#[derive(Debug, Clone)]
struct MarketSpec {
    timezone: Tz,
    trading_days: &'static [Weekday],
    session: Session,
}

/// Trading-hours calendar for the registered markets.
pub struct MarketCalendar {
    markets: HashMap<&'static str, MarketSpec>,
}

impl MarketCalendar {
    pub fn new() -> Self {
        let mut markets = HashMap::new();

        // Taiwan Stock Exchange
        markets.insert(
            "TPE",
            MarketSpec {
                timezone: chrono_tz::Asia::Taipei,
                trading_days: WEEKDAYS,
                session: Session::Fixed {
                    open: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
                    close: NaiveTime::from_hms_opt(13, 30, 0).expect("valid time"),
                },
            },
        );

        // Taipei Exchange (OTC)
        markets.insert(
            "TWO",
            MarketSpec {
                timezone: chrono_tz::Asia::Taipei,
                trading_days: WEEKDAYS,
                session: Session::Fixed {
                    open: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
                    close: NaiveTime::from_hms_opt(13, 30, 0).expect("valid time"),
                },
            },
        );

        // NASDAQ (also NYSE/NYSEARCA via the mapping table). The
        // timezone here is the reference zone the US session is
        // rendered into, not the exchange's own.
        markets.insert(
            "NASDAQ",
            MarketSpec {
                timezone: chrono_tz::Asia::Taipei,
                trading_days: WEEKDAYS,
                session: Session::UsEquity,
            },
        );

        Self { markets }
    }

    fn spec(&self, market: &str) -> Result<&MarketSpec, CoreError> {
        self.markets
            .get(map_market(market))
            .ok_or_else(|| CoreError::UnknownMarket(market.to_string()))
    }

    /// The timezone timestamps for this market are interpreted in when
    /// they carry no explicit offset.
    pub fn timezone_of(&self, market: &str) -> Result<Tz, CoreError> {
        Ok(self.spec(market)?.timezone)
    }

    /// Open/close times of the market's session on the given instant's
    /// date, expressed in the market's (reference) timezone.
    pub fn session_bounds(
        &self,
        market: &str,
        instant: DateTime<Utc>,
    ) -> Result<(NaiveTime, NaiveTime), CoreError> {
        let spec = self.spec(market)?;
        match spec.session {
            Session::Fixed { open, close } => Ok((open, close)),
            Session::UsEquity => us_session_bounds(spec.timezone, instant),
        }
    }

    /// Whether the market is trading at `instant`. Open/close bounds
    /// are inclusive on both ends; a session whose close precedes its
    /// open wraps across midnight and is checked with a logical OR.
    pub fn is_open(&self, market: &str, instant: DateTime<Utc>) -> Result<bool, CoreError> {
        let spec = self.spec(market)?;
        let local = instant.with_timezone(&spec.timezone);
        if !spec.trading_days.contains(&local.weekday()) {
            return Ok(false);
        }

        let (open, close) = self.session_bounds(market, instant)?;
        let now = local.time();
        if close < open {
            Ok(now >= open || now <= close)
        } else {
            Ok(open <= now && now <= close)
        }
    }

    /// The session-close instant on the instant's calendar date in the
    /// market's timezone. This is the staleness reference boundary: a
    /// price last updated before it still needs one post-close refresh.
    pub fn session_close(
        &self,
        market: &str,
        instant: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, CoreError> {
        let spec = self.spec(market)?;
        let (_, close) = self.session_bounds(market, instant)?;
        let local_date = instant.with_timezone(&spec.timezone).date_naive();
        let close_local = localize(spec.timezone, local_date, close)?;
        Ok(close_local.with_timezone(&Utc))
    }

    /// Human-readable trading hours for display, computed for `instant`.
    pub fn trading_hours_description_at(
        &self,
        market: &str,
        instant: DateTime<Utc>,
    ) -> Result<String, CoreError> {
        let spec = self.spec(market)?;
        let (open, close) = self.session_bounds(market, instant)?;
        let window = format!(
            "{}-{} ({})",
            open.format("%H:%M"),
            close.format("%H:%M"),
            spec.timezone.name()
        );
        match spec.session {
            Session::Fixed { .. } => Ok(window),
            Session::UsEquity => Ok(format!("{window}, 09:30-16:00 US Eastern")),
        }
    }

    /// Human-readable trading hours as of now.
    pub fn trading_hours_description(&self, market: &str) -> Result<String, CoreError> {
        self.trading_hours_description_at(market, Utc::now())
    }
}

impl Default for MarketCalendar {
    fn default() -> Self {
        Self::new()
    }
}

/// The US-Eastern 09:30–16:00 session for the instant's Eastern date,
/// rendered into `reference` local times.
fn us_session_bounds(
    reference: Tz,
    instant: DateTime<Utc>,
) -> Result<(NaiveTime, NaiveTime), CoreError> {
    let eastern = chrono_tz::America::New_York;
    let trading_date = instant.with_timezone(&eastern).date_naive();

    let (open_h, open_m) = US_SESSION_OPEN;
    let (close_h, close_m) = US_SESSION_CLOSE;
    let open_time = NaiveTime::from_hms_opt(open_h, open_m, 0).expect("valid time");
    let close_time = NaiveTime::from_hms_opt(close_h, close_m, 0).expect("valid time");

    let open = localize(eastern, trading_date, open_time)?;
    let close = localize(eastern, trading_date, close_time)?;

    Ok((
        open.with_timezone(&reference).time(),
        close.with_timezone(&reference).time(),
    ))
}

/// Resolve a wall-clock date+time in `tz` to an instant. Times falling
/// into a DST gap or fold take the earliest valid interpretation.
fn localize(tz: Tz, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Tz>, CoreError> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .ok_or_else(|| CoreError::InvalidTimestamp {
            value: format!("{date} {time}"),
            message: format!("nonexistent local time in {}", tz.name()),
        })
}
