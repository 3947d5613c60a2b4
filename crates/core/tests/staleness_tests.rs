// ═══════════════════════════════════════════════════════════════════
// Staleness Policy Tests — force override, session-close boundary,
// age-window boundary, fail-open behavior
// ═══════════════════════════════════════════════════════════════════

use chrono::{DateTime, Duration, TimeZone, Utc};

use stock_tracker_core::markets::calendar::MarketCalendar;
use stock_tracker_core::markets::staleness::{StalenessBoundary, StalenessPolicy};

fn session_close_policy() -> StalenessPolicy {
    StalenessPolicy::new(MarketCalendar::new(), StalenessBoundary::SessionClose)
}

fn max_age_policy(hours: i64) -> StalenessPolicy {
    StalenessPolicy::new(
        MarketCalendar::new(),
        StalenessBoundary::MaxAge(Duration::hours(hours)),
    )
}

/// Build a UTC instant from a wall-clock time in Asia/Taipei.
fn taipei(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    chrono_tz::Asia::Taipei
        .with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .expect("unambiguous Taipei time")
        .with_timezone(&Utc)
}

// ═══════════════════════════════════════════════════════════════════
// Unconditional rules
// ═══════════════════════════════════════════════════════════════════

#[test]
fn force_always_wins() {
    let policy = session_close_policy();
    let now = taipei(2024, 7, 10, 15, 0);

    assert!(policy.should_update_at("2330:TPE", Some("2024-07-10T14:00:00+08:00"), true, now));
    assert!(policy.should_update_at("not-a-symbol", Some("garbage"), true, now));
    assert!(policy.should_update_at("0005:HKG", None, true, now));
}

#[test]
fn never_updated_holdings_always_refresh() {
    let policy = session_close_policy();
    let now = taipei(2024, 7, 10, 15, 0);

    assert!(policy.should_update_at("2330:TPE", None, false, now));
    assert!(policy.should_update_at("AAPL:NASDAQ", None, false, now));
}

#[test]
fn open_market_always_refreshes() {
    let policy = session_close_policy();
    // Wednesday 10:00 Taipei — TPE mid-session
    let now = taipei(2024, 7, 10, 10, 0);

    // Even a timestamp from one second ago refreshes while trading.
    assert!(policy.should_update_at("2330:TPE", Some("2024-07-10T09:59:59+08:00"), false, now));
}

// ═══════════════════════════════════════════════════════════════════
// Session-close boundary
// ═══════════════════════════════════════════════════════════════════

#[test]
fn closed_market_refreshes_once_after_the_close() {
    let policy = session_close_policy();
    // Wednesday 15:00 Taipei — TPE closed at 13:30
    let now = taipei(2024, 7, 10, 15, 0);

    // Last update mid-session predates the close: one more refresh due.
    assert!(policy.should_update_at("2330:TPE", Some("2024-07-10T10:00:00+08:00"), false, now));

    // Last update after the close: the closing price is already held.
    assert!(!policy.should_update_at("2330:TPE", Some("2024-07-10T14:00:00+08:00"), false, now));
}

#[test]
fn timestamps_without_offset_use_the_market_timezone() {
    let policy = session_close_policy();
    let now = taipei(2024, 7, 10, 15, 0);

    // Naive timestamps, interpreted as Asia/Taipei wall-clock.
    assert!(!policy.should_update_at("2330:TPE", Some("2024-07-10T14:00:00"), false, now));
    assert!(policy.should_update_at("2330:TPE", Some("2024-07-10 10:00:00"), false, now));
}

// ═══════════════════════════════════════════════════════════════════
// Age-window boundary
// ═══════════════════════════════════════════════════════════════════

#[test]
fn age_window_refreshes_only_old_prices() {
    let policy = max_age_policy(24);
    // Saturday 10:00 Taipei — market closed
    let now = taipei(2024, 7, 13, 10, 0);

    // 14 hours old: inside the window, no refresh.
    assert!(!policy.should_update_at("2330:TPE", Some("2024-07-12T20:00:00+08:00"), false, now));

    // 38 hours old: refresh.
    assert!(policy.should_update_at("2330:TPE", Some("2024-07-11T20:00:00+08:00"), false, now));
}

#[test]
fn age_window_still_refreshes_open_markets() {
    let policy = max_age_policy(24);
    // Wednesday 10:00 Taipei — TPE open; window does not matter.
    let now = taipei(2024, 7, 10, 10, 0);

    assert!(policy.should_update_at("2330:TPE", Some("2024-07-10T09:59:00+08:00"), false, now));
}

// ═══════════════════════════════════════════════════════════════════
// Fail-open behavior
// ═══════════════════════════════════════════════════════════════════

#[test]
fn unparseable_timestamp_fails_open() {
    let policy = session_close_policy();
    let now = taipei(2024, 7, 10, 15, 0);

    assert!(policy.should_update_at("2330:TPE", Some("not-a-date"), false, now));
    assert!(policy.should_update_at("2330:TPE", Some(""), false, now));
}

#[test]
fn unknown_market_fails_open() {
    let policy = session_close_policy();
    let now = taipei(2024, 7, 10, 15, 0);

    assert!(policy.should_update_at("0005:HKG", Some("2024-07-10T14:00:00+08:00"), false, now));
}

#[test]
fn malformed_symbol_fails_open() {
    let policy = session_close_policy();
    let now = taipei(2024, 7, 10, 15, 0);

    assert!(policy.should_update_at("AAPL", Some("2024-07-10T14:00:00+08:00"), false, now));
    assert!(policy.should_update_at("A:B:C", Some("2024-07-10T14:00:00+08:00"), false, now));
}

// ═══════════════════════════════════════════════════════════════════
// US market via the session-close boundary
// ═══════════════════════════════════════════════════════════════════

#[test]
fn us_market_refresh_follows_the_eastern_close() {
    let policy = session_close_policy();
    // Thursday 12:00 Taipei in July: NASDAQ closed (session ended 04:00
    // Taipei); today's reference close is Thursday 04:00 Taipei.
    let now = taipei(2024, 7, 11, 12, 0);

    // Updated during the previous evening's session → before the close.
    assert!(policy.should_update_at(
        "AAPL:NASDAQ",
        Some("2024-07-10T23:00:00+08:00"),
        false,
        now
    ));

    // Updated after the close this morning → current.
    assert!(!policy.should_update_at(
        "AAPL:NASDAQ",
        Some("2024-07-11T04:30:00+08:00"),
        false,
        now
    ));
}
