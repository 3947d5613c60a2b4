// ═══════════════════════════════════════════════════════════════════
// Provider Tests — symbol conventions, page parsing, fallback chains
// ═══════════════════════════════════════════════════════════════════

use std::collections::HashMap;

use async_trait::async_trait;

use stock_tracker_core::errors::CoreError;
use stock_tracker_core::providers::google_finance::extract_last_price;
use stock_tracker_core::providers::traits::{split_pair, Quote, QuoteProvider};
use stock_tracker_core::providers::yahoo_finance::to_yahoo_symbol;
use stock_tracker_core::services::quote_service::QuoteService;

const FIXED_TIMESTAMP: &str = "2024-07-10T15:00:00+08:00";

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Mock Providers
// ═══════════════════════════════════════════════════════════════════

/// Serves a fixed symbol → price table; unknown symbols fail.
struct StaticProvider {
    name: String,
    prices: HashMap<String, f64>,
}

impl StaticProvider {
    fn new(name: &str, prices: &[(&str, f64)]) -> Self {
        Self {
            name: name.to_string(),
            prices: prices
                .iter()
                .map(|(s, p)| (s.to_string(), *p))
                .collect(),
        }
    }
}

#[async_trait]
impl QuoteProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        self.prices
            .get(symbol)
            .map(|price| Quote {
                price: *price,
                timestamp: FIXED_TIMESTAMP.to_string(),
            })
            .ok_or_else(|| CoreError::Api {
                provider: self.name.clone(),
                message: format!("no quote for {symbol}"),
            })
    }
}

/// Always fails.
struct FailingProvider;

#[async_trait]
impl QuoteProvider for FailingProvider {
    fn name(&self) -> &str {
        "FailingProvider"
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        Err(CoreError::Api {
            provider: "FailingProvider".into(),
            message: format!("down for {symbol}"),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════
// Symbol conventions
// ═══════════════════════════════════════════════════════════════════

#[test]
fn yahoo_symbols_use_dot_suffixes() {
    assert_eq!(to_yahoo_symbol("2330:TPE"), "2330.TW");
    assert_eq!(to_yahoo_symbol("6488:TWO"), "6488.TWO");
    assert_eq!(to_yahoo_symbol("AAPL:NASDAQ"), "AAPL");
    assert_eq!(to_yahoo_symbol("VTI:NYSEARCA"), "VTI");
    // Already-bare symbols pass through.
    assert_eq!(to_yahoo_symbol("AAPL"), "AAPL");
}

#[test]
fn pair_splitting_uppercases_both_halves() {
    assert_eq!(
        split_pair("usd-twd").unwrap(),
        ("USD".to_string(), "TWD".to_string())
    );
    assert!(matches!(
        split_pair("USDTWD"),
        Err(CoreError::InvalidSymbol(_))
    ));
    assert!(matches!(split_pair("USD-"), Err(CoreError::InvalidSymbol(_))));
}

// ═══════════════════════════════════════════════════════════════════
// Quote page parsing
// ═══════════════════════════════════════════════════════════════════

#[test]
fn last_price_attribute_is_extracted() {
    let html = r#"<html><body>
        <main><div class="quote" data-last-price="123.45" data-currency-code="USD">123.45</div></main>
    </body></html>"#;
    assert_eq!(extract_last_price(html), Some(123.45));
}

#[test]
fn pages_without_the_attribute_yield_nothing() {
    assert_eq!(
        extract_last_price("<html><body><div>hi</div></body></html>"),
        None
    );
    assert_eq!(extract_last_price(""), None);
}

#[test]
fn unparseable_price_values_yield_nothing() {
    let html = r#"<div data-last-price="n/a"></div>"#;
    assert_eq!(extract_last_price(html), None);
}

// ═══════════════════════════════════════════════════════════════════
// Fallback chain
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn first_provider_wins_when_it_answers() {
    let service = QuoteService::new(
        vec![
            Box::new(StaticProvider::new("primary", &[("2330:TPE", 593.0)])),
            Box::new(StaticProvider::new("secondary", &[("2330:TPE", 111.0)])),
        ],
        5,
    );

    let quote = service.fetch_quote("2330:TPE").await.unwrap();
    assert_eq!(quote.price, 593.0);
}

#[tokio::test]
async fn chain_falls_back_when_the_primary_fails() {
    let service = QuoteService::new(
        vec![
            Box::new(FailingProvider),
            Box::new(StaticProvider::new("secondary", &[("2330:TPE", 593.0)])),
        ],
        5,
    );

    let quote = service.fetch_quote("2330:TPE").await.unwrap();
    assert_eq!(quote.price, 593.0);
}

#[tokio::test]
async fn invalid_prices_are_rejected_and_fall_through() {
    let service = QuoteService::new(
        vec![
            Box::new(StaticProvider::new("primary", &[("2330:TPE", -1.0)])),
            Box::new(StaticProvider::new("secondary", &[("2330:TPE", 593.0)])),
        ],
        5,
    );

    let quote = service.fetch_quote("2330:TPE").await.unwrap();
    assert_eq!(quote.price, 593.0);
}

#[tokio::test]
async fn exhausted_chain_reports_a_price_fetch_failure() {
    let service = QuoteService::new(vec![Box::new(FailingProvider)], 5);

    let result = service.fetch_quote("2330:TPE").await;
    assert!(matches!(
        result,
        Err(CoreError::PriceFetchFailed { symbol, .. }) if symbol == "2330:TPE"
    ));
}

#[tokio::test]
async fn batch_fetch_skips_failures_without_aborting() {
    let service = QuoteService::new(
        vec![Box::new(StaticProvider::new(
            "primary",
            &[("2330:TPE", 593.0), ("AAPL:NASDAQ", 187.3)],
        ))],
        2,
    );

    let symbols = vec![
        "2330:TPE".to_string(),
        "MISSING:TPE".to_string(),
        "AAPL:NASDAQ".to_string(),
    ];
    let quotes = service.fetch_many(&symbols).await;

    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes["2330:TPE"].price, 593.0);
    assert_eq!(quotes["AAPL:NASDAQ"].price, 187.3);
    assert!(!quotes.contains_key("MISSING:TPE"));
}
