pub mod config;
pub mod errors;
pub mod markets;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use config::Config;
use errors::CoreError;
use markets::calendar::MarketCalendar;
use markets::staleness::StalenessPolicy;
use models::report::ReconciliationReport;
use providers::frankfurter::FrankfurterProvider;
use providers::google_finance::GoogleFinanceProvider;
use providers::traits::{ExchangeRateSource, QuoteProvider};
use providers::yahoo_finance::YahooFinanceProvider;
use services::quote_service::QuoteService;
use services::rate_service::RateService;
use services::reconciler::ReconciliationEngine;
use services::valuation::ValuationEngine;
use storage::gist::GistStore;
use storage::local::LocalStore;
use storage::mirror::MirroredStore;
use storage::store::PortfolioStore;

/// Main entry point for the Stock Tracker core library.
///
/// Wires the market calendar, staleness policy, provider chains,
/// portfolio store, and reconciliation engine from one `Config`, and
/// runs one update pass per invocation.
#[must_use]
pub struct StockTracker {
    engine: ReconciliationEngine,
}

impl StockTracker {
    /// Build the full component graph for one process invocation.
    pub fn new(config: Config) -> Self {
        let calendar = MarketCalendar::new();
        let policy = StalenessPolicy::new(calendar, config.staleness);

        // Google Finance is primary for quotes; Yahoo picks up symbols
        // the primary cannot serve.
        let mut quote_providers: Vec<Box<dyn QuoteProvider>> =
            vec![Box::new(GoogleFinanceProvider::new(&config))];
        match YahooFinanceProvider::new(&config) {
            Ok(yahoo) => quote_providers.push(Box::new(yahoo)),
            Err(e) => tracing::warn!(error = %e, "yahoo fallback unavailable"),
        }
        let quotes = QuoteService::new(quote_providers, config.fetch_concurrency);

        let rate_sources: Vec<Box<dyn ExchangeRateSource>> = vec![
            Box::new(GoogleFinanceProvider::new(&config)),
            Box::new(FrankfurterProvider::new(&config)),
        ];
        let rates = RateService::new(rate_sources);

        let local = LocalStore::new(&config.portfolio_path);
        let store: Box<dyn PortfolioStore> = match config.gist.clone() {
            Some(credentials) => {
                tracing::info!("remote store configured, using mirrored persistence");
                Box::new(MirroredStore::new(
                    local,
                    Box::new(GistStore::new(credentials, config.http_timeout)),
                    config.backup_dir.clone(),
                ))
            }
            None => {
                tracing::info!(
                    path = %config.portfolio_path.display(),
                    "no remote credentials, using local file only"
                );
                Box::new(local)
            }
        };

        let valuation = ValuationEngine::new(&config.home_currency);
        let engine = ReconciliationEngine::new(store, quotes, rates, policy, valuation, &config);

        Self { engine }
    }

    /// Run one reconciliation pass and return what changed.
    pub async fn run(&self) -> Result<ReconciliationReport, CoreError> {
        self.engine.run().await
    }
}
