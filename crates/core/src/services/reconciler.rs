use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::quote_service::QuoteService;
use super::rate_service::RateService;
use super::valuation::{round2, ValuationEngine};
use crate::config::Config;
use crate::errors::CoreError;
use crate::markets::calendar::{is_us_market, market_from_symbol};
use crate::markets::staleness::StalenessPolicy;
use crate::models::portfolio::PortfolioDocument;
use crate::models::report::{
    CurrencySlice, HoldingRank, MarketStatus, ReconciliationReport,
};
use crate::storage::store::PortfolioStore;

/// Persistence is skipped when the recomputed total moves less than
/// this.
pub const TOTAL_VALUE_EPSILON: f64 = 0.01;

/// Orchestrates one update pass: refresh the exchange rate, decide
/// which holdings are stale, batch-fetch their prices, fold the
/// results back in, revalue, and persist only when the total moved
/// meaningfully.
///
/// Partial failure is the normal case here: a symbol that cannot be
/// scraped or a rate source that is down costs a log line and a report
/// entry, not the pass. Only a portfolio that cannot be loaded at all,
/// or a local save that fails, aborts the run.
pub struct ReconciliationEngine {
    store: Box<dyn PortfolioStore>,
    quotes: QuoteService,
    rates: RateService,
    policy: StalenessPolicy,
    valuation: ValuationEngine,
    rate_pair: String,
    home_currency: String,
    display_timezone: Tz,
    force_update: bool,
}

impl ReconciliationEngine {
    pub fn new(
        store: Box<dyn PortfolioStore>,
        quotes: QuoteService,
        rates: RateService,
        policy: StalenessPolicy,
        valuation: ValuationEngine,
        config: &Config,
    ) -> Self {
        Self {
            store,
            quotes,
            rates,
            policy,
            valuation,
            rate_pair: config.rate_pair.clone(),
            home_currency: config.home_currency.clone(),
            display_timezone: config.display_timezone,
            force_update: config.force_update,
        }
    }

    /// Run one complete pass and describe what changed.
    ///
    /// Load → rate refresh → classify → batch fetch → fold → revalue →
    /// persist-or-skip → report; each stage runs exactly once, with no
    /// internal retries.
    pub async fn run(&self) -> Result<ReconciliationReport, CoreError> {
        // Load — the only stage whose failure aborts before touching
        // anything else.
        let mut document = match self.store.load().await {
            Ok(document) => document,
            Err(CoreError::PortfolioUnavailable(message)) => {
                return Err(CoreError::PortfolioUnavailable(message));
            }
            Err(e) => return Err(CoreError::PortfolioUnavailable(e.to_string())),
        };

        let now = Utc::now();
        let old_total = document.total_value;

        // Refresh exchange rate — non-fatal, the stored rate remains
        // usable.
        let (exchange_rate, rate_refreshed) = self.refresh_exchange_rate(&mut document).await;

        // Classify holdings and collect the status of every distinct
        // market touched.
        let (to_update, market_status) = self.classify(&document, now);

        // Batch fetch.
        let quotes = if to_update.is_empty() {
            tracing::info!(
                force = self.force_update,
                "no holdings need a price refresh"
            );
            HashMap::new()
        } else {
            tracing::info!(count = to_update.len(), "fetching prices");
            self.quotes.fetch_many(&to_update).await
        };

        // Fold fetched prices back into the holdings.
        let mut refreshed_us = 0;
        let mut refreshed_local = 0;
        for holding in &mut document.stocks {
            if let Some(quote) = quotes.get(&holding.name) {
                holding.price = quote.price;
                holding.last_updated = Some(quote.timestamp.clone());
                if is_us_symbol(&holding.name) {
                    refreshed_us += 1;
                } else {
                    refreshed_local += 1;
                }
            }
        }
        let failed: Vec<String> = to_update
            .iter()
            .filter(|symbol| !quotes.contains_key(*symbol))
            .cloned()
            .collect();

        // Revalue — always, even with zero refreshed symbols: rate
        // movement alone can shift the total.
        let new_total = self.valuation.revalue(&mut document.stocks, exchange_rate);

        // Decide persistence.
        let persisted = if (new_total - old_total).abs() > TOTAL_VALUE_EPSILON {
            document.total_value = new_total;
            self.store.save(&document).await?;
            tracing::info!(old_total, new_total, "persisted updated portfolio");
            true
        } else {
            tracing::info!(
                old_total,
                new_total,
                "total moved less than epsilon, skipping persist"
            );
            false
        };

        Ok(ReconciliationReport {
            market_status,
            requested: to_update,
            refreshed_us,
            refreshed_local,
            failed,
            exchange_rate,
            rate_refreshed,
            old_total,
            new_total,
            persisted,
            rankings: ranked(&document, &self.home_currency, exchange_rate),
            currency_distribution: currency_distribution(
                &document,
                &self.home_currency,
                exchange_rate,
                new_total,
            ),
            holdings: document.stocks.clone(),
        })
    }

    /// Fetch a fresh rate, falling back to the stored one on failure.
    async fn refresh_exchange_rate(&self, document: &mut PortfolioDocument) -> (f64, bool) {
        match self.rates.fetch_rate(&self.rate_pair).await {
            Ok(rate) => {
                let updated = Utc::now().with_timezone(&self.display_timezone).to_rfc3339();
                document.set_exchange_rate(rate, updated);
                (rate, true)
            }
            Err(e) => {
                tracing::warn!(
                    pair = %self.rate_pair,
                    error = %e,
                    "rate refresh failed, keeping stored rate"
                );
                match document.parsed_exchange_rate() {
                    Ok(rate) => (rate, false),
                    Err(parse_err) => {
                        tracing::error!(
                            error = %parse_err,
                            "stored exchange rate unreadable, assuming 1.0"
                        );
                        (1.0, false)
                    }
                }
            }
        }
    }

    /// Per holding: does it need a refresh; per distinct market: is it
    /// open. Unknown markets are logged and omitted from the status
    /// map; their holdings still refresh via the fail-open policy.
    fn classify(
        &self,
        document: &PortfolioDocument,
        now: DateTime<Utc>,
    ) -> (Vec<String>, BTreeMap<String, MarketStatus>) {
        let mut to_update = Vec::new();
        let mut market_status = BTreeMap::new();

        for holding in &document.stocks {
            if self.policy.should_update_at(
                &holding.name,
                holding.last_updated.as_deref(),
                self.force_update,
                now,
            ) {
                to_update.push(holding.name.clone());
            }

            let market = match market_from_symbol(&holding.name) {
                Ok(market) => market,
                Err(e) => {
                    tracing::warn!(symbol = %holding.name, error = %e, "malformed symbol");
                    continue;
                }
            };
            if market_status.contains_key(&market) {
                continue;
            }
            match self.policy.calendar().is_open(&market, now) {
                Ok(open) => {
                    let hours = self
                        .policy
                        .calendar()
                        .trading_hours_description_at(&market, now)
                        .unwrap_or_default();
                    market_status.insert(market, MarketStatus { open, hours });
                }
                Err(e) => {
                    tracing::warn!(market = %market, error = %e, "market not in calendar, omitting from status");
                }
            }
        }

        (to_update, market_status)
    }
}

fn is_us_symbol(symbol: &str) -> bool {
    market_from_symbol(symbol)
        .map(|market| is_us_market(&market))
        .unwrap_or(false)
}

/// Holdings ranked by descending percentage of total.
fn ranked(
    document: &PortfolioDocument,
    home_currency: &str,
    exchange_rate: f64,
) -> Vec<HoldingRank> {
    let mut rankings: Vec<HoldingRank> = document
        .stocks
        .iter()
        .map(|holding| HoldingRank {
            symbol: holding.name.clone(),
            percentage: holding.percentage_of_total,
            value_home: holding.value_in_home(home_currency, exchange_rate),
        })
        .collect();
    rankings.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rankings
}

/// Value split by holding currency: native totals, converted totals,
/// and each currency's share of the portfolio.
fn currency_distribution(
    document: &PortfolioDocument,
    home_currency: &str,
    exchange_rate: f64,
    total: f64,
) -> Vec<CurrencySlice> {
    let mut by_currency: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for holding in &document.stocks {
        let entry = by_currency.entry(holding.currency.clone()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += holding.price * holding.quantity;
    }

    by_currency
        .into_iter()
        .map(|(currency, (count, value_native))| {
            let value_home = if currency == home_currency {
                value_native
            } else {
                value_native * exchange_rate
            };
            CurrencySlice {
                currency,
                count,
                value_native,
                value_home,
                percentage: if total > 0.0 {
                    round2(100.0 * value_home / total)
                } else {
                    0.0
                },
            }
        })
        .collect()
}
