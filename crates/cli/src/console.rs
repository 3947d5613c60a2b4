use chrono::Utc;
use comfy_table::{ContentArrangement, Table};

use stock_tracker_core::config::Config;
use stock_tracker_core::markets::calendar::is_us_market;
use stock_tracker_core::models::report::ReconciliationReport;

/// Render the market-status block and update statistics.
pub fn print_report(report: &ReconciliationReport, config: &Config) {
    println!("\nMarket status:");
    for (market, status) in &report.market_status {
        let state = if status.open {
            "trading"
        } else if is_us_market(market) {
            "closed (latest close price in effect)"
        } else {
            "closed"
        };
        println!("{market}: {} - {state}", status.hours);
    }

    if report.requested.is_empty() {
        if config.force_update {
            println!("\nForce update enabled, but no holdings to refresh");
        } else {
            println!("\nAll prices are current, nothing to refresh");
        }
    } else {
        println!("\nUpdate statistics:");
        if report.refreshed_us > 0 {
            println!("- refreshed {} US-market holding(s)", report.refreshed_us);
        }
        if report.refreshed_local > 0 {
            println!(
                "- refreshed {} local-market holding(s)",
                report.refreshed_local
            );
        }
        for symbol in &report.failed {
            println!("- {symbol}: fetch failed, stored price kept");
        }
    }

    let home = &config.home_currency;
    if report.persisted {
        println!(
            "\nTotal value: {home} {} -> {home} {}",
            group_thousands(report.old_total),
            group_thousands(report.new_total)
        );
    } else {
        println!(
            "\nTotal value unchanged: {home} {}",
            group_thousands(report.new_total)
        );
    }

    if !report.currency_distribution.is_empty() {
        println!("\nCurrency split:");
        for slice in &report.currency_distribution {
            println!(
                "- {}: {} holding(s), {home} {} ({:.2}%)",
                slice.currency,
                slice.count,
                group_thousands(slice.value_home),
                slice.percentage
            );
        }
    }

    println!("\nAllocation:");
    for rank in &report.rankings {
        println!("- {}: {:.2}%", rank.symbol, rank.percentage);
    }
}

/// Render the holdings table with a summary header.
pub fn print_portfolio(report: &ReconciliationReport, config: &Config) {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Symbol".to_string(),
            "Price".to_string(),
            "Quantity".to_string(),
            format!("Value ({})", config.home_currency),
            "Share".to_string(),
            "Last updated".to_string(),
        ]);

    for holding in &report.holdings {
        let value_home = holding.value_in_home(&config.home_currency, report.exchange_rate);
        table.add_row(vec![
            holding.name.clone(),
            format!("{} {:.2}", holding.currency, holding.price),
            format!("{}", group_thousands(holding.quantity)),
            format!("{} {}", config.home_currency, group_thousands(value_home)),
            format!("{:.2}%", holding.percentage_of_total),
            holding.last_updated.clone().unwrap_or_else(|| "-".into()),
        ]);
    }

    let now = Utc::now().with_timezone(&config.display_timezone);
    println!("\nPortfolio summary:");
    println!("Date: {}", now.format("%Y/%m/%d %H:%M"));
    println!(
        "Total value: {} {}",
        config.home_currency,
        group_thousands(report.new_total)
    );
    println!(
        "Exchange rate: {:.2} {}/{}",
        report.exchange_rate,
        config.home_currency,
        config.rate_pair.split('-').next().unwrap_or("USD")
    );
    println!("{table}");
}

/// Format a value with thousands separators and 2 decimals
/// (`1234567.8` → `"1,234,567.80"`).
pub fn group_thousands(value: f64) -> String {
    let negative = value < 0.0;
    let formatted = format!("{:.2}", value.abs());
    let (integral, decimals) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in integral.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let integral: String = grouped.chars().rev().collect();

    let sign = if negative { "-" } else { "" };
    format!("{sign}{integral}.{decimals}")
}
