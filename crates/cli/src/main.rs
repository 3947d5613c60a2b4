use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use stock_tracker_core::config::Config;
use stock_tracker_core::services::chart_service::ChartService;
use stock_tracker_core::StockTracker;

mod console;
mod logging;

#[derive(Parser)]
#[command(name = "stock-tracker", about = "Stock portfolio tracking tool", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Update prices and display the portfolio
    Portfolio {
        /// Portfolio file path
        #[arg(long, default_value = "portfolio.json")]
        file: PathBuf,

        /// Refresh every holding, ignoring freshness checks
        #[arg(short, long)]
        force: bool,

        /// Write allocation chart data into this directory
        #[arg(long)]
        chart_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load environment variables before anything reads them.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _guard = match logging::init(cli.debug) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: failed to initialize logging: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli).await {
        tracing::error!("{e:#}");
        eprintln!(
            "error: {e}. See {} for details.",
            logging::log_file_path().display()
        );
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Portfolio {
            file,
            force,
            chart_dir,
        } => {
            let mut config = Config::from_env();
            config.portfolio_path = file;
            config.force_update = force;
            if force {
                tracing::info!("force update enabled, refreshing every holding");
            }

            let tracker = StockTracker::new(config.clone());
            let report = tracker.run().await.context("reconciliation pass failed")?;

            console::print_report(&report, &config);
            console::print_portfolio(&report, &config);

            if let Some(dir) = chart_dir {
                write_chart_data(&dir, &report, &config)?;
            }
        }
    }
    Ok(())
}

/// Dump allocation data points for external chart rendering.
fn write_chart_data(
    dir: &PathBuf,
    report: &stock_tracker_core::models::report::ReconciliationReport,
    config: &Config,
) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let chart_service = ChartService::new(&config.home_currency);
    let points = chart_service.allocation(&report.holdings, report.exchange_rate);

    let path = dir.join("allocation.json");
    let json = serde_json::to_string_pretty(&points)?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;

    tracing::info!(path = %path.display(), "wrote chart data");
    Ok(())
}
