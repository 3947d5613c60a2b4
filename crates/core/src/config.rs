use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;

use crate::markets::staleness::StalenessBoundary;

/// Browser user agent sent with scraping requests; the finance pages
/// return a stripped-down document to unknown clients.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Process-wide configuration, constructed once at startup and passed
/// into each component's constructor. Nothing in the core reads ambient
/// global state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Google Finance quote page base URL.
    pub finance_base_url: String,

    /// User agent for scraping requests.
    pub user_agent: String,

    /// Per-request HTTP timeout.
    pub http_timeout: Duration,

    /// Timezone used for generated timestamps and the report header.
    pub display_timezone: Tz,

    /// Currency the portfolio total is reported in.
    pub home_currency: String,

    /// Exchange-rate pair refreshed each pass, e.g. "USD-TWD".
    pub rate_pair: String,

    /// Local portfolio document path.
    pub portfolio_path: PathBuf,

    /// Remote document-store credentials. When both pieces are present
    /// the store wiring switches from local-only to remote-preferred.
    pub gist: Option<GistCredentials>,

    /// Directory for timestamped backup copies after remote saves.
    pub backup_dir: PathBuf,

    /// Which boundary closes the staleness window.
    pub staleness: StalenessBoundary,

    /// Refresh every holding regardless of freshness.
    pub force_update: bool,

    /// Maximum in-flight price fetches during a batch.
    pub fetch_concurrency: usize,
}

/// Credentials for the gist-backed remote store.
#[derive(Debug, Clone)]
pub struct GistCredentials {
    pub gist_id: String,
    pub token: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            finance_base_url: "https://www.google.com/finance/quote".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeout: Duration::from_secs(10),
            display_timezone: chrono_tz::Asia::Taipei,
            home_currency: "TWD".to_string(),
            rate_pair: "USD-TWD".to_string(),
            portfolio_path: PathBuf::from("portfolio.json"),
            gist: None,
            backup_dir: PathBuf::from("backups"),
            staleness: StalenessBoundary::SessionClose,
            force_update: false,
            fetch_concurrency: 5,
        }
    }
}

impl Config {
    /// Build a configuration from the environment on top of the defaults.
    ///
    /// Recognized variables: `BASE_URL`, `USER_AGENT`, `TIMEZONE`,
    /// `GIST_ID` + `GIST_TOKEN` (remote store, both required to take
    /// effect). The caller is expected to have loaded `.env` already.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("BASE_URL") {
            config.finance_base_url = url;
        }
        if let Ok(agent) = std::env::var("USER_AGENT") {
            config.user_agent = agent;
        }
        if let Ok(tz) = std::env::var("TIMEZONE") {
            match tz.parse::<Tz>() {
                Ok(parsed) => config.display_timezone = parsed,
                Err(_) => tracing::warn!(timezone = %tz, "unrecognized TIMEZONE, keeping default"),
            }
        }

        let gist_id = std::env::var("GIST_ID").ok().filter(|v| !v.is_empty());
        let token = std::env::var("GIST_TOKEN").ok().filter(|v| !v.is_empty());
        if let (Some(gist_id), Some(token)) = (gist_id, token) {
            config.gist = Some(GistCredentials { gist_id, token });
        }

        config
    }
}
