use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::store::PortfolioStore;
use crate::config::GistCredentials;
use crate::errors::CoreError;
use crate::models::portfolio::PortfolioDocument;

const GITHUB_API: &str = "https://api.github.com/gists";

/// File name the portfolio lives under inside the gist.
pub const PORTFOLIO_FILE: &str = "portfolio.json";

/// GitHub Gist document store: the portfolio is one JSON blob in one
/// gist file, read with a GET and replaced wholesale with a PATCH.
pub struct GistStore {
    client: Client,
    gist_id: String,
    token: String,
}

// ── Gist API response types ─────────────────────────────────────────

#[derive(Deserialize)]
struct GistResponse {
    files: HashMap<String, GistFile>,
}

#[derive(Deserialize)]
struct GistFile {
    content: String,
}

impl GistStore {
    pub fn new(credentials: GistCredentials, timeout: Duration) -> Self {
        let client = Client::builder()
            // GitHub rejects requests without a user agent.
            .user_agent("stock-tracker")
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            gist_id: credentials.gist_id,
            token: credentials.token,
        }
    }

    fn url(&self) -> String {
        format!("{GITHUB_API}/{}", self.gist_id)
    }
}

#[async_trait]
impl PortfolioStore for GistStore {
    async fn load(&self) -> Result<PortfolioDocument, CoreError> {
        let resp: GistResponse = self
            .client
            .get(self.url())
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Gist".into(),
                message: format!("Failed to parse gist response: {e}"),
            })?;

        let file = resp.files.get(PORTFOLIO_FILE).ok_or_else(|| CoreError::Api {
            provider: "Gist".into(),
            message: format!("Gist has no {PORTFOLIO_FILE} file"),
        })?;

        serde_json::from_str(&file.content)
            .map_err(|e| CoreError::Deserialization(format!("gist {PORTFOLIO_FILE}: {e}")))
    }

    async fn save(&self, document: &PortfolioDocument) -> Result<(), CoreError> {
        let content = serde_json::to_string_pretty(document)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        let payload = json!({
            "files": { PORTFOLIO_FILE: { "content": content } }
        });

        self.client
            .patch(self.url())
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        tracing::info!(gist = %self.gist_id, "updated remote portfolio");
        Ok(())
    }
}
