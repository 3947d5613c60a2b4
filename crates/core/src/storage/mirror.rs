use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;

use super::local::LocalStore;
use super::store::PortfolioStore;
use crate::errors::CoreError;
use crate::models::portfolio::PortfolioDocument;

/// Remote-preferred store with local mirroring and fallback.
///
/// Load: try the remote first, copy a successful read into the local
/// file, fall back to the local file when the remote fails; fatal only
/// when neither yields a document. Save: the local write is
/// authoritative, the remote update is best-effort, and a successful
/// remote save also drops a timestamped copy under the backup
/// directory.
pub struct MirroredStore {
    local: LocalStore,
    remote: Box<dyn PortfolioStore>,
    backup_dir: PathBuf,
}

impl MirroredStore {
    pub fn new(
        local: LocalStore,
        remote: Box<dyn PortfolioStore>,
        backup_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            local,
            remote,
            backup_dir: backup_dir.into(),
        }
    }

    fn write_backup(&self, document: &PortfolioDocument) -> Result<(), CoreError> {
        std::fs::create_dir_all(&self.backup_dir)?;
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let path = self.backup_dir.join(format!("portfolio_{stamp}.json"));
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        std::fs::write(&path, json)?;
        tracing::info!(path = %path.display(), "wrote backup copy");
        Ok(())
    }
}

#[async_trait]
impl PortfolioStore for MirroredStore {
    async fn load(&self) -> Result<PortfolioDocument, CoreError> {
        match self.remote.load().await {
            Ok(document) => {
                tracing::info!("loaded portfolio from remote store");
                if let Err(e) = self.local.write(&document) {
                    tracing::warn!(error = %e, "failed to mirror remote document locally");
                }
                return Ok(document);
            }
            Err(e) => {
                tracing::warn!(error = %e, "remote load failed, falling back to local file");
            }
        }

        self.local.read().map_err(|e| {
            CoreError::PortfolioUnavailable(format!("neither remote nor local source: {e}"))
        })
    }

    async fn save(&self, document: &PortfolioDocument) -> Result<(), CoreError> {
        // The local copy is the one the next pass falls back on; its
        // failure is the fatal one.
        self.local
            .write(document)
            .map_err(|e| CoreError::Persistence(format!("local save failed: {e}")))?;

        match self.remote.save(document).await {
            Ok(()) => {
                if let Err(e) = self.write_backup(document) {
                    tracing::warn!(error = %e, "backup copy failed");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "remote save failed, local copy is current");
            }
        }
        Ok(())
    }
}
