use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::store::PortfolioStore;
use crate::errors::CoreError;
use crate::models::portfolio::PortfolioDocument;

/// Plain JSON file storage for the portfolio document.
///
/// Local file I/O is treated as fast and non-suspending; the sync
/// `read`/`write` pair also serves the mirrored store directly.
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<PortfolioDocument, CoreError> {
        let bytes = std::fs::read(&self.path)
            .map_err(|e| CoreError::FileIO(format!("{}: {e}", self.path.display())))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| CoreError::Deserialization(format!("{}: {e}", self.path.display())))
    }

    pub fn write(&self, document: &PortfolioDocument) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, json)
            .map_err(|e| CoreError::FileIO(format!("{}: {e}", self.path.display())))?;
        Ok(())
    }
}

#[async_trait]
impl PortfolioStore for LocalStore {
    async fn load(&self) -> Result<PortfolioDocument, CoreError> {
        self.read()
    }

    async fn save(&self, document: &PortfolioDocument) -> Result<(), CoreError> {
        self.write(document)
    }
}
