use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::portfolio::PortfolioDocument;

/// Load/save capability for the portfolio document.
///
/// The reconciliation engine is parameterized over this trait, so
/// remote-vs-local persistence is a wiring decision, not a code fork.
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    /// Obtain the current document.
    async fn load(&self) -> Result<PortfolioDocument, CoreError>;

    /// Persist the document. Last writer wins; no version check is
    /// performed against concurrent writers.
    async fn save(&self, document: &PortfolioDocument) -> Result<(), CoreError>;
}
