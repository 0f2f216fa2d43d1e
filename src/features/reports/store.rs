use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::reports::models::{NewReport, Report, ReportId, ReportPatch};
use crate::shared::subscription::Subscription;

/// Port to the hosted document store holding the report collection
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Create a record; the store assigns the id and `createdAt`
    async fn create(&self, collection: &str, report: NewReport) -> Result<ReportId>;

    /// Apply a partial update to an existing record. Missing records are an error.
    async fn update(&self, collection: &str, id: &str, patch: ReportPatch) -> Result<()>;

    /// Subscribe to the whole collection. Every item is the full current
    /// contents; dropping the subscription tears it down.
    fn subscribe(&self, collection: &str) -> Subscription<Vec<Report>>;
}
