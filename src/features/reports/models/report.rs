use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Opaque document id assigned on creation
pub type ReportId = String;

/// Report lifecycle. `Pending` moves to `Resolved` once and stays there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ReportStatus {
    Pending,
    Resolved,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::Resolved => "Resolved",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ReportStatus::Pending),
            "Resolved" => Ok(ReportStatus::Resolved),
            other => Err(format!("unknown report status '{}'", other)),
        }
    }
}

/// A citizen-submitted issue as last seen in the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub description: String,
    pub location: String,
    pub category: String,
    pub status: ReportStatus,
    /// Store-assigned; absent while the server timestamp is not yet visible
    pub created_at: Option<DateTime<Utc>>,
    /// Store-assigned when the report is resolved
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Report {
    pub fn is_pending(&self) -> bool {
        self.status == ReportStatus::Pending
    }
}

/// Data for creating a report. The store adds `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub description: String,
    pub location: String,
    pub category: String,
    pub status: ReportStatus,
}

impl NewReport {
    /// New reports always start out pending
    pub fn pending(description: String, location: String, category: String) -> Self {
        Self {
            description,
            location,
            category,
            status: ReportStatus::Pending,
        }
    }
}

/// Partial update applied to an existing report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPatch {
    /// `status = Resolved` plus a store-assigned `resolvedAt`
    Resolve,
}
