use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::reports::models::NewReport;
use crate::shared::constants::DEFAULT_CATEGORY;

/// Editable fields of the report form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    Description,
    Location,
    Category,
}

/// Local-only form state, never persisted until a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReportDraft {
    pub description: String,
    pub location: String,
    pub category: String,
}

impl Default for ReportDraft {
    fn default() -> Self {
        Self {
            description: String::new(),
            location: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl ReportDraft {
    pub fn set(&mut self, field: DraftField, value: String) {
        match field {
            DraftField::Description => self.description = value,
            DraftField::Location => self.location = value,
            DraftField::Category => self.category = value,
        }
    }

    /// Description and location must be non-empty. Category is not checked.
    pub fn is_submittable(&self) -> bool {
        !self.description.is_empty() && !self.location.is_empty()
    }

    pub fn to_new_report(&self) -> NewReport {
        NewReport::pending(
            self.description.clone(),
            self.location.clone(),
            self.category.clone(),
        )
    }
}
