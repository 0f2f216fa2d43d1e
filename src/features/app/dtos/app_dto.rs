use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::app::models::{Role, Tab};
use crate::features::app::state::Intent;
use crate::features::reports::models::DraftField;

/// Body for switching the active tab (JSON and HTML form)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SelectTabDto {
    pub tab: Tab,
}

/// Body for switching the UI role (JSON and HTML form)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SelectRoleDto {
    pub role: Role,
}

/// Partial draft update; omitted fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DraftUpdateDto {
    pub description: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
}

impl DraftUpdateDto {
    pub fn into_intents(self) -> Vec<Intent> {
        [
            (DraftField::Description, self.description),
            (DraftField::Location, self.location),
            (DraftField::Category, self.category),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| Intent::EditDraft(field, value)))
        .collect()
    }
}

/// The report page form: the whole draft, submitted in one post
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportFormDto {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub category: Option<String>,
}

impl ReportFormDto {
    /// Edits that bring the draft in line with the posted form, then submit
    pub fn into_intents(self) -> Vec<Intent> {
        let mut intents = DraftUpdateDto {
            description: Some(self.description),
            location: Some(self.location),
            category: self.category,
        }
        .into_intents();
        intents.push(Intent::Submit);
        intents
    }
}
