use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::app::models::{Role, Tab};
use crate::features::reports::models::Report;
use crate::features::session::models::Identity;

/// Which screen is rendered: the blocking spinner until the first identity
/// event, then whatever tab is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Loading,
    Home,
    Report,
    View,
}

impl Screen {
    pub fn template_name(&self) -> &'static str {
        match self {
            Screen::Loading => "app/loading.jinja",
            Screen::Home => "app/home.jinja",
            Screen::Report => "app/report.jinja",
            Screen::View => "app/feed.jinja",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FormView {
    pub description: String,
    pub location: String,
    pub category: String,
    /// Options for the category select
    pub categories: Vec<String>,
    pub submitting: bool,
    pub show_success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportCard {
    #[serde(flatten)]
    pub report: Report,
    /// Whether the "Mark Resolved" button is shown (display gate only)
    pub can_resolve: bool,
}

/// Everything the view needs, projected from app state after each event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AppSnapshot {
    pub screen: Screen,
    pub tab: Tab,
    pub role: Role,
    pub heading: String,
    pub loading: bool,
    pub identity: Option<Identity>,
    /// Set after a failed anonymous sign-in until the next attempt
    pub sign_in_error: Option<String>,
    pub form: FormView,
    /// Newest first
    pub reports: Vec<ReportCard>,
}
