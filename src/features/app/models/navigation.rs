use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The three screens of the client. Starts at `Home`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Home,
    Report,
    /// The live feed
    View,
}

/// Client-local UI mode. Only decides which affordances are shown; it is
/// not an authorization boundary and the store never sees it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Citizen,
    Official,
}

impl Role {
    /// Home screen heading for this role
    pub fn heading(&self) -> &'static str {
        match self {
            Role::Citizen => "Report Problems",
            Role::Official => "Manage Issues",
        }
    }
}
