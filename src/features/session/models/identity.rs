use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity reported by the identity provider for the running client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    /// Provider-assigned user id (Firebase `localId`)
    pub uid: String,
    pub is_anonymous: bool,
}

impl Identity {
    pub fn anonymous(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            is_anonymous: true,
        }
    }
}
