use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::session::models::Identity;
use crate::shared::subscription::Subscription;

/// Port to the hosted identity service
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Request an anonymous session. Success is observed through `on_identity_change`.
    async fn sign_in_anonymously(&self) -> Result<()>;

    /// Subscribe to identity changes. The current identity (possibly `None`)
    /// is delivered first; dropping the subscription unsubscribes.
    fn on_identity_change(&self) -> Subscription<Option<Identity>>;
}
