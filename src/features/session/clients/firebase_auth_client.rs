use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};

use crate::core::config::FirebaseConfig;
use crate::core::error::{AppError, Result};
use crate::features::session::models::Identity;
use crate::features::session::provider::IdentityProvider;
use crate::shared::constants::ID_TOKEN_REFRESH_MARGIN;
use crate::shared::subscription::Subscription;

/// Lifetime assumed when the service returns an unparsable `expiresIn`
const FALLBACK_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// Request body for Identity Toolkit `accounts:signUp` (anonymous when no credentials are given)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest {
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
    local_id: String,
}

/// Secure Token API refresh response (snake_case, unlike Identity Toolkit)
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct FirebaseErrorResponse {
    error: FirebaseErrorBody,
}

#[derive(Debug, Deserialize)]
struct FirebaseErrorBody {
    #[serde(default)]
    message: String,
}

/// Cached ID token with expiration tracking
struct TokenCache {
    id_token: String,
    refresh_token: String,
    expires_in: Duration,
    fetched_at: Instant,
}

/// Identity provider backed by the Firebase Auth REST API.
///
/// Holds the session tokens in memory only; a restart starts a new anonymous
/// identity. Identity changes are broadcast through a `watch` channel whose
/// initial value is `None`.
pub struct FirebaseAuthClient {
    config: FirebaseConfig,
    http_client: reqwest::Client,
    tokens: RwLock<Option<TokenCache>>,
    identity: watch::Sender<Option<Identity>>,
    refresh_margin: Duration,
}

impl FirebaseAuthClient {
    pub fn new(config: FirebaseConfig) -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            config,
            http_client: reqwest::Client::new(),
            tokens: RwLock::new(None),
            identity,
            refresh_margin: ID_TOKEN_REFRESH_MARGIN,
        }
    }

    /// Get a valid ID token for backend calls, refreshing it if necessary
    pub async fn id_token(&self) -> Result<String> {
        {
            let tokens = self.tokens.read().await;
            match *tokens {
                Some(ref cached) => {
                    if cached.fetched_at.elapsed() + self.refresh_margin < cached.expires_in {
                        return Ok(cached.id_token.clone());
                    }
                }
                None => return Err(AppError::Auth("Not signed in".to_string())),
            }
        }

        self.refresh().await
    }

    /// Exchange the refresh token for a new ID token
    async fn refresh(&self) -> Result<String> {
        let refresh_token = {
            let tokens = self.tokens.read().await;
            tokens
                .as_ref()
                .map(|cached| cached.refresh_token.clone())
                .ok_or_else(|| AppError::Auth("Not signed in".to_string()))?
        };

        let url = format!(
            "{}/v1/token?key={}",
            self.config.token_base_url,
            urlencoding::encode(&self.config.api_key)
        );

        tracing::debug!("Refreshing Firebase ID token");

        let response = self
            .http_client
            .post(&url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to refresh Firebase ID token: {}", e);
                AppError::ExternalServiceError(format!("Failed to refresh token: {}", e))
            })?;

        if !response.status().is_success() {
            let error = Self::error_from_response(response).await;
            if matches!(error, AppError::Auth(_)) {
                // Refresh token revoked or user disabled: the session is over
                *self.tokens.write().await = None;
                self.publish(None);
            }
            return Err(error);
        }

        let refreshed = response.json::<RefreshResponse>().await.map_err(|e| {
            tracing::error!("Failed to parse token refresh response: {}", e);
            AppError::ExternalServiceError(format!("Failed to parse refresh response: {}", e))
        })?;

        tracing::debug!("Refreshed ID token for {}", refreshed.user_id);

        let id_token = refreshed.id_token.clone();
        *self.tokens.write().await = Some(TokenCache {
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            expires_in: parse_expires_in(&refreshed.expires_in),
            fetched_at: Instant::now(),
        });

        Ok(id_token)
    }

    fn publish(&self, identity: Option<Identity>) {
        self.identity.send_replace(identity);
    }

    /// Map a non-success response to an error. 4xx from Firebase Auth means
    /// the credentials were rejected; everything else is a service failure.
    async fn error_from_response(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<FirebaseErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.clone());

        tracing::error!("Firebase Auth API error: HTTP {} - {}", status, message);

        if status.is_client_error() {
            AppError::Auth(message)
        } else {
            AppError::ExternalServiceError(format!("Firebase Auth API error: HTTP {}", status))
        }
    }
}

fn parse_expires_in(raw: &str) -> Duration {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .unwrap_or(FALLBACK_TOKEN_LIFETIME)
}

#[async_trait]
impl IdentityProvider for FirebaseAuthClient {
    async fn sign_in_anonymously(&self) -> Result<()> {
        let url = format!(
            "{}/v1/accounts:signUp?key={}",
            self.config.auth_base_url,
            urlencoding::encode(&self.config.api_key)
        );

        tracing::debug!("Requesting anonymous sign-in");

        let response = self
            .http_client
            .post(&url)
            .json(&SignUpRequest {
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach Firebase Auth: {}", e);
                AppError::ExternalServiceError(format!("Failed to sign in: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let signed_up = response.json::<SignUpResponse>().await.map_err(|e| {
            tracing::error!("Failed to parse sign-up response: {}", e);
            AppError::ExternalServiceError(format!("Failed to parse sign-up response: {}", e))
        })?;

        tracing::info!("Signed in anonymously as {}", signed_up.local_id);

        *self.tokens.write().await = Some(TokenCache {
            id_token: signed_up.id_token,
            refresh_token: signed_up.refresh_token,
            expires_in: parse_expires_in(&signed_up.expires_in),
            fetched_at: Instant::now(),
        });
        self.publish(Some(Identity::anonymous(signed_up.local_id)));

        Ok(())
    }

    fn on_identity_change(&self) -> Subscription<Option<Identity>> {
        Subscription::from_watch(self.identity.subscribe())
    }
}
