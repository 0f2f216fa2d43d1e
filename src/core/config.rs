use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub firebase: FirebaseConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

/// Connection settings for the hosted backend (Firebase Auth + Firestore)
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Web API key of the Firebase project
    pub api_key: String,
    pub project_id: String,
    /// Base URL of the Identity Toolkit API (sign-up / sign-in)
    pub auth_base_url: String,
    /// Base URL of the Secure Token API (ID token refresh)
    pub token_base_url: String,
    /// Base URL of the Firestore REST API (without the `/v1` suffix)
    pub firestore_base_url: String,
    /// Name of the collection holding report documents
    pub collection: String,
    /// How often the Firestore adapter re-lists the collection
    pub poll_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            firebase: FirebaseConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl FirebaseConfig {
    const DEFAULT_COLLECTION: &'static str = "reports";
    const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("FIREBASE_API_KEY")
            .map_err(|_| "FIREBASE_API_KEY environment variable is required".to_string())?;

        let project_id = env::var("FIREBASE_PROJECT_ID")
            .map_err(|_| "FIREBASE_PROJECT_ID environment variable is required".to_string())?;

        let auth_emulator = env::var("FIREBASE_AUTH_EMULATOR_HOST")
            .ok()
            .filter(|s| !s.is_empty());
        let firestore_emulator = env::var("FIRESTORE_EMULATOR_HOST")
            .ok()
            .filter(|s| !s.is_empty());

        let collection = env::var("FIRESTORE_COLLECTION")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_COLLECTION.to_string());

        let poll_interval_ms = env::var("FIRESTORE_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| Self::DEFAULT_POLL_INTERVAL_MS.to_string())
            .parse::<u64>()
            .map_err(|_| "FIRESTORE_POLL_INTERVAL_MS must be a valid number".to_string())?;

        if poll_interval_ms == 0 {
            return Err("FIRESTORE_POLL_INTERVAL_MS must be greater than zero".to_string());
        }

        Ok(Self::build(
            api_key,
            project_id,
            auth_emulator.as_deref(),
            firestore_emulator.as_deref(),
            collection,
            Duration::from_millis(poll_interval_ms),
        ))
    }

    /// Resolve service base URLs, pointing them at local emulators when hosts are given
    fn build(
        api_key: String,
        project_id: String,
        auth_emulator: Option<&str>,
        firestore_emulator: Option<&str>,
        collection: String,
        poll_interval: Duration,
    ) -> Self {
        let (auth_base_url, token_base_url) = match auth_emulator {
            Some(host) => (
                format!("http://{}/identitytoolkit.googleapis.com", host),
                format!("http://{}/securetoken.googleapis.com", host),
            ),
            None => (
                "https://identitytoolkit.googleapis.com".to_string(),
                "https://securetoken.googleapis.com".to_string(),
            ),
        };

        let firestore_base_url = match firestore_emulator {
            Some(host) => format!("http://{}", host),
            None => "https://firestore.googleapis.com".to_string(),
        };

        Self {
            api_key,
            project_id,
            auth_base_url,
            token_base_url,
            firestore_base_url,
            collection,
            poll_interval,
        }
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "CivicEye API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Citizen issue reporting client".to_string());

        Ok(Self {
            title,
            version,
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firebase_config_hosted_urls() {
        let config = FirebaseConfig::build(
            "key".to_string(),
            "civic-eye".to_string(),
            None,
            None,
            "reports".to_string(),
            Duration::from_secs(2),
        );

        assert_eq!(config.auth_base_url, "https://identitytoolkit.googleapis.com");
        assert_eq!(config.token_base_url, "https://securetoken.googleapis.com");
        assert_eq!(config.firestore_base_url, "https://firestore.googleapis.com");
    }

    #[test]
    fn test_firebase_config_emulator_urls() {
        let config = FirebaseConfig::build(
            "key".to_string(),
            "civic-eye".to_string(),
            Some("localhost:9099"),
            Some("localhost:8080"),
            "reports".to_string(),
            Duration::from_secs(2),
        );

        assert_eq!(
            config.auth_base_url,
            "http://localhost:9099/identitytoolkit.googleapis.com"
        );
        assert_eq!(
            config.token_base_url,
            "http://localhost:9099/securetoken.googleapis.com"
        );
        assert_eq!(config.firestore_base_url, "http://localhost:8080");
    }
}
