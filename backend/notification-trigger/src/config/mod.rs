use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub firebase: FirebaseConfig,
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
    /// Callable name, served at `POST /{function_name}`
    pub function_name: String,
    pub json_logs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub project_id: String,
    pub credentials_path: Option<String>,
    /// `host:port` of the Firestore emulator
    pub firestore_emulator_host: Option<String>,
    /// `host:port` of the Auth emulator; enables unsigned ID tokens
    pub auth_emulator_host: Option<String>,
    pub users_collection: String,
    pub token_field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Send the real APNs `content-available` hint instead of the
    /// legacy `contcentAvailable` key
    pub apns_content_available: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port_raw = var("APP_PORT")
            .or_else(|| var("PORT"))
            .unwrap_or_else(|| "8080".to_string());
        let port = port_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "APP_PORT",
            value: port_raw.clone(),
        })?;

        let project_id = var("FIREBASE_PROJECT_ID")
            .or_else(|| var("GOOGLE_CLOUD_PROJECT"))
            .ok_or(ConfigError::Missing("FIREBASE_PROJECT_ID"))?;

        Ok(Config {
            app: AppConfig {
                env: var("APP_ENV").unwrap_or_else(|| "development".to_string()),
                port,
                function_name: var("FUNCTION_NAME")
                    .unwrap_or_else(|| "simulateNotification".to_string()),
                json_logs: var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
            firebase: FirebaseConfig {
                project_id,
                credentials_path: var("GOOGLE_APPLICATION_CREDENTIALS"),
                firestore_emulator_host: var("FIRESTORE_EMULATOR_HOST"),
                auth_emulator_host: var("FIREBASE_AUTH_EMULATOR_HOST"),
                users_collection: var("USERS_COLLECTION").unwrap_or_else(|| "users".to_string()),
                token_field: var("TOKEN_FIELD").unwrap_or_else(|| "fcmToken".to_string()),
            },
            delivery: DeliveryConfig {
                apns_content_available: parse_bool(
                    "APNS_CONTENT_AVAILABLE",
                    var("APNS_CONTENT_AVAILABLE"),
                )?,
            },
        })
    }
}

fn parse_bool(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(raw) = value else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { name, value: raw }),
    }
}
