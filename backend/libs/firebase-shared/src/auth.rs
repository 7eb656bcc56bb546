use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::errors::FirebaseError;
use crate::models::*;

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Source of OAuth2 bearer tokens for Google REST APIs
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, FirebaseError>;
}

/// Fixed bearer token. The Firebase emulators accept `owner`.
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn emulator() -> Self {
        Self::new("owner")
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<String, FirebaseError> {
        Ok(self.token.clone())
    }
}

/// Service-account token source
///
/// Signs a JWT with the service account's private key, exchanges it for
/// an access token and caches the result until shortly before expiry.
pub struct ServiceAccountTokenSource {
    pub credentials: Arc<ServiceAccountKey>,
    token_cache: Arc<Mutex<Option<TokenCache>>>,
    http_client: reqwest::Client,
}

impl ServiceAccountTokenSource {
    pub fn new(credentials: ServiceAccountKey, http_client: reqwest::Client) -> Self {
        Self {
            credentials: Arc::new(credentials),
            token_cache: Arc::new(Mutex::new(None)),
            http_client,
        }
    }

    /// Load a service account key from a JSON key file
    pub fn from_key_file(
        path: impl AsRef<Path>,
        http_client: reqwest::Client,
    ) -> Result<Self, FirebaseError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FirebaseError::CredentialsError(format!("{}: {}", path.display(), e)))?;
        let credentials: ServiceAccountKey = serde_json::from_str(&raw)
            .map_err(|e| FirebaseError::CredentialsError(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(credentials, http_client))
    }

    fn signed_assertion(&self) -> Result<String, FirebaseError> {
        let now = Utc::now();
        let claims = JwtClaims {
            iss: self.credentials.client_email.clone(),
            sub: self.credentials.client_email.clone(),
            scope: CLOUD_PLATFORM_SCOPE.to_string(),
            aud: self.credentials.token_uri.clone(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| FirebaseError::KeyParseError(e.to_string()))?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.credentials.private_key_id.clone());

        encode(&header, &claims, &encoding_key)
            .map_err(|e| FirebaseError::JwtEncodeError(e.to_string()))
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String, FirebaseError> {
        if let Some(token) = fresh_token(&self.token_cache) {
            return Ok(token);
        }

        let assertion = self.signed_assertion()?;
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.credentials.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| FirebaseError::TokenError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FirebaseError::TokenRequestFailed(
                response.status().to_string(),
            ));
        }

        let token_response: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| FirebaseError::TokenParseError(e.to_string()))?;

        tracing::debug!(
            expires_in = token_response.expires_in,
            "obtained service account access token"
        );

        store_token(&self.token_cache, &token_response);
        Ok(token_response.access_token)
    }
}

pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Token source backed by the GCE/Cloud Run metadata server, used when
/// no service account key file is configured
pub struct MetadataServerTokenSource {
    token_url: String,
    token_cache: Arc<Mutex<Option<TokenCache>>>,
    http_client: reqwest::Client,
}

impl MetadataServerTokenSource {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            token_url: METADATA_TOKEN_URL.to_string(),
            token_cache: Arc::new(Mutex::new(None)),
            http_client,
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }
}

#[async_trait]
impl TokenSource for MetadataServerTokenSource {
    async fn access_token(&self) -> Result<String, FirebaseError> {
        if let Some(token) = fresh_token(&self.token_cache) {
            return Ok(token);
        }

        let response = self
            .http_client
            .get(&self.token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| FirebaseError::TokenError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FirebaseError::TokenRequestFailed(
                response.status().to_string(),
            ));
        }

        let token_response: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| FirebaseError::TokenParseError(e.to_string()))?;

        store_token(&self.token_cache, &token_response);
        Ok(token_response.access_token)
    }
}

fn fresh_token(cache: &Mutex<Option<TokenCache>>) -> Option<String> {
    let cache = cache.lock().ok()?;
    let cached = cache.as_ref()?;
    // Token is still valid for at least 60 more seconds
    if cached.expires_at > Utc::now().timestamp() + 60 {
        Some(cached.access_token.clone())
    } else {
        None
    }
}

fn store_token(cache: &Mutex<Option<TokenCache>>, token_response: &GoogleTokenResponse) {
    if let Ok(mut cache) = cache.lock() {
        *cache = Some(TokenCache {
            access_token: token_response.access_token.clone(),
            expires_at: Utc::now().timestamp() + token_response.expires_in,
        });
    }
}
