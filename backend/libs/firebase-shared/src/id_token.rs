use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::errors::FirebaseError;

pub const SECURETOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Allowed clock skew when checking `exp` and `iat`
const CLOCK_SKEW_SECS: i64 = 60;

/// Fallback lifetime for signing keys when no max-age is sent
const DEFAULT_KEYS_TTL_SECS: i64 = 3600;

const MAX_UID_LEN: usize = 128;

/// Claims carried by a Firebase Auth ID token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub aud: String,
    pub iss: String,
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default)]
    pub auth_time: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A verified ID token
#[derive(Debug, Clone)]
pub struct DecodedIdToken {
    pub uid: String,
    pub claims: IdTokenClaims,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationMode {
    /// RS256 signatures checked against Google's published keys
    Signed,
    /// Auth emulator tokens are unsigned; only claims are checked
    Emulator,
}

struct CachedKeys {
    keys: JwkSet,
    expires_at: i64,
}

/// Verifies Firebase Auth ID tokens for one project
pub struct IdTokenVerifier {
    pub project_id: String,
    mode: VerificationMode,
    jwks_url: String,
    keys: Mutex<Option<CachedKeys>>,
    http_client: reqwest::Client,
}

impl IdTokenVerifier {
    pub fn new(project_id: String, mode: VerificationMode, http_client: reqwest::Client) -> Self {
        Self {
            project_id,
            mode,
            jwks_url: SECURETOKEN_JWKS_URL.to_string(),
            keys: Mutex::new(None),
            http_client,
        }
    }

    pub fn with_jwks_url(mut self, jwks_url: impl Into<String>) -> Self {
        self.jwks_url = jwks_url.into();
        self
    }

    fn expected_issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    /// Verify an ID token and return the caller's uid
    pub async fn verify(&self, id_token: &str) -> Result<DecodedIdToken, FirebaseError> {
        let claims = match self.mode {
            VerificationMode::Signed => self.verify_signed(id_token).await?,
            VerificationMode::Emulator => decode_unsigned(id_token)?,
        };

        validate_claims(&claims, &self.project_id, Utc::now().timestamp())?;

        Ok(DecodedIdToken {
            uid: claims.sub.clone(),
            claims,
        })
    }

    async fn verify_signed(&self, id_token: &str) -> Result<IdTokenClaims, FirebaseError> {
        let header =
            decode_header(id_token).map_err(|e| FirebaseError::InvalidIdToken(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(FirebaseError::InvalidIdToken(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| FirebaseError::InvalidIdToken("missing kid header".to_string()))?;

        let keys = self.signing_keys().await?;
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| FirebaseError::InvalidIdToken(format!("unknown kid {}", kid)))?;
        let decoding_key = DecodingKey::from_jwk(jwk)
            .map_err(|e| FirebaseError::SigningKeysError(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = CLOCK_SKEW_SECS as u64;
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[self.expected_issuer()]);

        let data = decode::<IdTokenClaims>(id_token, &decoding_key, &validation)
            .map_err(|e| FirebaseError::InvalidIdToken(e.to_string()))?;
        Ok(data.claims)
    }

    fn cached_keys(&self, now: i64) -> Option<JwkSet> {
        let cache = self.keys.lock().ok()?;
        cache
            .as_ref()
            .filter(|cached| cached.expires_at > now)
            .map(|cached| cached.keys.clone())
    }

    async fn signing_keys(&self) -> Result<JwkSet, FirebaseError> {
        let now = Utc::now().timestamp();
        if let Some(keys) = self.cached_keys(now) {
            return Ok(keys);
        }

        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| FirebaseError::SigningKeysError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FirebaseError::SigningKeysError(format!(
                "status {}",
                response.status()
            )));
        }

        let ttl = response
            .headers()
            .get(reqwest::header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(max_age_seconds)
            .unwrap_or(DEFAULT_KEYS_TTL_SECS);

        let keys: JwkSet = response
            .json()
            .await
            .map_err(|e| FirebaseError::SigningKeysError(e.to_string()))?;

        tracing::debug!(count = keys.keys.len(), ttl, "refreshed ID token signing keys");

        if let Ok(mut cache) = self.keys.lock() {
            *cache = Some(CachedKeys {
                keys: keys.clone(),
                expires_at: now + ttl,
            });
        }
        Ok(keys)
    }
}

/// Check the Firebase-specific claim rules against `now` (unix seconds)
pub fn validate_claims(
    claims: &IdTokenClaims,
    project_id: &str,
    now: i64,
) -> Result<(), FirebaseError> {
    if claims.aud != project_id {
        return Err(FirebaseError::InvalidIdToken(format!(
            "audience {} does not match project {}",
            claims.aud, project_id
        )));
    }
    let issuer = format!("https://securetoken.google.com/{}", project_id);
    if claims.iss != issuer {
        return Err(FirebaseError::InvalidIdToken(format!(
            "unexpected issuer {}",
            claims.iss
        )));
    }
    if claims.sub.is_empty() || claims.sub.len() > MAX_UID_LEN {
        return Err(FirebaseError::InvalidIdToken(
            "subject must be a non-empty string of at most 128 characters".to_string(),
        ));
    }
    if claims.exp + CLOCK_SKEW_SECS <= now {
        return Err(FirebaseError::InvalidIdToken("token has expired".to_string()));
    }
    if claims.iat - CLOCK_SKEW_SECS > now {
        return Err(FirebaseError::InvalidIdToken(
            "token issued in the future".to_string(),
        ));
    }
    Ok(())
}

fn decode_unsigned(id_token: &str) -> Result<IdTokenClaims, FirebaseError> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| FirebaseError::InvalidIdToken("malformed token".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| FirebaseError::InvalidIdToken(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| FirebaseError::InvalidIdToken(e.to_string()))
}

/// `max-age` directive of a Cache-Control header, in seconds
fn max_age_seconds(cache_control: &str) -> Option<i64> {
    cache_control
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|secs| secs.trim().parse().ok())
}
