use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Firebase Service Account Key
///
/// Only the fields needed for the OAuth2 JWT-bearer flow are read; the
/// rest of the downloaded JSON key file is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    pub client_id: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// OAuth2 Token Cache
#[derive(Debug, Clone)]
pub struct TokenCache {
    pub access_token: String,
    pub expires_at: i64,
}

/// JWT Claims for Google OAuth2
#[derive(Debug, Serialize)]
pub struct JwtClaims {
    pub iss: String,
    pub sub: String,
    pub scope: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

/// Google OAuth2 Token Response
#[derive(Debug, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// A single FCM data message addressed to one device token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub token: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apns: Option<ApnsConfig>,
}

impl Message {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            data: BTreeMap::new(),
            android: None,
            apns: None,
        }
    }
}

/// Android delivery options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AndroidConfig {
    pub priority: AndroidPriority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AndroidPriority {
    Normal,
    High,
}

/// APNs delivery options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApnsConfig {
    pub payload: ApnsPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

/// The `aps` dictionary. Keys APNs does not recognise are carried in
/// `custom` and serialized next to the known ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aps {
    #[serde(
        rename = "content-available",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_available: Option<u8>,
    #[serde(flatten)]
    pub custom: BTreeMap<String, serde_json::Value>,
}

/// FCM Message Request
#[derive(Debug, Serialize)]
pub struct FcmMessage<'a> {
    pub message: &'a Message,
}

/// FCM API Response
#[derive(Debug, Deserialize)]
pub struct FcmApiResponse {
    pub name: Option<String>,
}

/// Outcome of one message inside a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendResponse {
    pub message_id: Option<String>,
    pub success: bool,
    pub error: Option<String>,
}

impl SendResponse {
    pub fn accepted(message_id: String) -> Self {
        Self {
            message_id: Some(message_id),
            success: true,
            error: None,
        }
    }

    pub fn rejected(error: String) -> Self {
        Self {
            message_id: None,
            success: false,
            error: Some(error),
        }
    }
}

/// Batch send result, one entry per submitted message in submission order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub success_count: usize,
    pub failure_count: usize,
    pub responses: Vec<SendResponse>,
}

impl BatchResponse {
    pub fn from_responses(responses: Vec<SendResponse>) -> Self {
        let success_count = responses.iter().filter(|r| r.success).count();
        Self {
            success_count,
            failure_count: responses.len() - success_count,
            responses,
        }
    }
}
