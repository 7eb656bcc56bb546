use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Authenticated subject of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub uid: String,
}

/// What the invocation context asserts about the caller
#[derive(Debug, Clone, Default)]
pub struct CallerContext {
    pub auth: Option<Caller>,
}

impl CallerContext {
    pub fn anonymous() -> Self {
        Self { auth: None }
    }

    pub fn authenticated(uid: impl Into<String>) -> Self {
        Self {
            auth: Some(Caller { uid: uid.into() }),
        }
    }
}

/// Per-user record holding the device push token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserTokenRecord {
    pub fcm_token: Option<String>,
}

impl UserTokenRecord {
    /// The token, if present and non-empty
    pub fn token(&self) -> Option<&str> {
        self.fcm_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Transaction kind carried in the notification data
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Expense,
    Income,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Expense => "expense",
            TransactionType::Income => "income",
        }
    }
}

/// Data payload the mobile client's listener expects
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationPayload {
    pub source: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl NotificationPayload {
    /// Flat string map as FCM data messages require
    pub fn to_data(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("source".to_string(), self.source.clone()),
            ("text".to_string(), self.text.clone()),
            ("type".to_string(), self.kind.as_str().to_string()),
        ])
    }
}

/// Summary of one fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    pub accepted: usize,
    pub attempted: usize,
}

/// Result returned to the caller on success
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriggerResponse {
    pub status: String,
    pub message: String,
}

impl TriggerResponse {
    pub fn from_dispatch(result: DispatchResult) -> Self {
        Self {
            status: "success".to_string(),
            message: format!("{} messages sent successfully.", result.accepted),
        }
    }
}

/// Callable success envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct CallableResult<T> {
    pub result: T,
}

/// Callable error envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct CallableError {
    pub error: CallableErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CallableErrorBody {
    pub status: String,
    pub message: String,
}
