/// Error types for the notification trigger
///
/// The two failures the trigger detects itself carry a stable callable
/// code and a user-facing message. Everything else collapses into
/// `Internal`, which is logged in full but rendered opaquely.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use firebase_shared::FirebaseError;
use thiserror::Error;

use crate::models::{CallableError, CallableErrorBody};

/// Result type for trigger operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Caller has no verified identity
    #[error("User must be signed in to trigger the demo.")]
    Unauthenticated,

    /// No device token on file for the caller
    #[error("FCM token not found. Ensure your app has registered the token to Firestore.")]
    PreconditionFailed,

    /// Datastore, gateway or any other unclassified failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Callable error code, as the client SDKs report it
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "unauthenticated",
            AppError::PreconditionFailed => "failed-precondition",
            AppError::Internal(_) => "internal",
        }
    }

    /// Canonical status name used on the wire
    pub fn wire_status(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::PreconditionFailed => "FAILED_PRECONDITION",
            AppError::Internal(_) => "INTERNAL",
        }
    }

    /// Message shown to the caller; internal details are withheld
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) => "INTERNAL".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::PreconditionFailed => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            tracing::error!(error = %detail, "callable failed with internal error");
        }

        HttpResponse::build(self.status_code()).json(CallableError {
            error: CallableErrorBody {
                status: self.wire_status().to_string(),
                message: self.public_message(),
            },
        })
    }
}

impl From<FirebaseError> for AppError {
    fn from(err: FirebaseError) -> Self {
        AppError::Internal(err.to_string())
    }
}
