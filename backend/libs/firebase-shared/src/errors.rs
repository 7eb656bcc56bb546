use thiserror::Error;

/// Firebase client error types
#[derive(Error, Debug)]
pub enum FirebaseError {
    #[error("Failed to read service account key: {0}")]
    CredentialsError(String),

    #[error("Failed to parse private key: {0}")]
    KeyParseError(String),

    #[error("Failed to encode JWT: {0}")]
    JwtEncodeError(String),

    #[error("Failed to get access token: {0}")]
    TokenError(String),

    #[error("Token request failed with status: {0}")]
    TokenRequestFailed(String),

    #[error("Failed to parse token response: {0}")]
    TokenParseError(String),

    #[error("FCM send request failed: {0}")]
    SendRequestError(String),

    #[error("Failed to parse FCM response: {0}")]
    ResponseParseError(String),

    #[error("FCM API error: {0} - {1}")]
    ApiError(String, String),

    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    #[error("Firestore request failed: {0}")]
    FirestoreRequestError(String),

    #[error("Firestore API error: {0} - {1}")]
    FirestoreApiError(String, String),

    #[error("Failed to fetch ID token signing keys: {0}")]
    SigningKeysError(String),

    #[error("Invalid ID token: {0}")]
    InvalidIdToken(String),
}

impl FirebaseError {
    /// True for errors caused by the presented ID token rather than by
    /// the verifier's own infrastructure.
    pub fn is_invalid_id_token(&self) -> bool {
        matches!(self, FirebaseError::InvalidIdToken(_))
    }
}
