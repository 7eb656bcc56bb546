/// Firebase Shared Library
///
/// REST clients for the Firebase services a backend talks to:
/// - OAuth2 access tokens from Google service accounts, with caching
/// - Firebase Cloud Messaging (FCM HTTP v1) single and batch sends
/// - Cloud Firestore document reads
/// - Firebase Auth ID token verification

pub mod auth;
pub mod errors;
pub mod firestore;
pub mod id_token;
pub mod messaging;
pub mod models;

pub use auth::{
    MetadataServerTokenSource, ServiceAccountTokenSource, StaticTokenSource, TokenSource,
};
pub use errors::FirebaseError;
pub use firestore::{Document, FirestoreClient};
pub use id_token::{DecodedIdToken, IdTokenVerifier, VerificationMode};
pub use messaging::FCMClient;
pub use models::{
    AndroidConfig, AndroidPriority, ApnsConfig, ApnsPayload, Aps, BatchResponse, Message,
    SendResponse, ServiceAccountKey,
};
