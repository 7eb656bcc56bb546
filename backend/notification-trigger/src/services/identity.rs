/// Caller identity resolution
///
/// Turns the bearer token presented with a callable request into a
/// [`Caller`]. Verification itself lives in `firebase-shared`.
use async_trait::async_trait;
use firebase_shared::{FirebaseError, IdTokenVerifier};

use crate::models::Caller;

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify_id_token(&self, id_token: &str) -> Result<Caller, FirebaseError>;
}

pub struct FirebaseIdentityVerifier {
    verifier: IdTokenVerifier,
}

impl FirebaseIdentityVerifier {
    pub fn new(verifier: IdTokenVerifier) -> Self {
        Self { verifier }
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseIdentityVerifier {
    async fn verify_id_token(&self, id_token: &str) -> Result<Caller, FirebaseError> {
        let decoded = self.verifier.verify(id_token).await?;
        Ok(Caller { uid: decoded.uid })
    }
}
