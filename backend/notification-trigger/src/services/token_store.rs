use async_trait::async_trait;
use firebase_shared::{FirebaseError, FirestoreClient};
use std::sync::Arc;

use crate::models::UserTokenRecord;

/// Read-only access to per-user token records
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// `Ok(None)` when the user has no record at all
    async fn fetch_token_record(&self, uid: &str)
        -> Result<Option<UserTokenRecord>, FirebaseError>;
}

/// Token records stored as Firestore documents keyed by uid
pub struct FirestoreTokenStore {
    client: Arc<FirestoreClient>,
    collection: String,
    token_field: String,
}

impl FirestoreTokenStore {
    pub fn new(client: Arc<FirestoreClient>, collection: String, token_field: String) -> Self {
        Self {
            client,
            collection,
            token_field,
        }
    }
}

#[async_trait]
impl TokenStore for FirestoreTokenStore {
    async fn fetch_token_record(
        &self,
        uid: &str,
    ) -> Result<Option<UserTokenRecord>, FirebaseError> {
        let document = self.client.get_document(&self.collection, uid).await?;

        Ok(document.map(|doc| UserTokenRecord {
            fcm_token: doc.get_str(&self.token_field).map(str::to_string),
        }))
    }
}
