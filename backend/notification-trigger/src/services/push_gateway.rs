use async_trait::async_trait;
use firebase_shared::{BatchResponse, FCMClient, FirebaseError, Message};
use std::sync::Arc;

/// Write-only push delivery
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Submit every message independently; per-message rejections are
    /// reported in the batch response, not as `Err`
    async fn send_each(&self, messages: Vec<Message>) -> Result<BatchResponse, FirebaseError>;
}

pub struct FcmPushGateway {
    client: Arc<FCMClient>,
}

impl FcmPushGateway {
    pub fn new(client: Arc<FCMClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PushGateway for FcmPushGateway {
    async fn send_each(&self, messages: Vec<Message>) -> Result<BatchResponse, FirebaseError> {
        self.client.send_each(&messages).await
    }
}
