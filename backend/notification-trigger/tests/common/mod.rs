#![allow(dead_code)]
/// Shared mocks for the three collaborators of the trigger
use async_trait::async_trait;
use firebase_shared::{BatchResponse, FirebaseError, Message, SendResponse};
use mockall::mock;
use notification_trigger::models::{Caller, UserTokenRecord};
use notification_trigger::services::{
    DeliveryHints, IdentityVerifier, NotificationTrigger, PushGateway, TokenStore,
};
use std::sync::Arc;

mock! {
    pub Store {}

    #[async_trait]
    impl TokenStore for Store {
        async fn fetch_token_record(&self, uid: &str)
            -> Result<Option<UserTokenRecord>, FirebaseError>;
    }
}

mock! {
    pub Gateway {}

    #[async_trait]
    impl PushGateway for Gateway {
        async fn send_each(&self, messages: Vec<Message>) -> Result<BatchResponse, FirebaseError>;
    }
}

mock! {
    pub Identity {}

    #[async_trait]
    impl IdentityVerifier for Identity {
        async fn verify_id_token(&self, id_token: &str) -> Result<Caller, FirebaseError>;
    }
}

pub fn record(token: Option<&str>) -> UserTokenRecord {
    UserTokenRecord {
        fcm_token: token.map(str::to_string),
    }
}

/// Gateway response accepting the first `accepted` messages
pub fn batch(accepted: usize, total: usize) -> BatchResponse {
    let responses = (0..total)
        .map(|i| {
            if i < accepted {
                SendResponse::accepted(format!("projects/demo/messages/{}", i))
            } else {
                SendResponse::rejected("FCM API error: 404 Not Found - UNREGISTERED".to_string())
            }
        })
        .collect();
    BatchResponse::from_responses(responses)
}

pub fn trigger(store: MockStore, gateway: MockGateway) -> NotificationTrigger {
    NotificationTrigger::new(Arc::new(store), Arc::new(gateway), DeliveryHints::default())
}
