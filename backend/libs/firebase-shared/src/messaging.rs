use futures::future::join_all;
use std::sync::Arc;

use crate::auth::TokenSource;
use crate::errors::FirebaseError;
use crate::models::*;

pub const FCM_BASE_URL: &str = "https://fcm.googleapis.com";

/// Upper bound FCM places on a single `send_each` batch
pub const MAX_BATCH_SIZE: usize = 500;

/// Firebase Cloud Messaging Client
///
/// Sends data messages through the FCM HTTP v1 API.
pub struct FCMClient {
    pub project_id: String,
    base_url: String,
    token_source: Arc<dyn TokenSource>,
    http_client: reqwest::Client,
}

impl FCMClient {
    /// Create new FCM client
    ///
    /// # Arguments
    /// * `project_id` - Firebase project ID
    /// * `token_source` - OAuth2 bearer token provider
    pub fn new(
        project_id: String,
        token_source: Arc<dyn TokenSource>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            project_id,
            base_url: FCM_BASE_URL.to_string(),
            token_source,
            http_client,
        }
    }

    /// Point the client at another API host (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.base_url, self.project_id
        )
    }

    /// Send one message, returning the FCM message name
    pub async fn send(&self, message: &Message) -> Result<String, FirebaseError> {
        let access_token = self.token_source.access_token().await?;
        self.send_with_token(message, &access_token).await
    }

    async fn send_with_token(
        &self,
        message: &Message,
        access_token: &str,
    ) -> Result<String, FirebaseError> {
        let response = self
            .http_client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&FcmMessage { message })
            .send()
            .await
            .map_err(|e| FirebaseError::SendRequestError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FirebaseError::ApiError(status.to_string(), error_text));
        }

        let fcm_response: FcmApiResponse = response
            .json()
            .await
            .map_err(|e| FirebaseError::ResponseParseError(e.to_string()))?;

        fcm_response
            .name
            .ok_or_else(|| FirebaseError::ResponseParseError("missing message name".to_string()))
    }

    /// Send every message independently and concurrently
    ///
    /// Per-message failures are recorded in the returned [`BatchResponse`]
    /// in submission order. Only batch-level problems (empty or oversized
    /// batch, no access token) are returned as `Err`.
    pub async fn send_each(&self, messages: &[Message]) -> Result<BatchResponse, FirebaseError> {
        if messages.is_empty() {
            return Err(FirebaseError::InvalidBatch(
                "messages must be a non-empty list".to_string(),
            ));
        }
        if messages.len() > MAX_BATCH_SIZE {
            return Err(FirebaseError::InvalidBatch(format!(
                "messages list must not contain more than {} items",
                MAX_BATCH_SIZE
            )));
        }

        let access_token = self.token_source.access_token().await?;

        let sends = messages
            .iter()
            .map(|message| self.send_with_token(message, &access_token));

        let responses = join_all(sends)
            .await
            .into_iter()
            .map(|result| match result {
                Ok(message_id) => SendResponse::accepted(message_id),
                Err(e) => {
                    tracing::warn!(error = %e, "FCM message rejected");
                    SendResponse::rejected(e.to_string())
                }
            })
            .collect();

        let batch = BatchResponse::from_responses(responses);
        tracing::info!(
            success_count = batch.success_count,
            failure_count = batch.failure_count,
            "FCM batch send complete"
        );
        Ok(batch)
    }
}
