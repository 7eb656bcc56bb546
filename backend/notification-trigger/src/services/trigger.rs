use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{CallerContext, DispatchResult, TriggerResponse};
use crate::services::payloads::{build_messages, demo_payloads, DeliveryHints};
use crate::services::{PushGateway, TokenStore};

/// Looks up the caller's device token and fans the demo payloads out to it
pub struct NotificationTrigger {
    token_store: Arc<dyn TokenStore>,
    gateway: Arc<dyn PushGateway>,
    hints: DeliveryHints,
}

impl NotificationTrigger {
    pub fn new(
        token_store: Arc<dyn TokenStore>,
        gateway: Arc<dyn PushGateway>,
        hints: DeliveryHints,
    ) -> Self {
        Self {
            token_store,
            gateway,
            hints,
        }
    }

    pub async fn trigger(&self, context: &CallerContext) -> Result<TriggerResponse> {
        let outcome = self.run(context).await;
        metrics::record_trigger(match &outcome {
            Ok(_) => "success",
            Err(e) => e.code(),
        });
        outcome
    }

    async fn run(&self, context: &CallerContext) -> Result<TriggerResponse> {
        let caller = context.auth.as_ref().ok_or(AppError::Unauthenticated)?;

        let record = self.token_store.fetch_token_record(&caller.uid).await?;
        let token = match record.as_ref().and_then(|r| r.token()) {
            Some(token) => token,
            None => {
                warn!(uid = %caller.uid, "no device token on file");
                return Err(AppError::PreconditionFailed);
            }
        };

        let messages = build_messages(token, &demo_payloads(), self.hints);
        let attempted = messages.len();

        let batch = self.gateway.send_each(messages).await?;
        let result = DispatchResult {
            accepted: batch.success_count,
            attempted,
        };
        metrics::record_messages(result.accepted, attempted.saturating_sub(result.accepted));

        info!(
            uid = %caller.uid,
            accepted = result.accepted,
            attempted = result.attempted,
            "demo notifications dispatched"
        );

        Ok(TriggerResponse::from_dispatch(result))
    }
}
