use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;
use tracing::{error, warn};

use crate::error::AppError;
use crate::models::{CallableResult, CallerContext};
use crate::services::{IdentityVerifier, NotificationTrigger};

/// Process-wide handles shared by every invocation
pub struct AppState {
    pub trigger: Arc<NotificationTrigger>,
    pub identity: Arc<dyn IdentityVerifier>,
}

/// Trigger the demo notifications for the signed-in caller
///
/// POST /{function_name}
///
/// The request body is not read; callable clients send `{"data": ...}`
/// but nothing in it is used.
pub async fn simulate_notification(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let context = resolve_caller(&req, state.identity.as_ref()).await;
    let response = state.trigger.trigger(&context).await?;

    Ok(HttpResponse::Ok().json(CallableResult { result: response }))
}

/// Build the caller context from the `Authorization` header
///
/// A missing header, or a token that fails verification, leaves the
/// context anonymous; the trigger then rejects it as unauthenticated.
async fn resolve_caller(req: &HttpRequest, identity: &dyn IdentityVerifier) -> CallerContext {
    let Some(token) = bearer_token(req) else {
        return CallerContext::anonymous();
    };

    match identity.verify_id_token(token).await {
        Ok(caller) => CallerContext { auth: Some(caller) },
        Err(e) if e.is_invalid_id_token() => {
            warn!(error = %e, "rejected ID token");
            CallerContext::anonymous()
        }
        Err(e) => {
            error!(error = %e, "ID token verification unavailable");
            CallerContext::anonymous()
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Register routes
pub fn register_routes(cfg: &mut web::ServiceConfig, function_name: &str) {
    cfg.route(
        &format!("/{}", function_name.trim_start_matches('/')),
        web::post().to(simulate_notification),
    );
}
