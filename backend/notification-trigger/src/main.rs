use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use firebase_shared::{
    FCMClient, FirestoreClient, IdTokenVerifier, MetadataServerTokenSource,
    ServiceAccountTokenSource, StaticTokenSource, TokenSource, VerificationMode,
};
use notification_trigger::{
    config::FirebaseConfig,
    handlers::register_routes,
    metrics,
    services::{DeliveryHints, FcmPushGateway, FirebaseIdentityVerifier, FirestoreTokenStore},
    AppState, Config, NotificationTrigger,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(json_logs: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Credentials for the production Google APIs: a key file when one is
/// configured, otherwise the runtime's metadata server
fn google_token_source(
    firebase: &FirebaseConfig,
    http_client: &reqwest::Client,
) -> anyhow::Result<Arc<dyn TokenSource>> {
    match &firebase.credentials_path {
        Some(path) => {
            let source = ServiceAccountTokenSource::from_key_file(path, http_client.clone())
                .context("failed to load service account credentials")?;
            tracing::info!(path = %path, "using service account key file");
            Ok(Arc::new(source))
        }
        None => {
            tracing::info!("using metadata server credentials");
            Ok(Arc::new(MetadataServerTokenSource::new(http_client.clone())))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    init_tracing(config.app.json_logs);

    tracing::info!(
        env = %config.app.env,
        project_id = %config.firebase.project_id,
        "Starting notification trigger"
    );

    let http_client = reqwest::Client::new();
    let google_tokens = google_token_source(&config.firebase, &http_client)?;
    let project_id = config.firebase.project_id.clone();

    let firestore = match &config.firebase.firestore_emulator_host {
        Some(host) => {
            tracing::info!(host = %host, "using Firestore emulator");
            FirestoreClient::new(
                project_id.clone(),
                Arc::new(StaticTokenSource::emulator()),
                http_client.clone(),
            )
            .with_base_url(format!("http://{}", host))
        }
        None => FirestoreClient::new(project_id.clone(), google_tokens.clone(), http_client.clone()),
    };

    let fcm = FCMClient::new(project_id.clone(), google_tokens, http_client.clone());

    let verification_mode = if config.firebase.auth_emulator_host.is_some() {
        tracing::warn!("Auth emulator configured; ID token signatures are not checked");
        VerificationMode::Emulator
    } else {
        VerificationMode::Signed
    };
    let verifier = IdTokenVerifier::new(project_id, verification_mode, http_client);

    let token_store = Arc::new(FirestoreTokenStore::new(
        Arc::new(firestore),
        config.firebase.users_collection.clone(),
        config.firebase.token_field.clone(),
    ));
    let gateway = Arc::new(FcmPushGateway::new(Arc::new(fcm)));
    let hints = DeliveryHints {
        apns_content_available: config.delivery.apns_content_available,
    };

    let state = web::Data::new(AppState {
        trigger: Arc::new(NotificationTrigger::new(token_store, gateway, hints)),
        identity: Arc::new(FirebaseIdentityVerifier::new(verifier)),
    });

    let addr = format!("0.0.0.0:{}", config.app.port);
    let function_name = config.app.function_name.clone();
    tracing::info!(addr = %addr, function = %function_name, "Starting HTTP server");

    HttpServer::new(move || {
        let function_name = function_name.clone();
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .wrap(metrics::MetricsMiddleware)
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .configure(move |cfg| register_routes(cfg, &function_name))
    })
    .bind(&addr)
    .with_context(|| format!("failed to bind {}", addr))?
    .run()
    .await
    .context("HTTP server error")
}
