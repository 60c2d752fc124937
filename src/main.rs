use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use agendamento_webhook::config::AppConfig;
use agendamento_webhook::handlers;
use agendamento_webhook::services::crm::bitrix::BitrixClient;
use agendamento_webhook::services::scheduling::belle::BelleClient;
use agendamento_webhook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    anyhow::ensure!(
        !config.bitrix_webhook_url.is_empty(),
        "BITRIX_WEBHOOK_URL must be set"
    );

    let timeout = Duration::from_secs(config.http_timeout_secs);
    tracing::info!(belle_url = %config.belle_url, "using Belle scheduling provider");
    let scheduler = BelleClient::new(config.belle_url.clone(), timeout)?;
    let crm = BitrixClient::new(config.bitrix_webhook_url.clone(), timeout)?;

    let state = Arc::new(AppState {
        config: config.clone(),
        scheduler: Box::new(scheduler),
        crm: Box::new(crm),
    });

    let app = Router::new()
        .route("/", get(handlers::health::health))
        .route(
            "/webhook/agendar",
            post(handlers::schedule::schedule_json).get(handlers::schedule::schedule_query),
        )
        .route("/webhook/bitrix", post(handlers::debug::bitrix_raw))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
