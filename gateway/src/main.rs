mod api;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::{RelayError, RunFlowBody};
use relay_core::{Config, FlowClient};

// Application state: the configured client is all a request needs.
#[derive(Clone)]
struct AppState {
    client: Arc<FlowClient>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so RUST_LOG and the relay settings can live there.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    info!("Flow Relay initializing...");

    let config = Arc::new(Config::from_env().await.context("Failed to load configuration")?);
    info!(
        base_api_url = %config.base_api_url,
        endpoint = %config.endpoint,
        tweaks = config.tweaks.len(),
        timeout = ?config.request_timeout,
        "Configuration loaded"
    );

    let client = FlowClient::new(config.clone())?;
    let state = AppState {
        client: Arc::new(client),
    };

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Relay listening on {}...", addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/run_flow", post(run_flow))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// --- HANDLERS ---

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "flow-relay",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn run_flow(
    State(state): State<AppState>,
    payload: Result<Json<RunFlowBody>, JsonRejection>,
) -> Result<Json<Value>, RelayError> {
    let Json(body) = payload
        .inspect_err(|e| error!("Rejected run_flow body: {}", e))
        .map_err(RelayError::rejected)?;
    let request = body.into_run_request(state.client.config());

    info!(endpoint = %request.endpoint, "Relaying message to flow");

    match state.client.run(&request).await {
        Ok(response) => {
            info!(endpoint = %request.endpoint, "Flow responded");
            Ok(Json(response))
        }
        Err(e) => {
            error!(endpoint = %request.endpoint, "Flow run failed: {:#}", e);
            Err(e.into())
        }
    }
}
