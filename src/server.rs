use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::api;
use crate::config::AppConfig;
use crate::extraction::{ExtractionGateway, GatewayFactory};
use crate::pipeline::Pipeline;
use crate::store::FileStore;

/// Build application state around the given gateway.
pub fn build_state(config: Arc<AppConfig>, gateway: Arc<dyn ExtractionGateway>) -> AppState {
    let store = FileStore::new();
    let pipeline = Pipeline::new(store.clone(), gateway);
    AppState {
        store,
        pipeline,
        config,
    }
}

/// Build the full router with middleware.
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);
    let body_limit = state.config.upload.max_total_size;

    Router::new()
        .route("/health", get(health))
        .nest("/api", api::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                // Event streams stay open for the life of the connection.
                if req.uri().path() == "/api/events" {
                    return next.run(req).await;
                }
                match tokio::time::timeout(timeout, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
                }
            },
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let gateway = GatewayFactory::create(&config.gateway);
    info!(
        name: "gateway.selected",
        gateway = gateway.name(),
        "Extraction gateway ready"
    );

    let state = build_state(Arc::clone(&config), gateway);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    gateway: &'static str,
    files: usize,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        gateway: state.pipeline.gateway_name(),
        files: state.store.len(),
    })
}
