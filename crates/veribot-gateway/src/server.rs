//! HTTP server implementation using Axum.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use veribot_agent::ChatEngine;
use veribot_core::config::{GatewayConfig, VeribotConfig};

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    /// The chat engine. One mutex serializes mutations; `search` itself is
    /// read-only but `ask` records history, so every request locks.
    pub engine: Arc<tokio::sync::Mutex<ChatEngine>>,
    pub gateway_config: GatewayConfig,
    pub start_time: std::time::Instant,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let shared = Arc::new(state);

    let api = Router::new()
        .route("/api/v1/status", get(super::routes::status))
        .route("/api/v1/chat", post(super::routes::chat))
        .route("/api/v1/stats", get(super::routes::stats))
        .route("/api/v1/update", post(super::routes::update_knowledge))
        .route(
            "/api/v1/knowledge/search",
            post(super::routes::knowledge_search),
        )
        .route(
            "/api/v1/knowledge/documents",
            post(super::routes::knowledge_add_document),
        )
        .route(
            "/api/v1/knowledge/faqs",
            post(super::routes::knowledge_add_faq),
        )
        .route(
            "/api/v1/knowledge/faqs/{category}",
            get(super::routes::knowledge_faqs_by_category),
        )
        .route(
            "/api/v1/knowledge/locations",
            get(super::routes::knowledge_list_locations).post(super::routes::knowledge_add_location),
        )
        .route(
            "/api/v1/knowledge/schedules",
            get(super::routes::knowledge_list_schedules).post(super::routes::knowledge_add_schedule),
        )
        .route("/health", get(super::routes::health_check));

    api.layer({
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any)
            .max_age(std::time::Duration::from_secs(3600));

        // Restrict CORS origins in production via env var
        // Example: VERIBOT_CORS_ORIGINS=https://forum.example.org
        if let Ok(origins_str) = std::env::var("VERIBOT_CORS_ORIGINS") {
            let origins: Vec<_> = origins_str
                .split(',')
                .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
                .collect();
            cors.allow_origin(origins)
        } else {
            // Development fallback — allow all origins
            cors.allow_origin(Any)
        }
    })
    .layer(TraceLayer::new_for_http())
    .with_state(shared)
}

/// Start the HTTP server.
pub async fn start(config: &VeribotConfig, engine: ChatEngine) -> anyhow::Result<()> {
    let state = AppState {
        engine: Arc::new(tokio::sync::Mutex::new(engine)),
        gateway_config: config.gateway.clone(),
        start_time: std::time::Instant::now(),
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Gateway server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
