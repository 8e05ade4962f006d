//! Frontdesk server library logic.

pub mod api;
pub mod api_ws;
pub mod background;
pub mod config;

use axum::{routing::get, Extension, Json, Router};
use frontdesk_agent::{AgentConfig, FunctionRegistry};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Agent function dispatch over the store and knowledge base.
    pub registry: FunctionRegistry,
    /// Hosted agent settings, including the API key.
    pub agent: AgentConfig,
    /// Client for the agent's REST endpoints.
    pub http: reqwest::Client,
    /// Connected browsers.
    pub sessions: api_ws::SessionManager,
    /// Directory served for unmatched paths.
    pub static_dir: Option<String>,
}

impl AppState {
    pub fn new(registry: FunctionRegistry, agent: AgentConfig) -> Self {
        Self {
            registry,
            agent,
            http: reqwest::Client::new(),
            sessions: api_ws::SessionManager::new(),
            static_dir: None,
        }
    }

    pub fn with_static_dir(mut self, dir: Option<String>) -> Self {
        self.static_dir = dir;
        self
    }
}

/// Health check handler.
async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "active_sessions": state.sessions.count().await,
        "active_agents": state.sessions.active_agents().await,
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(api::index_handler))
        .route("/health", get(health))
        .route("/industries", get(api::industries_handler))
        .route("/tts-models", get(api::tts_models_handler))
        .route("/audio-devices", get(api::audio_devices_handler))
        .route("/ws", get(api_ws::ws_handler));

    let router = match state.static_dir.as_deref() {
        Some(dir) if std::path::Path::new(dir).is_dir() => {
            tracing::info!(path = %dir, "serving static files");
            router.fallback_service(ServeDir::new(dir))
        }
        Some(dir) => {
            tracing::warn!(path = %dir, "static directory not found, skipping static file serving");
            router
        }
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
