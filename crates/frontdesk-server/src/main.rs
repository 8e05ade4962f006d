//! Frontdesk server binary.
//!
//! Loads the mock business data and the knowledge base, then serves the
//! control page and the browser session socket until SIGTERM/SIGINT.

use frontdesk_agent::FunctionRegistry;
use frontdesk_knowledge::KnowledgeBase;
use frontdesk_server::{app, background, config, AppState};
use frontdesk_store::BusinessService;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("FRONTDESK_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration");

    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );
    tracing::debug!(agent = ?config.agent, "agent configuration");

    if config.agent.api_key().is_none() {
        tracing::warn!("DEEPGRAM_API_KEY not set; voice sessions will be refused");
    }

    let store = BusinessService::open(config.store.options())
        .await
        .expect("failed to load mock data, check store.data_file in config");

    let kb = match KnowledgeBase::open(&config.knowledge.dir) {
        Ok(kb) => Some(kb),
        Err(e) => {
            tracing::warn!(path = %config.knowledge.dir, error = %e, "knowledge base unavailable");
            None
        }
    };

    tokio::spawn(background::start_sync_task(
        store.clone(),
        config.store.sync_interval_secs,
    ));

    let state = AppState::new(FunctionRegistry::new(store, kb), config.agent.clone())
        .with_static_dir(config.server.static_dir.clone());
    let app = app(state);
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting frontdesk server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address, is another process using this port?");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("frontdesk server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
