use std::sync::Arc;

use axum::http::{Method, header};
use chatwire_agent::EchoSource;
use chatwire_server::{AppState, ServerConfig, api};
use chatwire_storage::MemoryMessageStore;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() {
    // Initialize tracing logger
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chatwire_server=debug".into()),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting Chatwire streaming server");

    let config = ServerConfig::load().expect("Failed to load server config");

    // The demo wiring: in-memory persistence and the echo agent. The hosting
    // application swaps in its own collaborators here.
    let state = AppState::new(
        config.clone(),
        Arc::new(MemoryMessageStore::new()),
        Arc::new(EchoSource),
    );

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::CACHE_CONTROL]);

    let app = api::router(state).layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
