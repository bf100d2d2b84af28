//! Ops API router configuration.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{api_info, delete_session, health, list_sessions, AppState};

/// Create the ops API router.
pub fn create_router(state: AppState) -> Router {
    // Session routes
    let session_routes = Router::new()
        .route("/", get(list_sessions))
        .route("/{user_id}/{conversation_id}", delete(delete_session));

    // API v1 routes
    let api_v1 = Router::new()
        .route("/", get(api_info))
        .nest("/sessions", session_routes);

    // Build main router
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Start the ops API server.
pub async fn serve(config: ServerConfig, state: AppState) -> crate::Result<()> {
    let addr = config.bind_address();
    let router = create_router(state);

    tracing::info!("Starting chat-flow ops API on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(crate::error::ChatFlowError::Io)?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| crate::error::ChatFlowError::Io(std::io::Error::other(e.to_string())))?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, stopping ops API"),
        Err(e) => {
            tracing::warn!("Failed to install shutdown handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
