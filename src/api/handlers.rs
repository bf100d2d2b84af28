//! Ops API handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::types::{ErrorResponse, ListSessionsResponse, SessionSummary};
use crate::session::{HealthStatus, SessionKey, SessionStore};

/// Shared application state.
///
/// The store is constructed once at process start and passed in by
/// reference; there are no ambient singletons.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
}

impl AppState {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }
}

/// Health check endpoint, reporting which backend is serving.
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.store.health_check().await)
}

/// API information endpoint.
pub async fn api_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "chat-flow",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// List active sessions with their states and a per-state distribution.
pub async fn list_sessions(State(state): State<AppState>) -> Json<ListSessionsResponse> {
    let keys = state.store.list_active_sessions().await;

    let mut sessions = Vec::with_capacity(keys.len());
    let mut by_state: HashMap<String, usize> = HashMap::new();
    for key in keys {
        if let Some(flow_state) = state.store.get_state(&key).await {
            let encoded = flow_state.to_string();
            *by_state.entry(encoded.clone()).or_default() += 1;
            sessions.push(SessionSummary {
                user_id: key.user_id,
                conversation_id: key.conversation_id,
                state: encoded,
            });
        }
    }

    Json(ListSessionsResponse {
        count: sessions.len(),
        sessions,
        by_state,
    })
}

/// Delete a session's state and record.
pub async fn delete_session(
    State(state): State<AppState>,
    Path((user_id, conversation_id)): Path<(i64, i64)>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let key = SessionKey::new(user_id, conversation_id);

    if state.store.get_state(&key).await.is_none() && state.store.get_data(&key).await.is_none() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::session_not_found(&key.to_string())),
        ));
    }

    state.store.clear(&key).await;
    Ok(StatusCode::NO_CONTENT)
}
