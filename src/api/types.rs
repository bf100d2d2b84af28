//! API response types.

use std::collections::HashMap;

use serde::Serialize;

/// Brief session summary for listing.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub user_id: i64,
    pub conversation_id: i64,
    /// Canonical `"Group:member"` state encoding.
    pub state: String,
}

/// List sessions response.
#[derive(Debug, Clone, Serialize)]
pub struct ListSessionsResponse {
    /// Total number of active sessions.
    pub count: usize,
    /// Session summaries.
    pub sessions: Vec<SessionSummary>,
    /// Session counts per state.
    pub by_state: HashMap<String, usize>,
}

/// Generic API error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "SESSION_NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn session_not_found(key: &str) -> Self {
        Self::new("SESSION_NOT_FOUND", format!("Session '{}' not found", key))
    }
}
