//! Ops HTTP surface: health, session listing, and session deletion.

mod handlers;
mod router;
mod types;

pub use handlers::AppState;
pub use router::{create_router, serve, ServerConfig};
pub use types::{ErrorResponse, ListSessionsResponse, SessionSummary};
