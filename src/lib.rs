//! # chat-flow
//!
//! Finite-state conversation session manager for chat-bot services.
//!
//! This crate drives multi-step conversational flows (guided wizards) for
//! a chat bot. For each (user, conversation) pair it tracks which step of
//! a flow the party is in, accumulates step inputs into a session record,
//! enforces that only legal state transitions occur, and persists it all
//! in a TTL-based key-value backend with a transparent in-process
//! fallback for outages.
//!
//! ## Features
//!
//! - **Closed state taxonomy**: flows and transitions fixed at build time
//! - **Durable sessions**: Redis-backed with TTL expiry, surviving restarts
//! - **Transparent fallback**: backend outages degrade, never crash
//! - **Explicit wiring**: store, middleware, and router are plain instances
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use chat_flow::{
//!     FlowState, RecordPatch, SessionContext, SessionKey, SessionStore, StoreConfig,
//!     TradingStep,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     // Initialize logging
//!     chat_flow::logging::try_init().ok();
//!
//!     // Create the session store (connects lazily on first use)
//!     let store = Arc::new(SessionStore::new(StoreConfig::default()));
//!
//!     // Bind a context for one dispatch
//!     let key = SessionKey::new(111, 1000);
//!     let mut ctx = SessionContext::new(Arc::clone(&store), key);
//!
//!     // Start the trade wizard and record its first input
//!     ctx.set_state(FlowState::Trading(TradingStep::WaitingForToken)).await;
//!     ctx.update_data(RecordPatch::new().token_address("So1111...")).await;
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod flow;
pub mod logging;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use dispatch::{
    DispatchOutcome, FlowHandler, FlowRouter, FlowRouterBuilder, HandlerError, HasConversation,
    HasUser, RequestBag, SessionMiddleware, SESSION_CONTEXT_KEY,
};
pub use error::{ChatFlowError, Result};
pub use flow::{is_valid_transition, AlertStep, FlowState, TradingStep};
pub use session::{
    HealthStatus, RecordPatch, SessionContext, SessionKey, SessionRecord, SessionStore,
    StoreConfig, StoreStats,
};
