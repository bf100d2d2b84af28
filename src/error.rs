//! Error types for chat-flow.

use thiserror::Error;

/// Main error type for chat-flow operations.
///
/// Session store operations deliberately do not appear here: the store
/// degrades to its in-process fallback instead of surfacing backend
/// failures, and invalid transitions are reported as a `false` return.
#[derive(Error, Debug)]
pub enum ChatFlowError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded or applied.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience Result type for chat-flow operations.
pub type Result<T> = std::result::Result<T, ChatFlowError>;
