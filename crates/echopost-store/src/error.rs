//! Error types for store operations.

use thiserror::Error;

/// Errors that can occur when talking to the post store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request.
    #[error("store error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Post not found.
    #[error("post not found: {0}")]
    NotFound(String),

    /// The store returned a payload we could not interpret.
    #[error("unexpected store response: {0}")]
    UnexpectedResponse(String),
}
