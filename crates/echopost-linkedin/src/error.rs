//! Error types for the publish client.

use thiserror::Error;

/// Errors that can occur when publishing to LinkedIn.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The token was rejected (expired, revoked, missing scope).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// LinkedIn rate-limited the request.
    #[error("rate limited")]
    RateLimited,

    /// Any other non-2xx response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport failure, including request timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was missing something we need.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}
