//! Error types for the scheduler.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors that can occur in scheduler operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] echopost_store::StoreError),

    /// Publish client error.
    #[error("publish error: {0}")]
    Publish(#[from] echopost_linkedin::PublishError),

    /// The timezone identifier is not a known IANA zone.
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    /// The wall-clock time was skipped by a DST spring-forward transition.
    #[error("local time {0} does not exist in {1} (skipped by DST transition)")]
    NonexistentLocalTime(NaiveDateTime, String),

    /// Post not found.
    #[error("post not found: {0}")]
    PostNotFound(String),
}
