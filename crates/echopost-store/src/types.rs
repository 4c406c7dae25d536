//! Store types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-authored post waiting to be published at a future instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledPost {
    /// Opaque identifier assigned by the store on creation.
    pub id: String,
    /// Owner of the post.
    pub user_id: String,
    /// Text to publish. Length limits are the platform's concern, not ours.
    pub content: String,
    /// Freeform label, display only.
    #[serde(default)]
    pub topic: Option<String>,
    /// Freeform tags, display only.
    #[serde(default)]
    pub tags: Vec<String>,
    /// When to publish, always stored in UTC.
    pub scheduled_time: DateTime<Utc>,
    /// IANA zone the user picked at creation. Used only to render
    /// `scheduled_time` back to local time, never consulted when deciding
    /// whether a post is due.
    pub timezone: String,
    /// Current position in the publish state machine.
    pub status: PostStatus,
    /// Failed publish attempts so far.
    #[serde(default)]
    pub retry_count: u32,
    /// Detail of the last failure, set only while failed.
    #[serde(default)]
    pub error_message: Option<String>,
    /// When the post actually went out, set only on success.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Share URN assigned by LinkedIn, set only on success.
    #[serde(default)]
    pub linkedin_post_id: Option<String>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

/// Status of a scheduled post.
///
/// Transitions: `Pending -> Published` (success), `Pending -> Failed`
/// (publish error or exhausted retries), `Pending -> Cancelled` (user
/// action), `Failed -> Pending` (reschedule). `Published` and `Cancelled`
/// are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Waiting for its scheduled time.
    #[default]
    Pending,
    /// Successfully published; terminal.
    Published,
    /// Last publish attempt failed; sits here until rescheduled.
    Failed,
    /// Cancelled by the user; terminal.
    Cancelled,
}

impl PostStatus {
    /// Whether no further automatic transition may occur from this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PostStatus::Published | PostStatus::Cancelled)
    }
}

/// Fields for inserting a new scheduled post. The store assigns the id and
/// forces the status to pending.
#[derive(Debug, Clone, Serialize)]
pub struct NewScheduledPost {
    pub user_id: String,
    pub content: String,
    pub topic: Option<String>,
    pub tags: Vec<String>,
    pub scheduled_time: DateTime<Utc>,
    pub timezone: String,
}

/// A long-lived platform credential for one user.
///
/// Written by the OAuth callback, read-only from the scheduler's side. A
/// missing credential is a terminal per-post failure: there is no UI
/// session behind the background loop to refresh it from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub user_id: String,
    /// Platform name, e.g. "linkedin".
    pub provider: String,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A previously published post, reduced to what the best-time advisor
/// needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalPost {
    pub created_at: DateTime<Utc>,
    /// Word count stands in for engagement; no analytics integration
    /// exists yet.
    #[serde(default)]
    pub word_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(PostStatus::Published.is_terminal());
        assert!(PostStatus::Cancelled.is_terminal());
        assert!(!PostStatus::Pending.is_terminal());
        assert!(!PostStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PostStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&PostStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }

    #[test]
    fn test_post_roundtrip_with_optional_fields_absent() {
        let json = serde_json::json!({
            "id": "post-1",
            "user_id": "user-1",
            "content": "hello",
            "scheduled_time": "2026-01-05T12:00:00Z",
            "timezone": "America/Sao_Paulo",
            "status": "pending",
            "created_at": "2026-01-01T00:00:00Z"
        });

        let post: ScheduledPost = serde_json::from_value(json).unwrap();
        assert_eq!(post.status, PostStatus::Pending);
        assert_eq!(post.retry_count, 0);
        assert!(post.error_message.is_none());
        assert!(post.published_at.is_none());
        assert!(post.tags.is_empty());
    }
}
