//! The store contract consumed by the scheduler engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Credential, HistoricalPost, NewScheduledPost, ScheduledPost, StoreError};

/// A status transition requested by the engine or the scheduling API.
#[derive(Debug, Clone)]
pub enum StatusChange {
    /// The post went out. Applies only while the post is still pending.
    Published {
        published_at: DateTime<Utc>,
        linkedin_post_id: Option<String>,
    },
    /// A publish attempt failed. Applies only while the post is still
    /// pending; increments the retry counter and records the message.
    Failed { error_message: String },
    /// The user cancelled the post. Terminal.
    Cancelled,
    /// Move a post (typically failed) back to pending at a new instant.
    /// The retry counter survives unless `reset_retries` is set.
    Rescheduled {
        scheduled_time: DateTime<Utc>,
        timezone: Option<String>,
        reset_retries: bool,
    },
}

/// CRUD contract over the scheduled-post tables.
///
/// The engine is generic over this trait; production uses
/// [`SupabaseStore`](crate::SupabaseStore), tests use in-memory fakes.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a new post in pending status. The store assigns the id.
    async fn create_post(&self, post: NewScheduledPost) -> Result<ScheduledPost, StoreError>;

    /// All pending posts whose scheduled time is at or before `now`.
    async fn list_due_posts(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledPost>, StoreError>;

    /// Apply a status transition.
    ///
    /// Returns `true` if a row was updated. `Published` and `Failed`
    /// changes are conditional on the post still being pending, so a
    /// cancellation that raced an in-flight publish attempt wins: the
    /// attempt's write simply misses and reports `false`.
    async fn update_status(&self, id: &str, change: StatusChange) -> Result<bool, StoreError>;

    /// Look up a user's credential for a platform, if one is on file.
    async fn get_credential(
        &self,
        user_id: &str,
        provider: &str,
    ) -> Result<Option<Credential>, StoreError>;

    /// Count of posts currently pending, for cycle logging.
    async fn count_pending(&self) -> Result<u64, StoreError>;

    /// Failed posts for cycle logging, newest first. Recency is
    /// approximated by `scheduled_time`; the model carries no
    /// `updated_at` column.
    async fn recent_failures(&self, limit: u32) -> Result<Vec<ScheduledPost>, StoreError>;

    /// Published-post history for one user, newest first, for the
    /// best-time advisor.
    async fn list_historical_posts(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<HistoricalPost>, StoreError>;
}
