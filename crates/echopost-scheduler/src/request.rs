//! Scheduling requests from the UI layer.
//!
//! Timezone validation happens here, synchronously with the request:
//! an unknown zone or a DST-skipped wall-clock time rejects the request
//! before anything is persisted, so the engine only ever sees valid UTC
//! instants.

use chrono::NaiveDateTime;
use tracing::info;

use echopost_store::{NewScheduledPost, PostStore, ScheduledPost, StatusChange};

use crate::{SchedulerError, timezone};

/// A request to schedule a post, expressed in the user's wall-clock time.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    pub user_id: String,
    pub content: String,
    pub topic: Option<String>,
    pub tags: Vec<String>,
    pub local_time: NaiveDateTime,
    /// IANA zone identifier the local time is expressed in.
    pub timezone: String,
}

/// Convert the request's local time to UTC and persist a pending post.
pub async fn create_scheduled_post<S: PostStore>(
    store: &S,
    request: ScheduleRequest,
) -> Result<ScheduledPost, SchedulerError> {
    let scheduled_time = timezone::to_utc(request.local_time, &request.timezone)?;

    let post = store
        .create_post(NewScheduledPost {
            user_id: request.user_id,
            content: request.content,
            topic: request.topic,
            tags: request.tags,
            scheduled_time,
            timezone: request.timezone,
        })
        .await?;

    info!(
        id = %post.id,
        user = %post.user_id,
        scheduled_time = %post.scheduled_time,
        "scheduled post created"
    );
    Ok(post)
}

/// Cancel a post. Returns whether the cancel took effect (`false` when
/// the post was already terminal or missing).
pub async fn cancel_scheduled_post<S: PostStore>(
    store: &S,
    id: &str,
) -> Result<bool, SchedulerError> {
    let applied = store.update_status(id, StatusChange::Cancelled).await?;
    if applied {
        info!(id, "scheduled post cancelled");
    }
    Ok(applied)
}

/// Move a post (typically failed) back to pending at a new local time.
/// The retry counter is kept unless `reset_retries` is set.
pub async fn reschedule_post<S: PostStore>(
    store: &S,
    id: &str,
    local_time: NaiveDateTime,
    tz_id: &str,
    reset_retries: bool,
) -> Result<bool, SchedulerError> {
    let scheduled_time = timezone::to_utc(local_time, tz_id)?;

    let applied = store
        .update_status(
            id,
            StatusChange::Rescheduled {
                scheduled_time,
                timezone: Some(tz_id.to_string()),
                reset_retries,
            },
        )
        .await?;

    if applied {
        info!(id, scheduled_time = %scheduled_time, "post rescheduled");
    }
    Ok(applied)
}
