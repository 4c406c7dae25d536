//! The polling publish engine.
//!
//! One timer-driven loop is the sole writer of status and retry-count
//! transitions. Per-post errors become status writes and never escape a
//! cycle; a failure on one post never delays the rest. There is no backoff
//! between attempts: a failed post sits in `failed` until a reschedule
//! moves it back to `pending`, which keeps the engine stateless across
//! cycles and failures visible.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use echopost_linkedin::PublishClient;
use echopost_store::{PostStore, ScheduledPost, StatusChange};

/// Default seconds between poll cycles.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Default failed attempts before a post is terminally failed.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Platform key used for credential lookups.
pub const PROVIDER: &str = "linkedin";

/// How many recent failures to surface in cycle logs.
const FAILURE_LOG_LIMIT: u32 = 3;

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between poll cycles.
    pub poll_interval: Duration,
    /// Retry budget per post.
    pub max_retries: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Counters from one poll cycle, for logging and tests. Advisory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Posts pending store-wide at the start of the cycle.
    pub pending: u64,
    /// Posts due this cycle.
    pub due: usize,
    /// Posts published this cycle.
    pub published: usize,
    /// Attempts that ended in a recorded failure this cycle.
    pub failed: usize,
}

enum AttemptOutcome {
    Published,
    Failed,
    /// The status write missed (post cancelled mid-flight) or failed; the
    /// post is left for a later cycle.
    Skipped,
}

/// The scheduler engine: polls for due posts and publishes them.
pub struct SchedulerEngine<S, P> {
    store: Arc<S>,
    publisher: Arc<P>,
    config: SchedulerConfig,
}

impl<S: PostStore, P: PublishClient> SchedulerEngine<S, P> {
    /// Create an engine over a privileged store handle and a publish
    /// client.
    pub fn new(store: Arc<S>, publisher: Arc<P>, config: SchedulerConfig) -> Self {
        Self {
            store,
            publisher,
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run the polling loop until the shutdown flag flips.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            interval_secs = self.config.poll_interval.as_secs(),
            max_retries = self.config.max_retries,
            "scheduler engine starting"
        );

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            let stats = self.run_cycle().await;
            debug!(
                pending = stats.pending,
                due = stats.due,
                published = stats.published,
                failed = stats.failed,
                "poll cycle complete"
            );

            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("scheduler engine received shutdown signal");
                    }
                }
                _ = sleep(self.config.poll_interval) => {}
            }
        }

        info!("scheduler engine shut down");
    }

    /// Run one poll cycle: select due posts and attempt each one
    /// independently.
    pub async fn run_cycle(&self) -> CycleStats {
        let mut stats = CycleStats::default();

        match self.store.count_pending().await {
            Ok(count) => stats.pending = count,
            Err(e) => warn!(error = %e, "failed to count pending posts"),
        }

        let due = match self.store.list_due_posts(Utc::now()).await {
            Ok(due) => due,
            Err(e) => {
                error!(error = %e, "failed to list due posts; skipping cycle");
                return stats;
            }
        };
        stats.due = due.len();
        info!(pending = stats.pending, due = stats.due, "checking scheduled posts");

        for post in &due {
            match self.publish_post(post).await {
                AttemptOutcome::Published => stats.published += 1,
                AttemptOutcome::Failed => stats.failed += 1,
                AttemptOutcome::Skipped => {}
            }
        }

        if let Ok(failures) = self.store.recent_failures(FAILURE_LOG_LIMIT).await {
            for failure in &failures {
                warn!(
                    id = %failure.id,
                    error = failure.error_message.as_deref().unwrap_or("unknown"),
                    "recent publish failure"
                );
            }
        }

        stats
    }

    /// Drive one post through a publish attempt.
    #[tracing::instrument(skip_all, fields(id = %post.id, user = %post.user_id))]
    async fn publish_post(&self, post: &ScheduledPost) -> AttemptOutcome {
        info!(retry_count = post.retry_count, "attempting publish");

        // Retry budget is checked before any network traffic so an
        // exhausted post is never dispatched again.
        if post.retry_count >= self.config.max_retries {
            return self
                .fail_post(
                    post,
                    format!(
                        "exceeded maximum retry attempts ({})",
                        self.config.max_retries
                    ),
                )
                .await;
        }

        let credential = match self.store.get_credential(&post.user_id, PROVIDER).await {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                // No UI session exists to refresh from, so this is
                // terminal for the attempt.
                return self
                    .fail_post(
                        post,
                        "no LinkedIn credential on file; reconnect your LinkedIn account"
                            .to_string(),
                    )
                    .await;
            }
            Err(e) => {
                return self
                    .fail_post(post, format!("credential lookup failed: {e}"))
                    .await;
            }
        };

        let identity = match self.publisher.fetch_identity(&credential.access_token).await {
            Ok(identity) => identity,
            Err(e) => {
                return self
                    .fail_post(post, format!("failed to resolve LinkedIn identity: {e}"))
                    .await;
            }
        };

        let published = match self
            .publisher
            .submit_content(&credential.access_token, &identity.member_id, &post.content)
            .await
        {
            Ok(published) => published,
            Err(e) => {
                return self
                    .fail_post(post, format!("LinkedIn API error: {e}"))
                    .await;
            }
        };

        let change = StatusChange::Published {
            published_at: Utc::now(),
            linkedin_post_id: published.post_id.clone(),
        };
        match self.store.update_status(&post.id, change).await {
            Ok(true) => {
                info!(linkedin_post_id = ?published.post_id, "post published");
                AttemptOutcome::Published
            }
            Ok(false) => {
                warn!("post no longer pending; publish result dropped");
                AttemptOutcome::Skipped
            }
            Err(e) => {
                // The post stays pending and is reconsidered next cycle.
                error!(error = %e, "failed to record published status");
                AttemptOutcome::Skipped
            }
        }
    }

    async fn fail_post(&self, post: &ScheduledPost, message: String) -> AttemptOutcome {
        warn!(id = %post.id, error = %message, "publish attempt failed");

        let change = StatusChange::Failed {
            error_message: message,
        };
        match self.store.update_status(&post.id, change).await {
            Ok(true) => AttemptOutcome::Failed,
            Ok(false) => {
                warn!(id = %post.id, "post no longer pending; failure not recorded");
                AttemptOutcome::Skipped
            }
            Err(e) => {
                error!(id = %post.id, error = %e, "failed to record failure status");
                AttemptOutcome::Skipped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_cycle_stats_default_is_zeroed() {
        let stats = CycleStats::default();
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.due, 0);
        assert_eq!(stats.published, 0);
        assert_eq!(stats.failed, 0);
    }
}
