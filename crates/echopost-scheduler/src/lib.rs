//! Scheduled-post publisher for EchoPost.
//!
//! This crate provides the background publishing subsystem:
//! - A polling engine that picks up due posts every cycle and drives each
//!   one through the publish state machine
//! - A lifecycle wrapper guaranteeing one polling loop per process
//! - Wall-clock/UTC conversion for IANA timezones
//! - Best-time-to-post heuristics over a user's history
//!
//! The engine assumes a single process with at-least-once semantics. Two
//! processes polling the same store can each publish the same post; there
//! is no leader election.

mod advisor;
mod engine;
mod error;
mod request;
mod scheduler;
pub mod timezone;

pub use advisor::{BestTimeAdvisor, MIN_HISTORY, PostingSlot, default_slots, rank_slots};
pub use engine::{
    CycleStats, DEFAULT_MAX_RETRIES, DEFAULT_POLL_INTERVAL_SECS, PROVIDER, SchedulerConfig,
    SchedulerEngine,
};
pub use error::SchedulerError;
pub use request::{ScheduleRequest, cancel_scheduled_post, create_scheduled_post, reschedule_post};
pub use scheduler::Scheduler;
