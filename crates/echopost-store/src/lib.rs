//! Store contract for EchoPost's scheduled-post publisher.
//!
//! This crate defines the data model for scheduled posts and platform
//! credentials, the [`PostStore`] trait the scheduler engine consumes, and
//! [`SupabaseStore`], a PostgREST-backed implementation that authenticates
//! with a service-role key so the background scheduler never depends on an
//! interactive user session.

mod error;
mod store;
mod supabase;
mod types;

pub use error::StoreError;
pub use store::{PostStore, StatusChange};
pub use supabase::SupabaseStore;
pub use types::{Credential, HistoricalPost, NewScheduledPost, PostStatus, ScheduledPost};
