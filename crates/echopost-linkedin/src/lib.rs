//! LinkedIn publish client for EchoPost.
//!
//! Publishing is a two-step exchange: resolve the access token to a member
//! id via the OIDC userinfo endpoint, then submit a UGC share authored by
//! that member. [`PublishClient`] captures the contract so the scheduler
//! engine can be tested against fakes; [`LinkedInClient`] is the real
//! implementation.

mod client;
mod error;

pub use client::{Identity, LinkedInClient, PublishClient, PublishedPost};
pub use error::PublishError;
