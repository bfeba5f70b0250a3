//! Listing moderation and lead pipeline workflows for a property marketplace.
//!
//! Persistence, sessions and object storage belong to an external platform; this crate owns the
//! transitions between states and the checks that guard them.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
