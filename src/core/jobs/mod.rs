//! Deferred hashing jobs
//!
//! The store is the only shared mutable state; processors write to it once
//! their delay has passed, services read from it.

pub mod job;
pub mod processor;
pub mod store;

pub use job::{JobId, JobState, Secret, PENDING_ELAPSED_MS};
pub use processor::{compute_digest, JobProcessor, HASH_DELAY};
pub use store::JobStore;
