//! Core domain logic
//!
//! Jobs, the store they live in, and the drain/exit coordination that
//! watches them.

// Job model, store and background processor
pub mod jobs;

// Drain-and-exit coordination
pub mod shutdown;

// Tracing setup
pub mod logging;

pub use jobs::{JobId, JobProcessor, JobState, JobStore, Secret};
pub use shutdown::{ShutdownCoordinator, ShutdownPhase};
