//! Deferred hashing service
//!
//! Accepts a password, hashes it (SHA-512, base64) after a fixed delay and
//! serves the digest by job id. Also reports timing statistics and supports a
//! drain-and-exit shutdown that lets pending jobs finish.

use std::sync::Arc;

pub mod config;
pub mod core;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use crate::core::{JobStore, ShutdownCoordinator};
use crate::services::HashService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub env: Arc<config::Config>,
    pub hash_service: Arc<HashService>,
}

impl AppState {
    /// Fresh state with an empty store and a running coordinator
    pub fn new(config: config::Config) -> Self {
        let store = Arc::new(JobStore::new());
        let coordinator = Arc::new(ShutdownCoordinator::new());

        Self {
            env: Arc::new(config),
            hash_service: Arc::new(HashService::new(store, coordinator)),
        }
    }
}
