use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha512};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::job::{JobId, JobState, Secret};
use super::store::JobStore;
use crate::core::shutdown::ShutdownCoordinator;

/// Fixed delay before a submitted secret is hashed
pub const HASH_DELAY: Duration = Duration::from_secs(5);

/// Base64 (standard alphabet, padded) of the SHA-512 of `secret`
pub fn compute_digest(secret: &str) -> String {
    let hash = Sha512::digest(secret.as_bytes());
    STANDARD.encode(hash)
}

/// Whole milliseconds since `started`, saturating at `i64::MAX`
fn millis_since(started: Instant) -> i64 {
    i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
}

/// Background worker for a single job.
///
/// Owns its id and secret; shares only the store and the coordinator.
pub struct JobProcessor {
    id: JobId,
    secret: Secret,
    store: Arc<JobStore>,
    coordinator: Arc<ShutdownCoordinator>,
}

impl JobProcessor {
    pub fn new(
        id: JobId,
        secret: Secret,
        store: Arc<JobStore>,
        coordinator: Arc<ShutdownCoordinator>,
    ) -> Self {
        Self {
            id,
            secret,
            store,
            coordinator,
        }
    }

    /// Spawn the processor onto the runtime without waiting for it
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        let started = Instant::now();
        let guard = SettleGuard {
            id: self.id.clone(),
            started,
            store: Arc::clone(&self.store),
            coordinator: Arc::clone(&self.coordinator),
            armed: true,
        };

        tokio::time::sleep(HASH_DELAY).await;

        let digest = compute_digest(self.secret.expose());
        let elapsed_ms = millis_since(started);

        guard.complete(JobState::Completed { digest, elapsed_ms });
        info!(job_id = %self.id, elapsed_ms, "Job completed");
    }
}

/// Settles the job when the processor finishes, or marks it failed when the
/// processor is dropped or panics first. Either way the coordinator learns
/// about it, so draining can never wait on a dead job.
struct SettleGuard {
    id: JobId,
    started: Instant,
    store: Arc<JobStore>,
    coordinator: Arc<ShutdownCoordinator>,
    armed: bool,
}

impl SettleGuard {
    fn complete(mut self, state: JobState) {
        self.armed = false;
        self.settle(state);
    }

    fn settle(&self, state: JobState) {
        if !self.store.settle(&self.id, state) {
            debug!(job_id = %self.id, "Job was already settled");
        }
        self.coordinator.job_settled(&self.store);
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        if self.armed {
            warn!(job_id = %self.id, "Job processor stopped before completing");
            self.settle(JobState::Failed {
                reason: "job processor stopped before completing".to_string(),
                elapsed_ms: millis_since(self.started),
            });
        }
    }
}
