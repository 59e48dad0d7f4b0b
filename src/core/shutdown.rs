//! Drain-and-exit coordination.
//!
//! Two one-shot signals are owned here: `drain_requested` tells the bootstrap
//! to stop accepting connections, `drained` tells it that no job is pending
//! anymore and the process may halt. Both are cancellation tokens, so firing
//! them more than once is a no-op.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::core::jobs::JobStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownPhase {
    Running,
    Draining,
    Drained,
}

#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    draining: AtomicBool,
    drain_requested: CancellationToken,
    drained: CancellationToken,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> ShutdownPhase {
        if self.drained.is_cancelled() {
            ShutdownPhase::Drained
        } else if self.is_draining() {
            ShutdownPhase::Draining
        } else {
            ShutdownPhase::Running
        }
    }

    /// Flip into draining. Repeated calls only report the current phase.
    ///
    /// The flag is raised before the store is scanned; submissions check it
    /// under the store's write lock, so a job is either visible to the scan
    /// below or rejected.
    pub fn begin_drain(&self, store: &JobStore) -> ShutdownPhase {
        if self.draining.swap(true, Ordering::SeqCst) {
            return self.phase();
        }

        info!(pending_jobs = store.has_pending(), "Shutdown requested, draining");
        self.drain_requested.cancel();
        self.job_settled(store);
        self.phase()
    }

    /// Called whenever a job leaves the pending state
    pub fn job_settled(&self, store: &JobStore) {
        if self.is_draining() && !store.has_pending() && !self.drained.is_cancelled() {
            info!("All pending jobs finished, drained");
            self.drained.cancel();
        }
    }

    /// Resolves once a drain was requested
    pub async fn drain_requested(&self) {
        self.drain_requested.cancelled().await
    }

    /// Resolves once draining is active and no job is pending
    pub async fn drained(&self) {
        self.drained.cancelled().await
    }
}

/// Translate SIGTERM and SIGINT into a drain request, same as `GET /shutdown`.
pub fn install_signal_handler(coordinator: Arc<ShutdownCoordinator>, store: Arc<JobStore>) {
    tokio::spawn(async move {
        let (mut sigterm, mut sigint) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                error!(error = %e, "Failed to install signal handlers");
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
            _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
            _ = coordinator.drain_requested() => return,
        }

        coordinator.begin_drain(&store);
    });
}
