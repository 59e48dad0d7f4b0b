use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::jobs::{JobId, JobProcessor, JobState, JobStore, Secret};
use crate::core::shutdown::{ShutdownCoordinator, ShutdownPhase};
use crate::error::{AppError, Result};

/// Outcome of looking up a known job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobLookup {
    Pending,
    Completed(String),
    Failed(String),
}

/// Aggregate over completed jobs; `average` is in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobStats {
    pub total: u64,
    pub average: i64,
}

impl JobStats {
    /// Integer average of `elapsed_ms` over completed jobs
    pub fn from_states<'a>(states: impl IntoIterator<Item = &'a JobState>) -> Self {
        let (total, sum) = states
            .into_iter()
            .filter_map(|state| match state {
                JobState::Completed { elapsed_ms, .. } => Some(*elapsed_ms),
                _ => None,
            })
            .fold((0u64, 0i64), |(count, sum), elapsed| (count + 1, sum + elapsed));

        let average = if total == 0 { 0 } else { sum / total as i64 };
        Self { total, average }
    }
}

/// Submission, retrieval and statistics over the shared job store
pub struct HashService {
    store: Arc<JobStore>,
    coordinator: Arc<ShutdownCoordinator>,
}

impl HashService {
    pub fn new(store: Arc<JobStore>, coordinator: Arc<ShutdownCoordinator>) -> Self {
        Self { store, coordinator }
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    pub fn coordinator(&self) -> &Arc<ShutdownCoordinator> {
        &self.coordinator
    }

    pub fn ensure_accepting(&self) -> Result<()> {
        if self.coordinator.is_draining() {
            return Err(AppError::Unavailable);
        }
        Ok(())
    }

    /// Register a pending job and launch its processor; returns immediately
    pub fn submit(&self, secret: Secret) -> Result<JobId> {
        self.ensure_accepting()?;
        if secret.is_empty() {
            return Err(AppError::EmptyInput);
        }

        let coordinator = &self.coordinator;
        let id = self
            .store
            .allocate_pending(|| !coordinator.is_draining())
            .ok_or(AppError::Unavailable)?;

        JobProcessor::new(
            id.clone(),
            secret,
            Arc::clone(&self.store),
            Arc::clone(&self.coordinator),
        )
        .spawn();

        info!(job_id = %id, "Accepted hash job");
        Ok(id)
    }

    pub fn retrieve(&self, id: &JobId) -> Result<JobLookup> {
        self.ensure_accepting()?;

        let state = self
            .store
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("No job with id {}", id)))?;
        debug!(job_id = %id, status = state.status_label(), "Looked up job");

        Ok(match state {
            JobState::Pending => JobLookup::Pending,
            JobState::Completed { digest, .. } => JobLookup::Completed(digest),
            JobState::Failed { reason, .. } => JobLookup::Failed(reason),
        })
    }

    pub fn stats(&self) -> Result<JobStats> {
        self.ensure_accepting()?;
        Ok(JobStats::from_states(&self.store.snapshot()))
    }

    pub fn request_shutdown(&self) -> ShutdownPhase {
        self.coordinator.begin_drain(&self.store)
    }
}
