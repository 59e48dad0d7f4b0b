use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use super::job::{JobId, JobState};

/// In-memory job store shared by submissions, processors and readers.
///
/// Every operation takes the lock for a short, non-async critical section.
/// Writes are single map inserts, so a poisoned lock still guards a
/// consistent map and is recovered instead of propagated.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, JobState>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<JobId, JobState>> {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<JobId, JobState>> {
        self.jobs.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or overwrite the job at `id`
    pub fn put(&self, id: JobId, state: JobState) {
        self.write().insert(id, state);
    }

    pub fn get(&self, id: &JobId) -> Option<JobState> {
        self.read().get(id).cloned()
    }

    /// Copy of every job, taken under a single read lock
    pub fn snapshot(&self) -> Vec<JobState> {
        self.read().values().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    pub fn has_pending(&self) -> bool {
        self.read().values().any(JobState::is_pending)
    }

    /// Allocate the next identifier and register it as pending.
    ///
    /// The id is `count() + 1`, computed and inserted under one write lock so
    /// concurrent submitters never share an id. `admit` is evaluated inside the
    /// same critical section; when it returns false nothing is inserted.
    pub fn allocate_pending<F>(&self, admit: F) -> Option<JobId>
    where
        F: FnOnce() -> bool,
    {
        let mut jobs = self.write();
        if !admit() {
            return None;
        }

        let id = JobId::from_sequence(jobs.len() + 1);
        jobs.insert(id.clone(), JobState::Pending);
        debug!(job_id = %id, "Registered pending job");
        Some(id)
    }

    /// Record a terminal state for `id` unless the job already settled.
    ///
    /// Returns false when the job was missing or already terminal.
    pub fn settle(&self, id: &JobId, state: JobState) -> bool {
        let mut jobs = self.write();
        match jobs.get_mut(id) {
            Some(current) if current.is_pending() => {
                *current = state;
                true
            }
            _ => false,
        }
    }
}
