use serde::Serialize;
use std::fmt;

/// Elapsed value reported for a job that has not finished yet
pub const PENDING_ELAPSED_MS: i64 = -1;

/// Identifier handed back to the submitter.
///
/// Identifiers are decimal counters starting at `"1"`, assigned in
/// submission order by [`super::JobStore::allocate_pending`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn from_sequence(sequence: usize) -> Self {
        Self(sequence.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Secret submitted for hashing. Never printed.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(**redacted**)")
    }
}

/// State of a single job.
///
/// A job starts `Pending` and moves exactly once into one of the terminal
/// states. Terminal states are never overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Completed { digest: String, elapsed_ms: i64 },
    Failed { reason: String, elapsed_ms: i64 },
}

impl JobState {
    pub fn is_pending(&self) -> bool {
        matches!(self, JobState::Pending)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, JobState::Completed { .. })
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    pub fn digest(&self) -> Option<&str> {
        match self {
            JobState::Completed { digest, .. } => Some(digest),
            _ => None,
        }
    }

    /// Milliseconds spent on the job, or [`PENDING_ELAPSED_MS`] while pending
    pub fn elapsed_ms(&self) -> i64 {
        match self {
            JobState::Pending => PENDING_ELAPSED_MS,
            JobState::Completed { elapsed_ms, .. } | JobState::Failed { elapsed_ms, .. } => {
                *elapsed_ms
            }
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Completed { .. } => "completed",
            JobState::Failed { .. } => "failed",
        }
    }
}
