use std::path::PathBuf;

use crate::pyramid::BuildReport;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a cache job: `Pending -> Running -> {Completed, Cancelled, Failed}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Cancelled,
    Failed(String),
    Completed,
}

impl JobStatus {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Cancelled => "cancelled",
            Self::Failed(_) => "failed",
            Self::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Failed(_) | Self::Completed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Notifications sent from a job's worker thread.
///
/// Exactly one of `Completed`, `Failed` or `Cancelled` ends each job's stream.
#[derive(Clone, Debug)]
pub enum JobEvent {
    /// Short status text ("Starting cache: ...", "Cache complete").
    Activity { job: JobId, message: String },
    /// One line of the build log.
    Progress { job: JobId, line: String },
    /// The build finished; `source` is the path the job was started for.
    Completed {
        job: JobId,
        source: PathBuf,
        report: BuildReport,
    },
    Failed { job: JobId, reason: String },
    Cancelled { job: JobId },
}

impl JobEvent {
    pub fn job(&self) -> JobId {
        match self {
            Self::Activity { job, .. }
            | Self::Progress { job, .. }
            | Self::Completed { job, .. }
            | Self::Failed { job, .. }
            | Self::Cancelled { job } => *job,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed { .. } | Self::Cancelled { .. }
        )
    }
}
