use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::MonwatchConfig;
use crate::error::Result;

use super::task::CacheJob;
use super::types::{JobEvent, JobId, JobStatus};

/// Owns the single active cache job.
///
/// All jobs share one event channel; the receiver is handed out by [`JobManager::new`].
pub struct JobManager {
    cache_dir: PathBuf,
    cancel_wait: Duration,
    next_id: u64,
    current: Option<CacheJob>,
    events: mpsc::Sender<JobEvent>,
}

impl JobManager {
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        cancel_wait: Duration,
    ) -> (Self, mpsc::Receiver<JobEvent>) {
        let (tx, rx) = mpsc::channel();
        let manager = Self {
            cache_dir: cache_dir.into(),
            cancel_wait,
            next_id: 1,
            current: None,
            events: tx,
        };
        (manager, rx)
    }

    pub fn from_config(config: &MonwatchConfig) -> (Self, mpsc::Receiver<JobEvent>) {
        Self::new(&config.paths.cache_dir, config.job.cancel_wait())
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cancel any current job, then start a build for the directory holding `source`.
    pub fn start_job(&mut self, source: &Path) -> Result<JobId> {
        self.cancel_current();

        let id = JobId(self.next_id);
        self.next_id += 1;
        let mut job = CacheJob::new(id, source, &self.cache_dir, self.events.clone());
        job.start()?;
        info!("Started cache job {id} for {}", job.input_dir().display());
        self.current = Some(job);
        Ok(id)
    }

    /// Cancel the current job and wait (bounded) for its worker to stop.
    ///
    /// Returns `true` if a job was still pending or running. A worker that
    /// outlives the wait is detached; it can no longer send events.
    pub fn cancel_current(&mut self) -> bool {
        let Some(mut job) = self.current.take() else {
            return false;
        };
        let cancelled = job.cancel();
        if job.wait(self.cancel_wait) {
            job.join();
        } else {
            warn!(
                "Cache job {} did not stop within {:?}",
                job.id(),
                self.cancel_wait
            );
        }
        cancelled
    }

    pub fn current_id(&self) -> Option<JobId> {
        self.current.as_ref().map(CacheJob::id)
    }

    pub fn current_status(&self) -> Option<JobStatus> {
        self.current.as_ref().map(CacheJob::status)
    }

    /// Wait for the current job to terminate and return its final status.
    pub fn wait_current(&self, timeout: Duration) -> Option<JobStatus> {
        let job = self.current.as_ref()?;
        job.wait(timeout);
        Some(job.status())
    }

    pub fn shutdown(&mut self) {
        self.cancel_current();
    }
}

impl Drop for JobManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
