use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{MonwatchError, Result};
use crate::pyramid::{BuildReport, BuildReporter, PyramidCacheBuilder};

use super::types::{JobEvent, JobId, JobStatus};

struct JobInner {
    status: JobStatus,
    /// The worker has finished (or never started) and will send nothing more.
    terminated: bool,
}

/// State shared between the job handle and its worker thread.
///
/// Status changes and event sends happen under the same lock, so once the
/// status leaves `Running` no further event from this job reaches the channel.
struct JobShared {
    id: JobId,
    cancelled: AtomicBool,
    inner: Mutex<JobInner>,
    done: Condvar,
    events: mpsc::Sender<JobEvent>,
}

impl JobShared {
    fn lock(&self) -> MutexGuard<'_, JobInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Send `event` only while the job is still running.
    fn emit(&self, event: JobEvent) {
        let inner = self.lock();
        if inner.status == JobStatus::Running {
            let _ = self.events.send(event);
        }
    }

    fn activity(&self, message: impl Into<String>) {
        self.emit(JobEvent::Activity {
            job: self.id,
            message: message.into(),
        });
    }

    fn finish(&self, source: &Path, result: Result<BuildReport>) {
        let mut inner = self.lock();
        if inner.status == JobStatus::Running {
            let job = self.id;
            inner.status = match result {
                Ok(report) if report.cancelled => {
                    let _ = self.events.send(JobEvent::Cancelled { job });
                    JobStatus::Cancelled
                }
                Ok(report) => {
                    info!(
                        "Job {job} complete: {} succeeded, {} failed",
                        report.succeeded.len(),
                        report.failures.len()
                    );
                    let _ = self.events.send(JobEvent::Activity {
                        job,
                        message: "Cache complete".into(),
                    });
                    let _ = self.events.send(JobEvent::Completed {
                        job,
                        source: source.to_path_buf(),
                        report,
                    });
                    JobStatus::Completed
                }
                Err(e) => {
                    let reason = e.to_string();
                    warn!("Job {job} failed: {reason}");
                    let _ = self.events.send(JobEvent::Activity {
                        job,
                        message: format!("Cache failed: {reason}"),
                    });
                    let _ = self.events.send(JobEvent::Failed {
                        job,
                        reason: reason.clone(),
                    });
                    JobStatus::Failed(reason)
                }
            };
        } else {
            debug!("Job {} finished after leaving running state", self.id);
        }
        inner.terminated = true;
        self.done.notify_all();
    }
}

/// Forwards build log lines as progress events and exposes the cancellation flag.
struct JobReporter<'a> {
    shared: &'a JobShared,
}

impl BuildReporter for JobReporter<'_> {
    fn begin_source(&self, path: &Path, index: usize, total: usize) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.shared
            .activity(format!("Processing file {}/{total}: {name}", index + 1));
    }

    fn line(&self, line: &str) {
        self.shared.emit(JobEvent::Progress {
            job: self.shared.id,
            line: line.to_string(),
        });
    }

    fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::Acquire)
    }
}

/// One cancellable pyramid build for the directory containing `source`.
pub struct CacheJob {
    source: PathBuf,
    input_dir: PathBuf,
    cache_dir: PathBuf,
    shared: Arc<JobShared>,
    handle: Option<JoinHandle<()>>,
}

impl CacheJob {
    /// Create a pending job. Nothing runs until [`CacheJob::start`].
    pub fn new(
        id: JobId,
        source: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
        events: mpsc::Sender<JobEvent>,
    ) -> Self {
        let source = source.into();
        let input_dir = if source.is_dir() {
            source.clone()
        } else {
            source
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        };
        Self {
            source,
            input_dir,
            cache_dir: cache_dir.into(),
            shared: Arc::new(JobShared {
                id,
                cancelled: AtomicBool::new(false),
                inner: Mutex::new(JobInner {
                    status: JobStatus::Pending,
                    terminated: false,
                }),
                done: Condvar::new(),
                events,
            }),
            handle: None,
        }
    }

    pub fn id(&self) -> JobId {
        self.shared.id
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn status(&self) -> JobStatus {
        self.shared.lock().status.clone()
    }

    /// Pending -> Running, spawning the build on a dedicated thread.
    pub fn start(&mut self) -> Result<()> {
        {
            let mut inner = self.shared.lock();
            if inner.status != JobStatus::Pending {
                return Err(MonwatchError::InvalidTransition {
                    job: self.shared.id.0,
                    from: inner.status.name(),
                    to: JobStatus::Running.name(),
                });
            }
            inner.status = JobStatus::Running;
        }

        let shared = Arc::clone(&self.shared);
        let source = self.source.clone();
        let input_dir = self.input_dir.clone();
        let cache_dir = self.cache_dir.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("monwatch-cache-{}", self.shared.id.0))
            .spawn(move || run(&shared, &source, &input_dir, &cache_dir));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                let mut inner = self.shared.lock();
                inner.status = JobStatus::Failed(e.to_string());
                inner.terminated = true;
                self.shared.done.notify_all();
                Err(e.into())
            }
        }
    }

    /// Request cancellation. Returns `true` if the job moved to `Cancelled`.
    ///
    /// The `Cancelled` event is the last event this job sends. A running
    /// worker notices the flag before its next source file.
    pub fn cancel(&self) -> bool {
        let mut inner = self.shared.lock();
        self.shared.cancelled.store(true, Ordering::Release);
        let was_pending = match inner.status {
            JobStatus::Pending => true,
            JobStatus::Running => false,
            _ => return false,
        };
        inner.status = JobStatus::Cancelled;
        let _ = self.shared.events.send(JobEvent::Cancelled {
            job: self.shared.id,
        });
        if was_pending {
            inner.terminated = true;
            self.shared.done.notify_all();
        }
        true
    }

    /// Block until the worker has terminated or `timeout` elapses.
    /// Returns `true` if it terminated.
    pub fn wait(&self, timeout: Duration) -> bool {
        let inner = self.shared.lock();
        let (inner, _) = self
            .shared
            .done
            .wait_timeout_while(inner, timeout, |i| !i.terminated)
            .unwrap_or_else(PoisonError::into_inner);
        inner.terminated
    }

    /// Join the worker thread if it has terminated.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Cache job {} worker panicked", self.shared.id);
            }
        }
    }
}

fn run(shared: &JobShared, source: &Path, input_dir: &Path, cache_dir: &Path) {
    shared.activity(format!("Starting cache: {}", input_dir.display()));
    let reporter = JobReporter { shared };
    let result = PyramidCacheBuilder::new(input_dir, cache_dir)
        .and_then(|builder| builder.build_reported(&reporter));
    shared.finish(source, result);
}
