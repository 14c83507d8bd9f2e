//! Background cache builds.
//!
//! A [`CacheJob`] runs one pyramid build on its own thread and reports over a
//! channel. [`JobManager`] keeps at most one job alive: starting a new job
//! cancels the previous one and waits (bounded) for it to stop.

mod manager;
mod task;
mod types;

pub use manager::JobManager;
pub use task::CacheJob;
pub use types::{JobEvent, JobId, JobStatus};
