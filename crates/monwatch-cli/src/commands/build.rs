use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use monwatch_core::error::MonwatchError;
use monwatch_core::job::{JobEvent, JobManager};
use tracing::debug;

use crate::summary::print_build_summary;

#[derive(Args)]
pub struct BuildArgs {
    /// Source directory, or a single TIFF whose directory is processed
    pub input: Option<PathBuf>,

    /// Cache directory for the pyramid artifacts
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &BuildArgs) -> Result<()> {
    let mut config = super::load_config(args.config.as_deref())?;
    if let Some(ref cache) = args.cache {
        config.paths.cache_dir = cache.clone();
    }
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.paths.input_dir.clone());

    let (mut manager, events) = JobManager::from_config(&config);
    let job = manager
        .start_job(&input)
        .with_context(|| format!("Failed to start cache job for {}", input.display()))?;
    debug!("Started job {job}");

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")?
            .tick_chars("|/-\\ "),
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    let outcome = loop {
        let Ok(event) = events.recv() else {
            break None;
        };
        match event {
            JobEvent::Activity { message, .. } => pb.set_message(message),
            JobEvent::Progress { line, .. } => pb.println(line),
            terminal => break Some(terminal),
        }
    };
    pb.finish_and_clear();

    match outcome {
        Some(JobEvent::Completed { source, report, .. }) => {
            print_build_summary(&source, manager.cache_dir(), &report);
            Ok(())
        }
        Some(JobEvent::Failed { reason, .. }) => bail!("Cache build failed: {reason}"),
        Some(JobEvent::Cancelled { .. }) => Err(MonwatchError::JobCancelled.into()),
        _ => bail!("Cache job ended without a result"),
    }
}
