pub mod build;
pub mod config;
pub mod info;
pub mod levels;
pub mod navigate;
pub mod original;

use std::path::Path;

use anyhow::{Context, Result};
use console::Term;
use monwatch_core::config::MonwatchConfig;
use monwatch_core::original::{PromotionGate, PromotionRequest};

/// Load `path` if given, otherwise the built-in defaults.
pub(crate) fn load_config(path: Option<&Path>) -> Result<MonwatchConfig> {
    match path {
        Some(path) => MonwatchConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(MonwatchConfig::default()),
    }
}

/// Asks on the terminal unless the answer was given on the command line.
pub(crate) struct PromptGate {
    pub assume: Option<bool>,
}

impl PromptGate {
    pub fn from_flags(yes: bool, no: bool) -> Self {
        let assume = match (yes, no) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            _ => None,
        };
        Self { assume }
    }
}

impl PromotionGate for PromptGate {
    fn confirm(&mut self, request: &PromotionRequest) -> bool {
        if let Some(answer) = self.assume {
            return answer;
        }
        let term = Term::stderr();
        let size = request
            .estimated_bytes
            .map(|b| format!(" (~{:.0} MB decoded)", b as f64 / (1024.0 * 1024.0)))
            .unwrap_or_default();
        if term
            .write_line(&format!("{}{size} [y/N]", request.message()))
            .is_err()
        {
            return false;
        }
        term.read_line()
            .map(|answer| matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
            .unwrap_or(false)
    }
}
