//! Health-check state file.

use crate::error::FailoverError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes the current VRRP state for external monitors.
///
/// Each write replaces the whole file. There is no atomic rename, so a crash
/// mid-write can leave a truncated file behind.
#[derive(Debug, Clone)]
pub struct StateRecorder {
    path: PathBuf,
}

impl StateRecorder {
    /// Create a recorder for the health-check file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the health-check file with `state`, creating it if needed.
    pub fn record(&self, state: &str) -> Result<(), FailoverError> {
        std::fs::write(&self.path, state.as_bytes()).map_err(|source| {
            FailoverError::StateWrite {
                path: self.path.clone(),
                source,
            }
        })?;

        info!(state, path = %self.path.display(), "Wrote state to health check path");
        Ok(())
    }
}
