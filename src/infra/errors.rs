// src/infra/errors.rs — Error types for the concolic driver

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that abort a session.
///
/// Missing or unreadable artifacts are never represented here; those are
/// reported through `workspace::CopyOutcome` and `workspace::MarkerRead`.
#[derive(Error, Debug)]
pub enum DriverError {
    // Workspace
    #[error("Failed to create working directory {}: {source}", .path.display())]
    WorkspaceCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Working directory {} is owned by another session (pid {pid})", .path.display())]
    WorkspaceLocked { path: PathBuf, pid: u32 },

    // Executor
    #[error("Failed to launch executor '{program}': {source}")]
    ExecutorLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Executor hung: no exit after {timeout:?}")]
    ExecutorHung { timeout: Duration },

    #[error("Session cancelled")]
    Cancelled,

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriverError {
    /// True when the failure came from the external executor rather than the
    /// driver's own bookkeeping.
    pub fn is_executor_failure(&self) -> bool {
        matches!(
            self,
            DriverError::ExecutorLaunch { .. } | DriverError::ExecutorHung { .. }
        )
    }
}
