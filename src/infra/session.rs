// src/infra/session.rs — Session identity and working-directory ownership

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::infra::errors::DriverError;
use crate::infra::paths;

pub const DEFAULT_ITERATION_BUDGET: u32 = 100;

/// One end-to-end exploration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// Fully qualified main class handed to the executor.
    pub entry_point: String,
    pub classpath: String,
    pub iteration_budget: u32,
    pub work_dir: PathBuf,
    pub created_at: DateTime<Local>,
}

impl Session {
    pub fn new(
        entry_point: impl Into<String>,
        classpath: impl Into<String>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entry_point: entry_point.into(),
            classpath: classpath.into(),
            iteration_budget: DEFAULT_ITERATION_BUDGET,
            work_dir: work_dir.into(),
            created_at: Local::now(),
        }
    }

    /// Budgets below 1 are raised to 1.
    pub fn with_iteration_budget(mut self, budget: u32) -> Self {
        self.iteration_budget = budget.max(1);
        self
    }
}

/// Exclusive claim on a working directory, released on drop.
///
/// The lock lives next to the directory (`<dir>.lock`) so that resetting the
/// directory does not remove it.
#[derive(Debug)]
pub struct WorkspaceLock {
    path: PathBuf,
}

impl WorkspaceLock {
    pub fn acquire(work_dir: &Path) -> Result<Self, DriverError> {
        let path = paths::lock_path_for(work_dir);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| DriverError::WorkspaceCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        match Self::create(&path) {
            Ok(lock) => Ok(lock),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if let Some(pid) = read_owner(&path) {
                    if is_process_alive(pid) {
                        return Err(DriverError::WorkspaceLocked {
                            path: work_dir.to_path_buf(),
                            pid,
                        });
                    }
                }
                tracing::warn!("Taking over stale lock {}", path.display());
                let _ = std::fs::remove_file(&path);
                Ok(Self::create(&path)?)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn create(path: &Path) -> std::io::Result<Self> {
        let mut f = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        write!(f, "{}", std::process::id())?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkspaceLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn read_owner(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

fn is_process_alive(pid: u32) -> bool {
    if pid == std::process::id() {
        return true;
    }
    #[cfg(unix)]
    {
        std::process::Command::new("kill")
            .args(["-0", &pid.to_string()])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        true
    }
}
