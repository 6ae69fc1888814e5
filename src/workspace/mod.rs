// src/workspace/mod.rs — Scratch working directory shared with the executor
//
// Every operation takes the directory explicitly; nothing here depends on
// the process-wide current directory. Artifact I/O never fails the session:
// a missing file is an ordinary branch point, an I/O error is logged and
// reported through the returned outcome.

pub mod artifacts;

use serde::Serialize;
use std::path::{Path, PathBuf};

pub use artifacts::{CopyOutcome, MarkerRead, RealInput};

use crate::infra::errors::DriverError;

/// Delete `path` recursively if present, then recreate it empty.
///
/// Removal errors are ignored; only a failed creation is reported.
pub fn reset(path: &Path) -> Result<(), DriverError> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => tracing::debug!("Removed previous workspace {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::debug!("Could not remove {}: {}", path.display(), e),
    }
    std::fs::create_dir_all(path).map_err(|source| DriverError::WorkspaceCreate {
        path: path.to_path_buf(),
        source,
    })
}

/// What `snapshot_inputs` did on one iteration.
#[derive(Debug)]
pub struct InputSnapshot {
    pub marker: MarkerRead,
    /// `inputs` → `inputs<N>`; `Skipped` when the marker says synthetic.
    pub numbered: CopyOutcome,
    /// `inputs` → `inputs.old`, every iteration.
    pub previous: CopyOutcome,
}

/// Artifacts the executor left behind that ask for another iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContinuationSignal {
    pub history: bool,
    pub backtrack: bool,
}

impl ContinuationSignal {
    pub fn should_continue(&self) -> bool {
        self.history || self.backtrack
    }
}

/// Handle on the working directory of one session.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn artifact(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn reset(&self) -> Result<(), DriverError> {
        reset(&self.root)
    }

    /// Read `isRealInput`. Absent and unreadable markers are distinguished
    /// here but both resolve to `RealInput::Real`.
    pub fn read_marker(&self) -> MarkerRead {
        let path = self.artifact(artifacts::REAL_INPUT_MARKER);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                tracing::debug!("isRealInput = {:?}", content.trim_end());
                MarkerRead::Present(RealInput::parse(&content))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => MarkerRead::Absent,
            Err(e) => {
                tracing::warn!("Unreadable {}: {}", path.display(), e);
                MarkerRead::Unreadable(e)
            }
        }
    }

    /// Archive the input vector before iteration `iteration` runs.
    pub fn snapshot_inputs(&self, iteration: u32) -> InputSnapshot {
        let marker = self.read_marker();
        let source = self.artifact(artifacts::INPUTS);

        let numbered = if marker.value().is_real() {
            copy_artifact(
                &source,
                &self.artifact(&artifacts::inputs_snapshot(iteration)),
            )
        } else {
            CopyOutcome::Skipped
        };
        let previous = copy_artifact(&source, &self.artifact(artifacts::INPUTS_OLD));

        InputSnapshot {
            marker,
            numbered,
            previous,
        }
    }

    /// Archive the path history as `history.old`.
    pub fn snapshot_history(&self) -> CopyOutcome {
        copy_artifact(
            &self.artifact(artifacts::HISTORY),
            &self.artifact(artifacts::HISTORY_OLD),
        )
    }

    pub fn continuation_signal(&self) -> ContinuationSignal {
        ContinuationSignal {
            history: self.artifact(artifacts::HISTORY).is_file(),
            backtrack: self.artifact(artifacts::BACKTRACK_FLAG).is_file(),
        }
    }
}

/// Best-effort copy that classifies instead of failing.
fn copy_artifact(src: &Path, dst: &Path) -> CopyOutcome {
    match std::fs::copy(src, dst) {
        Ok(bytes) => CopyOutcome::Copied { bytes },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !src.exists() => {
            tracing::debug!("{} not present, skipping copy", src.display());
            CopyOutcome::Absent
        }
        Err(e) => {
            tracing::warn!(
                "Copy {} -> {} failed: {}",
                src.display(),
                dst.display(),
                e
            );
            CopyOutcome::Failed(e)
        }
    }
}
