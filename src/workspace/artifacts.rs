// src/workspace/artifacts.rs — Working-directory artifact names and outcomes
//
// The executor and the driver communicate only through these files:
//
//   inputs         executor → driver   current concrete input vector
//   inputs<N>      driver              input vector as of iteration N
//   inputs.old     driver              input vector before the latest run
//   isRealInput    executor → driver   "true" / "false", default true
//   history        executor → driver   cumulative symbolic trace
//   history.old    driver              trace before the latest run
//   backtrackFlag  executor → driver   explicit request to continue

use serde::{Deserialize, Serialize};

pub const INPUTS: &str = "inputs";
pub const INPUTS_OLD: &str = "inputs.old";
pub const REAL_INPUT_MARKER: &str = "isRealInput";
pub const HISTORY: &str = "history";
pub const HISTORY_OLD: &str = "history.old";
pub const BACKTRACK_FLAG: &str = "backtrackFlag";

/// Iteration-numbered snapshot name, e.g. `inputs3`.
pub fn inputs_snapshot(iteration: u32) -> String {
    format!("{INPUTS}{iteration}")
}

/// Parsed contents of `isRealInput`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RealInput {
    /// The current input vector is archived under `inputs<N>`.
    #[default]
    Real,
    /// Marker reads exactly `false`; no numbered snapshot this iteration.
    Synthetic,
}

impl RealInput {
    /// Newlines are dropped before comparing. Only the exact text `false`
    /// yields `Synthetic`.
    pub fn parse(content: &str) -> Self {
        let cleaned: String = content.chars().filter(|c| *c != '\n').collect();
        if cleaned == "false" {
            RealInput::Synthetic
        } else {
            RealInput::Real
        }
    }

    pub fn is_real(self) -> bool {
        self == RealInput::Real
    }
}

/// How the marker was obtained.
#[derive(Debug)]
pub enum MarkerRead {
    Present(RealInput),
    Absent,
    Unreadable(std::io::Error),
}

impl MarkerRead {
    /// The effective value; anything but a present marker means `Real`.
    pub fn value(&self) -> RealInput {
        match self {
            MarkerRead::Present(v) => *v,
            MarkerRead::Absent | MarkerRead::Unreadable(_) => RealInput::default(),
        }
    }
}

/// Result of a best-effort artifact copy.
#[derive(Debug)]
pub enum CopyOutcome {
    Copied { bytes: u64 },
    /// Source artifact does not exist. Expected on early iterations.
    Absent,
    /// Source exists but the copy failed. Logged, never fatal.
    Failed(std::io::Error),
    /// Step did not run this iteration.
    Skipped,
}

impl CopyOutcome {
    pub fn is_copied(&self) -> bool {
        matches!(self, CopyOutcome::Copied { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            CopyOutcome::Copied { .. } => "copied",
            CopyOutcome::Absent => "absent",
            CopyOutcome::Failed(_) => "failed",
            CopyOutcome::Skipped => "skipped",
        }
    }
}
