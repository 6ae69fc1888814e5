// src/core/types.rs — Core domain types

use chrono::{DateTime, Local, Timelike};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::workspace::{ContinuationSignal, InputSnapshot};

/// How a session ended without a fatal error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// The executor left neither `history` nor `backtrackFlag` behind.
    ExplorationExhausted,
    /// Every iteration in the budget ran and the signal never went false.
    BudgetExhausted,
}

impl std::fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionOutcome::ExplorationExhausted => write!(f, "exploration_exhausted"),
            SessionOutcome::BudgetExhausted => write!(f, "budget_exhausted"),
        }
    }
}

/// What the executor process reported when it finished.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutorExit {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

/// Bookkeeping for a single iteration.
#[derive(Debug)]
pub struct IterationRecord {
    pub iteration: u32,
    pub started_at: DateTime<Local>,
    pub inputs: InputSnapshot,
    pub history: crate::workspace::CopyOutcome,
    pub exit: ExecutorExit,
    pub duration: Duration,
    pub signal: ContinuationSignal,
}

/// Result of `IterationController::run`.
#[derive(Debug)]
pub struct RunReport {
    pub session_id: String,
    pub outcome: SessionOutcome,
    pub iterations: Vec<IterationRecord>,
}

impl RunReport {
    /// Number of times the executor was invoked.
    pub fn invocations(&self) -> usize {
        self.iterations.len()
    }

    /// Count of `inputs<N>` snapshots written during the session.
    pub fn inputs_archived(&self) -> usize {
        self.iterations
            .iter()
            .filter(|r| r.inputs.numbered.is_copied())
            .count()
    }
}

/// Wall-clock stamp printed with every progress record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub micros: u32,
}

impl Stamp {
    pub fn from_datetime<Tz: chrono::TimeZone>(dt: &DateTime<Tz>) -> Self {
        use chrono::Datelike;
        Self {
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
            micros: dt.nanosecond() % 1_000_000_000 / 1_000,
        }
    }
}

impl std::fmt::Display for Stamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {}, {}, {})",
            self.day, self.hour, self.minute, self.second, self.micros
        )
    }
}

/// Lifecycle events emitted by the controller.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    SessionStart {
        session_id: String,
        command: String,
        iteration_budget: u32,
    },
    IterationStart {
        iteration: u32,
        iteration_budget: u32,
        stamp: Stamp,
    },
    IterationEnd {
        iteration: u32,
        exit_code: Option<i32>,
        duration: Duration,
        signal: ContinuationSignal,
    },
    Complete {
        outcome: SessionOutcome,
        invocations: u32,
    },
    /// A fatal error ended the session during `iteration`.
    Aborted {
        iteration: u32,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_stamp_fields() {
        let dt = chrono::Utc
            .with_ymd_and_hms(2026, 3, 9, 14, 5, 7)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let stamp = Stamp::from_datetime(&dt);
        assert_eq!(stamp.to_string(), "(9, 14, 5, 7, 123456)");
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(
            SessionOutcome::ExplorationExhausted.to_string(),
            "exploration_exhausted"
        );
        assert_eq!(SessionOutcome::BudgetExhausted.to_string(), "budget_exhausted");
    }

    #[test]
    fn test_outcome_serde_matches_display() {
        let json = serde_json::to_string(&SessionOutcome::BudgetExhausted).unwrap();
        assert_eq!(json, "\"budget_exhausted\"");
    }
}
