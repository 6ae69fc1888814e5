// src/core/state.rs — Session state file writer for external monitoring
//
// Writes `<state_dir>/current-session.json` at each lifecycle transition and
// appends finished sessions to `<state_dir>/session-history.jsonl`.
// Uses atomic write (temp file + rename) for current-session.json.

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::types::ProgressEvent;

const STATE_FILE: &str = "current-session.json";
const HISTORY_FILE: &str = "session-history.jsonl";
const HISTORY_MAX_LINES: usize = 1000;
const HISTORY_MAX_BYTES: u64 = 1_048_576;
const HISTORY_KEEP_LINES: usize = 500;

/// JSON structure written to `current-session.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    pub entry_point: String,
    pub work_dir: String,
    pub command: String,
    pub status: String,
    pub iteration: u32,
    pub iteration_budget: u32,
    pub last_exit_code: Option<i32>,
    pub history_present: bool,
    pub backtrack_present: bool,
    pub started_at: String,
    pub elapsed_secs: u64,
}

/// JSON structure appended to `session-history.jsonl` (one line per session).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHistoryEntry {
    pub session_id: String,
    pub entry_point: String,
    pub invocations: u32,
    pub outcome: String,
    pub completed_at: String,
}

/// Mutable state tracked across progress events.
struct LiveState {
    session_id: String,
    entry_point: String,
    work_dir: String,
    command: String,
    status: String,
    iteration: u32,
    iteration_budget: u32,
    last_exit_code: Option<i32>,
    history_present: bool,
    backtrack_present: bool,
    started_at: chrono::DateTime<Local>,
}

impl LiveState {
    fn new(session_id: &str, entry_point: &str, work_dir: &Path) -> Self {
        Self {
            session_id: session_id.to_string(),
            entry_point: entry_point.to_string(),
            work_dir: work_dir.display().to_string(),
            command: String::new(),
            status: "pending".to_string(),
            iteration: 0,
            iteration_budget: 0,
            last_exit_code: None,
            history_present: false,
            backtrack_present: false,
            started_at: Local::now(),
        }
    }

    fn to_session_state(&self) -> SessionState {
        let elapsed = (Local::now() - self.started_at).num_seconds().max(0) as u64;
        SessionState {
            session_id: self.session_id.clone(),
            entry_point: self.entry_point.clone(),
            work_dir: self.work_dir.clone(),
            command: self.command.clone(),
            status: self.status.clone(),
            iteration: self.iteration,
            iteration_budget: self.iteration_budget,
            last_exit_code: self.last_exit_code,
            history_present: self.history_present,
            backtrack_present: self.backtrack_present,
            started_at: self.started_at.to_rfc3339(),
            elapsed_secs: elapsed,
        }
    }
}

/// The on-disk state directory: the running session's snapshot plus a
/// journal of finished sessions.
#[derive(Debug, Clone)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The running session, if one is writing state here.
    pub fn current(&self) -> Option<SessionState> {
        let content = std::fs::read_to_string(self.root.join(STATE_FILE)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// The last `limit` finished sessions, oldest first.
    pub fn history(&self, limit: usize) -> Vec<SessionHistoryEntry> {
        let Ok(content) = std::fs::read_to_string(self.root.join(HISTORY_FILE)) else {
            return Vec::new();
        };
        let lines: Vec<&str> = content.lines().collect();
        lines[lines.len().saturating_sub(limit)..]
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    fn write_current(&self, state: &SessionState) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        self.replace_file(STATE_FILE, json.as_bytes())
    }

    fn clear_current(&self) {
        let _ = std::fs::remove_file(self.root.join(STATE_FILE));
    }

    /// Append one finished session. Once the journal reaches
    /// `HISTORY_MAX_LINES` lines or `HISTORY_MAX_BYTES`, it is rewritten with
    /// only the newest `HISTORY_KEEP_LINES` before the new entry.
    fn record_finished(&self, entry: &SessionHistoryEntry) -> anyhow::Result<()> {
        let line = serde_json::to_string(entry)?;
        let path = self.root.join(HISTORY_FILE);
        let existing = std::fs::read_to_string(&path).unwrap_or_default();
        let count = existing.lines().count();

        if count >= HISTORY_MAX_LINES || existing.len() as u64 > HISTORY_MAX_BYTES {
            let lines: Vec<&str> = existing.lines().collect();
            let mut kept = lines[count.saturating_sub(HISTORY_KEEP_LINES)..].join("\n");
            kept.push('\n');
            kept.push_str(&line);
            kept.push('\n');
            tracing::debug!("Rotating {} ({} lines)", HISTORY_FILE, count);
            return self.replace_file(HISTORY_FILE, kept.as_bytes());
        }

        std::fs::create_dir_all(&self.root)?;
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        writeln!(f, "{}", line)?;
        Ok(())
    }

    /// Write `name` via a temp file and rename so readers never see a
    /// partial file.
    fn replace_file(&self, name: &str, bytes: &[u8]) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let tmp = self.root.join(format!(".{name}.tmp"));
        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
        std::fs::rename(&tmp, self.root.join(name))?;
        Ok(())
    }
}

/// Build a progress callback that records the session under `state`.
///
/// `inner` is an optional inner callback (e.g. terminal_progress) to delegate to.
pub fn state_writer_progress(
    state: StateDir,
    session: &crate::infra::session::Session,
    inner: Option<Box<dyn Fn(ProgressEvent) + Send>>,
) -> impl Fn(ProgressEvent) + Send + 'static {
    let live = Arc::new(Mutex::new(LiveState::new(
        &session.id,
        &session.entry_point,
        &session.work_dir,
    )));

    move |event: ProgressEvent| {
        if let Some(ref cb) = inner {
            cb(event.clone());
        }

        let Ok(mut live) = live.lock() else { return };
        match &event {
            ProgressEvent::SessionStart {
                command,
                iteration_budget,
                ..
            } => {
                live.command = command.clone();
                live.iteration_budget = *iteration_budget;
                live.status = "starting".to_string();
            }
            ProgressEvent::IterationStart { iteration, .. } => {
                live.iteration = *iteration;
                live.status = "executing".to_string();
            }
            ProgressEvent::IterationEnd {
                exit_code, signal, ..
            } => {
                live.last_exit_code = *exit_code;
                live.history_present = signal.history;
                live.backtrack_present = signal.backtrack;
                live.status = "inspecting".to_string();
            }
            ProgressEvent::Aborted { iteration, reason } => {
                live.iteration = *iteration;
                live.status = format!("aborted: {reason}");
            }
            ProgressEvent::Complete {
                outcome,
                invocations,
            } => {
                let entry = SessionHistoryEntry {
                    session_id: live.session_id.clone(),
                    entry_point: live.entry_point.clone(),
                    invocations: *invocations,
                    outcome: outcome.to_string(),
                    completed_at: Utc::now().to_rfc3339(),
                };
                if let Err(e) = state.record_finished(&entry) {
                    tracing::debug!("Failed to append {}: {}", HISTORY_FILE, e);
                }
                state.clear_current();
                return;
            }
        }

        if let Err(e) = state.write_current(&live.to_session_state()) {
            tracing::debug!("Failed to write {}: {}", STATE_FILE, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{SessionOutcome, Stamp};
    use crate::infra::session::Session;
    use crate::workspace::ContinuationSignal;
    use std::time::Duration;
    use tempfile::TempDir;

    fn stamp() -> Stamp {
        Stamp {
            day: 1,
            hour: 2,
            minute: 3,
            second: 4,
            micros: 5,
        }
    }

    #[test]
    fn test_state_written_during_iteration() {
        let dir = TempDir::new().unwrap();
        let session = Session::new("pkg.Main", "cp", "catg_tmp");
        let cb = state_writer_progress(StateDir::new(dir.path()), &session, None);

        cb(ProgressEvent::SessionStart {
            session_id: session.id.clone(),
            command: "java pkg.Main".into(),
            iteration_budget: 10,
        });
        cb(ProgressEvent::IterationStart {
            iteration: 1,
            iteration_budget: 10,
            stamp: stamp(),
        });
        cb(ProgressEvent::IterationEnd {
            iteration: 1,
            exit_code: Some(0),
            duration: Duration::from_millis(5),
            signal: ContinuationSignal {
                history: true,
                backtrack: false,
            },
        });

        let state = StateDir::new(dir.path()).current().unwrap();
        assert_eq!(state.session_id, session.id);
        assert_eq!(state.iteration, 1);
        assert_eq!(state.iteration_budget, 10);
        assert_eq!(state.status, "inspecting");
        assert!(state.history_present);
        assert!(!state.backtrack_present);
        assert_eq!(state.last_exit_code, Some(0));
    }

    #[test]
    fn test_complete_moves_state_to_history() {
        let dir = TempDir::new().unwrap();
        let session = Session::new("pkg.Main", "cp", "catg_tmp");
        let cb = state_writer_progress(StateDir::new(dir.path()), &session, None);

        cb(ProgressEvent::IterationStart {
            iteration: 1,
            iteration_budget: 1,
            stamp: stamp(),
        });
        assert!(StateDir::new(dir.path()).current().is_some());

        cb(ProgressEvent::Complete {
            outcome: SessionOutcome::BudgetExhausted,
            invocations: 1,
        });
        assert!(StateDir::new(dir.path()).current().is_none());

        let history = StateDir::new(dir.path()).history(10);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].outcome, "budget_exhausted");
        assert_eq!(history[0].invocations, 1);
    }

    #[test]
    fn test_abort_keeps_state_file() {
        let dir = TempDir::new().unwrap();
        let session = Session::new("pkg.Main", "cp", "catg_tmp");
        let cb = state_writer_progress(StateDir::new(dir.path()), &session, None);

        cb(ProgressEvent::Aborted {
            iteration: 3,
            reason: "Session cancelled".into(),
        });
        let state = StateDir::new(dir.path()).current().unwrap();
        assert_eq!(state.iteration, 3);
        assert!(state.status.starts_with("aborted"));
    }

    #[test]
    fn test_inner_callback_receives_events() {
        let dir = TempDir::new().unwrap();
        let session = Session::new("pkg.Main", "cp", "catg_tmp");
        let seen = Arc::new(Mutex::new(0));
        let seen_clone = seen.clone();
        let inner: Box<dyn Fn(ProgressEvent) + Send> = Box::new(move |_| {
            *seen_clone.lock().unwrap() += 1;
        });
        let cb = state_writer_progress(StateDir::new(dir.path()), &session, Some(inner));

        cb(ProgressEvent::Complete {
            outcome: SessionOutcome::ExplorationExhausted,
            invocations: 2,
        });
        assert_eq!(*seen.lock().unwrap(), 1);
    }

    fn entry(i: u32) -> SessionHistoryEntry {
        SessionHistoryEntry {
            session_id: format!("s{i}"),
            entry_point: "pkg.Main".into(),
            invocations: i,
            outcome: "exploration_exhausted".into(),
            completed_at: "2026-10-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn test_history_limit() {
        let dir = TempDir::new().unwrap();
        let state = StateDir::new(dir.path());
        for i in 0..5 {
            state.record_finished(&entry(i)).unwrap();
        }
        let last = state.history(2);
        assert_eq!(last.len(), 2);
        assert_eq!(last[0].session_id, "s3");
        assert_eq!(last[1].session_id, "s4");
    }

    #[test]
    fn test_history_rotates_to_newest_entries() {
        let dir = TempDir::new().unwrap();
        let state = StateDir::new(dir.path());
        let mut content = String::new();
        for i in 0..1000 {
            content.push_str(&serde_json::to_string(&entry(i)).unwrap());
            content.push('\n');
        }
        std::fs::write(dir.path().join(HISTORY_FILE), &content).unwrap();

        state.record_finished(&entry(1000)).unwrap();

        let all = state.history(usize::MAX);
        assert_eq!(all.len(), 501);
        assert_eq!(all[0].session_id, "s500");
        assert_eq!(all[500].session_id, "s1000");
    }

    #[test]
    fn test_missing_state_dir_reads_empty() {
        let state = StateDir::new("/nonexistent/catg-state");
        assert!(state.current().is_none());
        assert!(state.history(5).is_empty());
    }
}
