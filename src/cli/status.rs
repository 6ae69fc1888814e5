// src/cli/status.rs — Session status display

use crate::core::state::{SessionHistoryEntry, SessionState, StateDir};
use crate::infra::paths;

/// Display the running session and the last `history` finished sessions.
pub fn show_status(history: usize) -> anyhow::Result<()> {
    let state = StateDir::new(paths::state_dir());
    print!("{}", format_status(state.current().as_ref(), &state.history(history)));
    Ok(())
}

fn format_status(current: Option<&SessionState>, finished: &[SessionHistoryEntry]) -> String {
    let mut out = format!("catg v{}\n\n", env!("CARGO_PKG_VERSION"));

    match current {
        Some(s) => {
            out.push_str(&format!("  Running:    {} ({})\n", s.entry_point, s.session_id));
            out.push_str(&format!("    Work dir:   {}\n", s.work_dir));
            out.push_str(&format!(
                "    Iteration:  {}/{} ({}, {}s elapsed)\n",
                s.iteration, s.iteration_budget, s.status, s.elapsed_secs
            ));
            if let Some(code) = s.last_exit_code {
                out.push_str(&format!("    Last exit:  {}\n", code));
            }
        }
        None => out.push_str("  Running:    (no session running)\n"),
    }

    if !finished.is_empty() {
        out.push_str("\n  Recent sessions:\n");
        for entry in finished.iter().rev() {
            out.push_str(&format!(
                "    {}  {}  {} after {} invocation(s)\n",
                entry.completed_at, entry.entry_point, entry.outcome, entry.invocations
            ));
        }
    }

    out
}
