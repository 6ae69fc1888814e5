// src/cli/progress.rs — Terminal progress renderer

use std::io::Write;

use crate::core::types::ProgressEvent;

/// A rendered progress line and where it goes.
#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    Stdout(String),
    Stderr(String),
}

/// Format one event. The per-iteration `[Input …]` record goes to stdout so
/// it interleaves with the executor's own output; everything else is stderr.
pub fn render(event: &ProgressEvent) -> Line {
    match event {
        ProgressEvent::SessionStart { command, .. } => Line::Stdout(command.clone()),
        ProgressEvent::IterationStart {
            iteration, stamp, ..
        } => Line::Stdout(format!("[Input {} at {}]", iteration, stamp)),
        ProgressEvent::IterationEnd {
            iteration,
            exit_code,
            duration,
            signal,
        } => Line::Stderr(format!(
            "[iter {}] exit={} {:.1}s history={} backtrack={}",
            iteration,
            exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
            duration.as_secs_f64(),
            signal.history,
            signal.backtrack,
        )),
        ProgressEvent::Complete {
            outcome,
            invocations,
        } => Line::Stderr(format!(
            "[done] {} after {} invocation(s)",
            outcome, invocations
        )),
        ProgressEvent::Aborted { iteration, reason } => {
            Line::Stderr(format!("[abort] iteration {}: {}", iteration, reason))
        }
    }
}

/// Progress callback for `IterationController::with_progress()`.
///
/// Stdout is flushed after every line so progress stays visible while the
/// next executor run blocks.
pub fn terminal_progress() -> impl Fn(ProgressEvent) + Send + 'static {
    move |event| match render(&event) {
        Line::Stdout(msg) => {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "{}", msg);
            let _ = out.flush();
        }
        Line::Stderr(msg) => eprintln!("{}", msg),
    }
}
