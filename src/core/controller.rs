// src/core/controller.rs — Iteration controller

use chrono::Local;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use super::executor::Executor;
use super::types::*;
use crate::infra::errors::DriverError;
use crate::infra::session::{Session, WorkspaceLock};
use crate::workspace::Workspace;

/// Drives the snapshot → invoke → inspect loop for one session at a time.
///
/// The controller cannot see inside the executor. It infers "more branches
/// to explore" only from the artifacts left on disk, so an executor that
/// crashes without writing `history` or `backtrackFlag` ends the session
/// instead of being re-run.
pub struct IterationController {
    executor: Arc<dyn Executor>,
    /// Optional callback for real-time progress events.
    on_progress: Option<Box<dyn Fn(ProgressEvent) + Send>>,
}

impl IterationController {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            on_progress: None,
        }
    }

    /// Set a callback for real-time progress events.
    pub fn with_progress(mut self, cb: impl Fn(ProgressEvent) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(cb));
        self
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(ref cb) = self.on_progress {
            cb(event);
        }
    }

    /// Run the exploration loop for `session`.
    ///
    /// Only workspace creation, lock contention, executor launch, executor
    /// timeout and cancellation are returned as errors. Cancellation is also
    /// checked between iterations, so an executor that ignores the token
    /// still stops the loop. Everything the
    /// executor does or fails to do to the artifacts is recorded in the
    /// report.
    pub async fn run(
        &self,
        session: &Session,
        cancel: &CancellationToken,
    ) -> Result<RunReport, DriverError> {
        let lock = WorkspaceLock::acquire(&session.work_dir)?;
        tracing::debug!("Holding {}", lock.path().display());
        let workspace = Workspace::new(&session.work_dir);

        let command = self.executor.describe();
        tracing::info!(
            session = %session.id,
            entry_point = %session.entry_point,
            budget = session.iteration_budget,
            "Starting concolic session",
        );
        tracing::info!("Executor command: {}", command);
        self.emit(ProgressEvent::SessionStart {
            session_id: session.id.clone(),
            command,
            iteration_budget: session.iteration_budget,
        });

        if let Err(e) = workspace.reset() {
            self.abort(0, &e);
            return Err(e);
        }

        let mut iterations: Vec<IterationRecord> = Vec::new();
        let mut outcome = SessionOutcome::BudgetExhausted;

        for i in 1..=session.iteration_budget {
            if cancel.is_cancelled() {
                let e = DriverError::Cancelled;
                self.abort(i, &e);
                return Err(e);
            }

            let inputs = workspace.snapshot_inputs(i);
            let history = workspace.snapshot_history();
            tracing::debug!(
                iteration = i,
                real_input = ?inputs.marker.value(),
                numbered = inputs.numbered.label(),
                previous = inputs.previous.label(),
                history = history.label(),
                "Snapshots taken",
            );

            let started_at = Local::now();
            self.emit(ProgressEvent::IterationStart {
                iteration: i,
                iteration_budget: session.iteration_budget,
                stamp: Stamp::from_datetime(&started_at),
            });

            let clock = Instant::now();
            let exit = match self.executor.invoke(workspace.root(), cancel).await {
                Ok(exit) => exit,
                Err(e) => {
                    tracing::error!("Iteration {} aborted: {}", i, e);
                    self.abort(i, &e);
                    return Err(e);
                }
            };
            let duration = clock.elapsed();

            let signal = workspace.continuation_signal();
            tracing::debug!(
                iteration = i,
                exit_code = ?exit.code,
                history = signal.history,
                backtrack = signal.backtrack,
                "Executor finished",
            );
            self.emit(ProgressEvent::IterationEnd {
                iteration: i,
                exit_code: exit.code,
                duration,
                signal,
            });

            iterations.push(IterationRecord {
                iteration: i,
                started_at,
                inputs,
                history,
                exit,
                duration,
                signal,
            });

            if !signal.should_continue() {
                outcome = SessionOutcome::ExplorationExhausted;
                break;
            }
        }

        tracing::info!(
            session = %session.id,
            invocations = iterations.len(),
            %outcome,
            "Concolic session finished",
        );
        self.emit(ProgressEvent::Complete {
            outcome,
            invocations: iterations.len() as u32,
        });

        Ok(RunReport {
            session_id: session.id.clone(),
            outcome,
            iterations,
        })
    }

    fn abort(&self, iteration: u32, error: &DriverError) {
        self.emit(ProgressEvent::Aborted {
            iteration,
            reason: error.to_string(),
        });
    }
}
