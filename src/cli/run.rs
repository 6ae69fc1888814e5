// src/cli/run.rs — Default command: run a concolic session

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::Cli;
use crate::core::controller::IterationController;
use crate::core::executor::{CommandExecutor, Executor};
use crate::core::state::{self, StateDir};
use crate::core::types::ProgressEvent;
use crate::infra::config::Config;
use crate::infra::errors::DriverError;
use crate::infra::paths;
use crate::infra::session::Session;

/// Apply CLI overrides on top of the loaded config.
pub fn effective_config(cli: &Cli, config: &Config) -> Config {
    let mut config = config.clone();
    if let Some(n) = cli.iterations {
        config.session.max_iterations = n;
    }
    if let Some(ref dir) = cli.work_dir {
        config.session.work_dir = dir.clone();
    }
    if let Some(secs) = cli.timeout {
        config.executor.timeout_seconds = secs;
    }
    config
}

/// Run one session end to end.
pub async fn run_session(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let Some((classpath, entry_point)) = cli.target() else {
        anyhow::bail!("usage: catg <classpath> <entry_point>");
    };
    let config = effective_config(cli, config);
    if config.session.max_iterations == 0 {
        anyhow::bail!("iteration budget must be at least 1");
    }

    let session = Session::new(entry_point, classpath, config.session.work_dir.clone())
    .with_iteration_budget(config.session.max_iterations);

    let executor =
        CommandExecutor::from_config(&config.executor, &session.entry_point, &session.classpath);

    if cli.dry_run {
        println!("{}", executor.describe());
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Interrupted, stopping executor...");
        cancel_clone.cancel();
    });

    let mut controller = IterationController::new(Arc::new(executor));
    {
        let inner: Option<Box<dyn Fn(ProgressEvent) + Send>> = if !cli.quiet {
            Some(Box::new(super::progress::terminal_progress()))
        } else {
            None
        };
        if config.session.write_state {
            controller = controller.with_progress(state::state_writer_progress(
                StateDir::new(paths::state_dir()),
                &session,
                inner,
            ));
        } else if let Some(cb) = inner {
            controller = controller.with_progress(cb);
        }
    }

    let report = controller.run(&session, &cancel).await?;

    tracing::info!(
        session = %report.session_id,
        invocations = report.invocations(),
        inputs_archived = report.inputs_archived(),
        outcome = %report.outcome,
        "Session complete",
    );
    Ok(())
}

/// A follow-up suggestion printed after a fatal error, when one applies.
pub fn failure_hint(err: &anyhow::Error) -> Option<&'static str> {
    let err = err.downcast_ref::<DriverError>()?;
    if err.is_executor_failure() {
        Some("inspect the executor command with --dry-run; its relative paths resolve inside the working directory")
    } else if matches!(err, DriverError::WorkspaceLocked { .. }) {
        Some("pass a different --work-dir to run sessions side by side")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "catg", "-i", "3", "--work-dir", "w2", "--timeout", "12", "cp", "a.Main",
        ])
        .unwrap();
        let merged = effective_config(&cli, &Config::default());
        assert_eq!(merged.session.max_iterations, 3);
        assert_eq!(merged.session.work_dir, PathBuf::from("w2"));
        assert_eq!(merged.executor.timeout_seconds, 12);
    }

    #[test]
    fn test_config_kept_without_overrides() {
        let cli = Cli::try_parse_from(["catg", "cp", "a.Main"]).unwrap();
        let mut config = Config::default();
        config.session.max_iterations = 42;
        let merged = effective_config(&cli, &config);
        assert_eq!(merged.session.max_iterations, 42);
        assert_eq!(merged.session.work_dir, PathBuf::from("catg_tmp"));
    }

    #[test]
    fn test_hint_for_executor_failures() {
        let hung = anyhow::Error::from(DriverError::ExecutorHung {
            timeout: std::time::Duration::from_secs(5),
        });
        assert!(failure_hint(&hung).unwrap().contains("--dry-run"));

        let locked = anyhow::Error::from(DriverError::WorkspaceLocked {
            path: PathBuf::from("catg_tmp"),
            pid: 7,
        });
        assert!(failure_hint(&locked).unwrap().contains("--work-dir"));

        assert!(failure_hint(&anyhow::Error::from(DriverError::Cancelled)).is_none());
        assert!(failure_hint(&anyhow::anyhow!("plain")).is_none());
    }

    #[tokio::test]
    async fn test_zero_budget_rejected() {
        let cli = Cli::try_parse_from(["catg", "-i", "0", "--dry-run", "cp", "a.Main"]).unwrap();
        assert!(run_session(&cli, &Config::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let work = dir.path().join("catg_tmp");
        let cli = Cli::try_parse_from([
            "catg",
            "--dry-run",
            "--work-dir",
            work.to_str().unwrap(),
            "cp",
            "a.Main",
        ])
        .unwrap();
        run_session(&cli, &Config::default()).await.unwrap();
        assert!(!work.exists());
    }
}
