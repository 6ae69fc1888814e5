// src/core/executor.rs — External instrumented-execution process
//
// The executor is opaque: it reads and rewrites artifacts in the working
// directory and exits. Only its launch, its exit, and how long it takes are
// visible to the driver.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

use super::types::ExecutorExit;
use crate::infra::config::ExecutorConfig;
use crate::infra::errors::DriverError;

/// One run of the external engine inside `workdir`.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Human-readable command line, logged once per session.
    fn describe(&self) -> String;

    /// Run to completion. The exit code is reported but carries no meaning
    /// for the driver.
    async fn invoke(
        &self,
        workdir: &Path,
        cancel: &CancellationToken,
    ) -> Result<ExecutorExit, DriverError>;
}

/// Program plus argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ExecutorCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The instrumented JVM invocation for `entry_point`. Only the entry point
    /// and the classpath reference vary between sessions.
    pub fn instrumented_jvm(config: &ExecutorConfig, entry_point: &str, classpath: &str) -> Self {
        let mut args = vec![
            format!("-Xmx{}", config.max_heap),
            format!("-Xms{}", config.initial_heap),
            format!("-Djanala.loggerClass={}", config.logger_class),
            format!("-Djanala.conf={}", config.conf_file),
            format!("-javaagent:{}", config.agent_jar),
            "-cp".to_string(),
            build_classpath(&config.project_root, classpath, &config.aux_classpath),
        ];
        args.extend(config.extra_jvm_args.iter().cloned());
        args.push(entry_point.to_string());

        Self::new(config.java.clone(), args)
    }

    /// Shell-style rendering for display. Arguments containing whitespace are
    /// single-quoted.
    pub fn render(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| {
                if part.is_empty() || part.chars().any(char::is_whitespace) {
                    format!("'{}'", part.replace('\'', r"'\''"))
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn build_classpath(project_root: &str, classpath: &str, aux: &[String]) -> String {
    let project = if project_root.is_empty() {
        PathBuf::from(classpath)
    } else {
        Path::new(project_root).join(classpath)
    };

    let sep = if cfg!(windows) { ";" } else { ":" };
    std::iter::once(project.to_string_lossy().into_owned())
        .chain(aux.iter().cloned())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Spawns `ExecutorCommand` with the working directory as its cwd.
pub struct CommandExecutor {
    command: ExecutorCommand,
    timeout: Option<Duration>,
}

enum WaitResult {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

impl CommandExecutor {
    pub fn new(command: ExecutorCommand) -> Self {
        Self {
            command,
            timeout: None,
        }
    }

    pub fn from_config(config: &ExecutorConfig, entry_point: &str, classpath: &str) -> Self {
        let exec = Self::new(ExecutorCommand::instrumented_jvm(config, entry_point, classpath));
        if config.timeout_seconds > 0 {
            exec.with_timeout(Duration::from_secs(config.timeout_seconds))
        } else {
            exec
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

async fn wait_bounded(child: &mut Child, timeout: Option<Duration>) -> WaitResult {
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => WaitResult::Exited(status),
            Err(_) => WaitResult::TimedOut,
        },
        None => WaitResult::Exited(child.wait().await),
    }
}

#[async_trait]
impl Executor for CommandExecutor {
    fn describe(&self) -> String {
        self.command.render()
    }

    async fn invoke(
        &self,
        workdir: &Path,
        cancel: &CancellationToken,
    ) -> Result<ExecutorExit, DriverError> {
        tracing::debug!(cwd = %workdir.display(), "Launching executor");

        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .current_dir(workdir)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DriverError::ExecutorLaunch {
                program: self.command.program.clone(),
                source,
            })?;

        let result = tokio::select! {
            r = wait_bounded(&mut child, self.timeout) => r,
            _ = cancel.cancelled() => WaitResult::Cancelled,
        };

        match result {
            WaitResult::Exited(Ok(status)) => Ok(ExecutorExit {
                code: status.code(),
            }),
            WaitResult::Exited(Err(e)) => Err(DriverError::Io(e)),
            WaitResult::TimedOut => {
                tracing::error!("Executor exceeded {:?}, killing it", self.timeout);
                let _ = child.kill().await;
                Err(DriverError::ExecutorHung {
                    timeout: self.timeout.unwrap_or_default(),
                })
            }
            WaitResult::Cancelled => {
                tracing::warn!("Cancellation requested, killing executor");
                let _ = child.kill().await;
                Err(DriverError::Cancelled)
            }
        }
    }
}
