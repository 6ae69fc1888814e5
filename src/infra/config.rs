// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub executor: ExecutorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub max_iterations: u32,
    pub work_dir: PathBuf,
    /// Write current-session.json / session-history.jsonl under the state dir.
    pub write_state: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            work_dir: PathBuf::from("catg_tmp"),
            write_state: true,
        }
    }
}

/// How the instrumented JVM is launched.
///
/// Relative paths are resolved by the JVM from inside the working directory,
/// which is the executor's cwd. The `../lib` defaults therefore assume the
/// working directory sits one level below the project root; a `--work-dir`
/// elsewhere needs absolute paths here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub java: String,
    pub max_heap: String,
    pub initial_heap: String,
    pub logger_class: String,
    pub conf_file: String,
    pub agent_jar: String,
    /// Prefix joined onto the user's classpath reference.
    pub project_root: String,
    pub aux_classpath: Vec<String>,
    pub extra_jvm_args: Vec<String>,
    /// 0 = wait for the executor indefinitely.
    pub timeout_seconds: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            java: "java".into(),
            max_heap: "4096M".into(),
            initial_heap: "2048M".into(),
            logger_class: "janala.logger.DirectConcolicExecution".into(),
            conf_file: "../lib/catg.conf".into(),
            agent_jar: "../lib/janala2-gradle-0.2.jar".into(),
            project_root: "..".into(),
            aux_classpath: vec![
                "../lib/janala2-gradle-0.2.jar".into(),
                "../lib/asm-all-5.0.4.jar".into(),
                "../lib/automaton-1.11-8.jar".into(),
            ],
            extra_jvm_args: vec!["-ea".into()],
            timeout_seconds: 0,
        }
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.session.max_iterations == 0 {
            anyhow::bail!(crate::infra::errors::DriverError::Config(
                "session.max_iterations must be at least 1".into()
            ));
        }
        if self.executor.java.trim().is_empty() {
            anyhow::bail!(crate::infra::errors::DriverError::Config(
                "executor.java must not be empty".into()
            ));
        }
        Ok(())
    }
}
