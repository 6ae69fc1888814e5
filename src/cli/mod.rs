// src/cli/mod.rs — CLI definition (clap derive)

pub mod progress;
pub mod run;
pub mod status;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "catg",
    about = "Drive an instrumented concolic executor until exploration is exhausted",
    version,
    subcommand_negates_reqs = true,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Classpath of the project under test (relative to the executor's project root)
    #[arg(required = true)]
    pub classpath: Option<String>,

    /// Fully qualified name of the entry point class
    #[arg(required = true)]
    pub entry_point: Option<String>,

    /// Iteration budget (defaults to config, 100)
    #[arg(short, long)]
    pub iterations: Option<u32>,

    /// Scratch working directory, recreated at start (defaults to config, catg_tmp).
    /// The executor runs inside it, so relative executor paths from config
    /// (the default ../lib jars, project root ..) are resolved from here
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Kill the executor after this many seconds (0 = wait forever)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Config file path
    #[arg(long)]
    pub config: Option<String>,

    /// Suppress per-iteration progress records
    #[arg(long)]
    pub quiet: bool,

    /// Print the executor command and exit
    #[arg(long)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the running session and recently finished ones
    Status {
        /// Number of finished sessions to list
        #[arg(long, default_value = "5")]
        history: usize,
    },
}

impl Cli {
    /// `(classpath, entry_point)` when running a session.
    pub fn target(&self) -> Option<(&str, &str)> {
        Some((self.classpath.as_deref()?, self.entry_point.as_deref()?))
    }
}
