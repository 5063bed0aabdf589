//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - hook: one stop-hook decision cycle (stdin envelope, stdout decision)
//! - start: create a task loop in the current directory
//! - status/cancel: inspect or end the current loop
//! - setup: install command templates and hook settings

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Taskloop - keeps an agent iterating on a task until it signals completion
///
/// Running without a subcommand shows the current loop's status.
#[derive(Parser, Debug)]
#[command(name = "taskloop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one stop-hook decision cycle (reads stdin, writes stdout)
    Hook,

    /// Start a task loop in the current directory
    Start {
        /// Task description re-injected on each forced continuation
        prompt: String,

        /// Maximum iterations before the loop ends regardless of completion
        #[arg(short = 'm', long)]
        max_iterations: Option<u32>,

        /// Marker the agent must emit inside <promise></promise> tags
        #[arg(short, long)]
        promise: Option<String>,
    },

    /// Show the state of the current task loop
    Status,

    /// Cancel the current task loop
    Cancel,

    /// Install command templates and hook settings
    Setup {
        /// Install into ~/.claude
        #[arg(long)]
        global: bool,

        /// Install into ./.claude
        #[arg(long)]
        project: bool,

        /// Install both global and project configuration
        #[arg(long)]
        both: bool,

        /// Directory containing the files to install (defaults to the
        /// current directory)
        #[arg(long)]
        source: Option<PathBuf>,
    },
}
