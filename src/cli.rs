// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::parse_duration;
use crate::exec::AlertLevel;

/// Command-line arguments for `procrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "procrun",
    version,
    about = "Run a command or shell script and tear down its whole process tree on timeout or Ctrl-C.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROCRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Cancel the run after this long (e.g. "500ms", "30s", "5m").
    ///
    /// Overrides `[runner].timeout` from a plan file.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration, global = true)]
    pub timeout: Option<Duration>,

    /// Time between the graceful signal and SIGKILL.
    ///
    /// Overrides `[runner].grace_period` from a plan file.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration, global = true)]
    pub grace_period: Option<Duration>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Run a single program with verbatim arguments (no shell expansion).
    Cmd {
        /// Program name or path.
        program: String,

        /// Arguments passed as-is.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run an inline or file-based shell script.
    Script(ScriptArgs),

    /// Run the executable described by a TOML plan file.
    Plan {
        /// Path to the plan file.
        path: PathBuf,

        /// Parse + validate, print what would run, but don't execute it.
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ScriptArgs {
    /// Interpreter to run the script with. Defaults to `$SHELL`, then bash,
    /// then sh.
    #[arg(long, value_name = "PATH")]
    pub shell: Option<String>,

    /// How forcefully to stop the script on cancellation.
    #[arg(long, value_name = "LEVEL", default_value_t = AlertLevel::Calm)]
    pub level: AlertLevel,

    /// Script text to run.
    #[arg(long, value_name = "TEXT", conflicts_with = "file", required_unless_present = "file")]
    pub source: Option<String>,

    /// File whose contents are the script.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
