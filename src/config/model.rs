// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::exec::{AlertLevel, Executable, ExecContext, ProcessRunner};

/// A plan file as read from TOML, before validation.
///
/// ```toml
/// [runner]
/// grace_period = "500ms"
/// timeout = "30s"
///
/// [exec]
/// type = "script"
/// shell = "/bin/bash"
/// level = "red"
/// source = """
/// echo "New Login"
/// date
/// """
/// ```
///
/// `[runner]` is optional; `[exec]` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlanFile {
    #[serde(default)]
    pub runner: RunnerSection,

    pub exec: ExecSection,
}

/// `[runner]` section. Durations use the `parse_duration` syntax.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunnerSection {
    /// Time between the graceful signal and SIGKILL. Defaults to 2s.
    #[serde(default)]
    pub grace_period: Option<String>,

    /// Deadline for the whole run. No deadline when absent.
    #[serde(default)]
    pub timeout: Option<String>,
}

/// `[exec]` section, selected by its `type` key.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExecSection {
    /// `type = "command"` with `name` and optional `args`.
    Command(CommandSpec),

    /// `type = "sequence"` with `[[exec.commands]]` tables.
    Sequence {
        #[serde(default)]
        commands: Vec<CommandSpec>,
    },

    /// `type = "script"`. A missing `shell` falls back to
    /// [`default_shell`](crate::exec::default_shell).
    Script {
        #[serde(default)]
        shell: Option<String>,

        #[serde(default)]
        level: AlertLevel,

        #[serde(default)]
        source: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandSpec {
    pub name: String,

    #[serde(default)]
    pub args: Vec<String>,
}

/// Validated runner settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerSettings {
    pub grace_period: Duration,
    pub timeout: Option<Duration>,
}

impl RunnerSettings {
    pub fn runner(&self) -> ProcessRunner {
        ProcessRunner::new(self.grace_period)
    }

    /// Fresh context honouring `timeout`.
    pub fn context(&self) -> ExecContext {
        match self.timeout {
            Some(timeout) => ExecContext::with_timeout(timeout),
            None => ExecContext::background(),
        }
    }
}

/// A validated plan: what to run and how to stop it.
#[derive(Debug, Clone)]
pub struct PlanFile {
    pub runner: RunnerSettings,
    pub exec: Executable,
}
