// src/exec/executable.rs

use std::fmt;

use tokio::io::AsyncWrite;

use crate::exec::command::Command;
use crate::exec::context::ExecContext;
use crate::exec::error::ExecError;
use crate::exec::runner::ProcessRunner;
use crate::exec::script::Script;
use crate::exec::sequence::SequentialCommands;

/// Everything this crate knows how to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Executable {
    Command(Command),
    Sequence(SequentialCommands),
    Script(Script),
}

impl Executable {
    pub async fn exec<O, E>(
        &self,
        ctx: &ExecContext,
        stdout: &mut O,
        stderr: &mut E,
    ) -> Result<(), ExecError>
    where
        O: AsyncWrite + Unpin + ?Sized,
        E: AsyncWrite + Unpin + ?Sized,
    {
        self.exec_with(&ProcessRunner::default(), ctx, stdout, stderr)
            .await
    }

    pub async fn exec_with<O, E>(
        &self,
        runner: &ProcessRunner,
        ctx: &ExecContext,
        stdout: &mut O,
        stderr: &mut E,
    ) -> Result<(), ExecError>
    where
        O: AsyncWrite + Unpin + ?Sized,
        E: AsyncWrite + Unpin + ?Sized,
    {
        match self {
            Executable::Command(c) => c.exec_with(runner, ctx, stdout, stderr).await,
            Executable::Sequence(s) => s.exec_with(runner, ctx, stdout, stderr).await,
            Executable::Script(s) => s.exec_with(runner, ctx, stdout, stderr).await,
        }
    }

    /// The program that will be launched first, if any.
    pub fn program(&self) -> Option<&str> {
        match self {
            Executable::Command(c) => Some(c.name()),
            Executable::Sequence(s) => s.commands().first().map(Command::name),
            Executable::Script(s) => Some(s.shell()),
        }
    }

    /// Multi-line human readable summary, used for dry runs.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Executable::Command(c) => write!(f, "command: {}", render_command(c)),
            Executable::Sequence(s) => {
                write!(f, "sequence ({} commands):", s.len())?;
                for (i, c) in s.commands().iter().enumerate() {
                    write!(f, "\n  {}. {}", i + 1, render_command(c))?;
                }
                Ok(())
            }
            Executable::Script(s) => {
                write!(f, "script: shell={} level={}", s.shell(), s.level())?;
                for line in s.source().lines() {
                    write!(f, "\n  | {line}")?;
                }
                Ok(())
            }
        }
    }
}

fn render_command(c: &Command) -> String {
    let mut parts = vec![c.name().to_string()];
    parts.extend(c.arguments().iter().map(|a| format!("{a:?}")));
    parts.join(" ")
}

impl From<Command> for Executable {
    fn from(c: Command) -> Self {
        Executable::Command(c)
    }
}

impl From<SequentialCommands> for Executable {
    fn from(s: SequentialCommands) -> Self {
        Executable::Sequence(s)
    }
}

impl From<Script> for Executable {
    fn from(s: Script) -> Self {
        Executable::Script(s)
    }
}
