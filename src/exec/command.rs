// src/exec/command.rs

use std::io;

use tokio::io::AsyncWrite;
use tokio::process::Command as OsCommand;
use tracing::debug;

use crate::exec::alert::AlertLevel;
use crate::exec::context::ExecContext;
use crate::exec::error::ExecError;
use crate::exec::runner::ProcessRunner;

/// A single program invocation. Arguments are passed verbatim; nothing is
/// shell-expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    args: Vec<String>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Run with the default [`ProcessRunner`].
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

    /// Run with an explicit runner. Commands are always terminated at
    /// [`AlertLevel::Calm`].
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
        if self.name.trim().is_empty() {
            return Err(ExecError::Launch {
                program: self.name.clone(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "empty program name"),
            });
        }

        debug!(program = %self.name, args = ?self.args, "executing command");

        let mut cmd = OsCommand::new(&self.name);
        cmd.args(&self.args);

        runner
            .run(cmd, &self.name, AlertLevel::Calm, ctx, stdout, stderr)
            .await
    }
}
