// src/exec/sequence.rs

use tokio::io::AsyncWrite;
use tracing::{debug, info};

use crate::exec::command::Command;
use crate::exec::context::ExecContext;
use crate::exec::error::ExecError;
use crate::exec::runner::ProcessRunner;

/// Commands run strictly one after another, stopping at the first failure.
///
/// Command *n+1* is never started before command *n* has reached a terminal
/// state. An empty set succeeds without launching anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequentialCommands {
    commands: Vec<Command>,
}

impl SequentialCommands {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

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
        let total = self.commands.len();

        for (index, command) in self.commands.iter().enumerate() {
            debug!(step = index + 1, total, program = %command.name(), "starting sequence step");

            if let Err(err) = command.exec_with(runner, ctx, &mut *stdout, &mut *stderr).await {
                info!(
                    step = index + 1,
                    total,
                    program = %command.name(),
                    error = %err,
                    "sequence step failed; skipping remaining commands"
                );
                return Err(err);
            }
        }

        Ok(())
    }
}

impl From<Vec<Command>> for SequentialCommands {
    fn from(commands: Vec<Command>) -> Self {
        Self::new(commands)
    }
}

impl FromIterator<Command> for SequentialCommands {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
