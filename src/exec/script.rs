// src/exec/script.rs

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tokio::io::AsyncWrite;
use tokio::process::Command as OsCommand;
use tracing::debug;

use crate::exec::alert::AlertLevel;
use crate::exec::context::ExecContext;
use crate::exec::error::ExecError;
use crate::exec::runner::ProcessRunner;

/// Inline script text executed by a shell interpreter.
///
/// The source is written to a temporary file and handed to the interpreter
/// as its program (`<shell> <file>`), so multi-line scripts, pipelines and
/// shell built-ins work without any quoting. Everything the interpreter
/// forks stays in its process group and is torn down with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    shell: String,
    source: String,
    level: AlertLevel,
}

impl Script {
    pub fn new(shell: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            source: source.into(),
            level: AlertLevel::default(),
        }
    }

    pub fn with_level(mut self, level: AlertLevel) -> Self {
        self.level = level;
        self
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn level(&self) -> AlertLevel {
        self.level
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
        if self.shell.trim().is_empty() {
            return Err(ExecError::Launch {
                program: self.shell.clone(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "empty shell path"),
            });
        }

        if self.source.is_empty() {
            debug!(shell = %self.shell, "empty script source; nothing to run");
            return Ok(());
        }

        let file = write_script(&self.source).map_err(|source| ExecError::Launch {
            program: self.shell.clone(),
            source,
        })?;
        debug!(
            shell = %self.shell,
            path = %file.path().display(),
            level = %self.level,
            "executing script"
        );

        let mut cmd = OsCommand::new(&self.shell);
        cmd.arg(file.path());

        // `file` is removed on drop, after the interpreter has exited.
        runner
            .run(cmd, &self.shell, self.level, ctx, stdout, stderr)
            .await
    }
}

fn write_script(source: &str) -> io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("procrun-")
        .suffix(".sh")
        .tempfile()?;
    file.write_all(source.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Pick an interpreter for scripts that don't name one.
///
/// Uses `$SHELL` when it is an absolute path to a file, then `/bin/bash`,
/// then `/bin/sh`.
pub fn default_shell() -> String {
    if let Ok(shell) = std::env::var("SHELL") {
        let path = Path::new(&shell);
        if path.is_absolute() && path.is_file() {
            return shell;
        }
    }
    if Path::new("/bin/bash").exists() {
        "/bin/bash".to_string()
    } else {
        "/bin/sh".to_string()
    }
}
