// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! [`ExecError`] describes the outcome of a single run; [`ProcrunError`] is
//! what the plan loader and the CLI front-end return.

use thiserror::Error;

use crate::exec::ExecError;

#[derive(Error, Debug)]
pub enum ProcrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ProcrunError>;

/// Process exit code for the `procrun` binary.
///
/// - the child's own code when it exited non-zero,
/// - `128 + n` when it was killed by signal `n`,
/// - `124` when it was cancelled (same as `timeout(1)`),
/// - `127` when it could not be launched,
/// - `1` for everything else.
pub fn exit_code(err: &ProcrunError) -> i32 {
    match err {
        ProcrunError::Exec(exec) => match exec {
            ExecError::NonZeroExit { code, .. } => *code,
            ExecError::Signalled { signal, .. } => 128 + signal,
            ExecError::Cancelled { .. } => 124,
            ExecError::Launch { .. } => 127,
            ExecError::Capture { .. } | ExecError::Wait { .. } => 1,
        },
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::CancelCause;

    #[test]
    fn exit_codes_follow_outcome() {
        let nonzero = ProcrunError::from(ExecError::NonZeroExit {
            program: "false".into(),
            code: 3,
        });
        assert_eq!(exit_code(&nonzero), 3);

        let signalled = ProcrunError::from(ExecError::Signalled {
            program: "sleep".into(),
            signal: 9,
        });
        assert_eq!(exit_code(&signalled), 137);

        let cancelled = ProcrunError::from(ExecError::Cancelled {
            program: "sleep".into(),
            cause: CancelCause::DeadlineExceeded,
        });
        assert_eq!(exit_code(&cancelled), 124);

        let config = ProcrunError::ConfigError("bad".into());
        assert_eq!(exit_code(&config), 1);
    }
}
