// src/exec/error.rs

//! Outcome taxonomy for a single `exec` call.

use std::io;

use nix::sys::signal::Signal;
use thiserror::Error;

use crate::exec::capture::Stream;
use crate::exec::context::CancelCause;

/// Why an `exec` call did not succeed.
///
/// Any error means the described work may be partially complete; the process
/// tree has been torn down, but its side effects are not rolled back.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The program or interpreter could not be started.
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' exited with status {code}")]
    NonZeroExit { program: String, code: i32 },

    /// Killed by a signal that this crate did not send.
    #[error("'{program}' was terminated by {}", signal_name(.signal))]
    Signalled { program: String, signal: i32 },

    /// Terminated because the execution context was done first.
    #[error("'{program}' was cancelled: {cause}")]
    Cancelled { program: String, cause: CancelCause },

    /// Writing to an output sink (or reading the child's pipe) failed.
    #[error("capturing {stream} of '{program}' failed: {source}")]
    Capture {
        program: String,
        stream: Stream,
        #[source]
        source: io::Error,
    },

    #[error("waiting for '{program}' failed: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl ExecError {
    pub fn program(&self) -> &str {
        match self {
            ExecError::Launch { program, .. }
            | ExecError::NonZeroExit { program, .. }
            | ExecError::Signalled { program, .. }
            | ExecError::Cancelled { program, .. }
            | ExecError::Capture { program, .. }
            | ExecError::Wait { program, .. } => program,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecError::Cancelled { .. })
    }

    pub fn cancel_cause(&self) -> Option<CancelCause> {
        match self {
            ExecError::Cancelled { cause, .. } => Some(*cause),
            _ => None,
        }
    }

    /// Exit code of a process that ran and exited unsuccessfully.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecError::NonZeroExit { code, .. } => Some(*code),
            _ => None,
        }
    }
}

fn signal_name(signal: &i32) -> String {
    match Signal::try_from(*signal) {
        Ok(sig) => sig.as_str().to_string(),
        Err(_) => format!("signal {signal}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_errors_name_the_signal() {
        let err = ExecError::Signalled {
            program: "sleep".to_string(),
            signal: 15,
        };
        assert_eq!(err.to_string(), "'sleep' was terminated by SIGTERM");
        assert_eq!(err.exit_code(), None);
        assert!(!err.is_cancelled());
    }

    #[test]
    fn cancelled_carries_cause() {
        let err = ExecError::Cancelled {
            program: "/bin/bash".to_string(),
            cause: CancelCause::DeadlineExceeded,
        };
        assert_eq!(err.cancel_cause(), Some(CancelCause::DeadlineExceeded));
        assert_eq!(err.to_string(), "'/bin/bash' was cancelled: deadline exceeded");
        assert_eq!(err.program(), "/bin/bash");
    }
}
