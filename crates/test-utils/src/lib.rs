//! Shared helpers for procrun's integration tests.

pub mod probes;
pub mod sinks;

use procrun::exec::{ExecContext, ExecError, Executable, ProcessRunner};

pub use probes::{group_members, process_is_running, wait_for_empty_group, wait_until_gone};
pub use sinks::{FailingSink, SharedBuffer};

/// Outcome of [`capture`]: the result plus everything written to each sink.
#[derive(Debug)]
pub struct Captured {
    pub result: Result<(), ExecError>,
    pub stdout: String,
    pub stderr: String,
}

/// Run `exec` into in-memory buffers.
pub async fn capture(exec: &Executable, runner: &ProcessRunner, ctx: &ExecContext) -> Captured {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let result = exec.exec_with(runner, ctx, &mut out, &mut err).await;
    Captured {
        result,
        stdout: String::from_utf8_lossy(&out).into_owned(),
        stderr: String::from_utf8_lossy(&err).into_owned(),
    }
}
