// src/exec/runner.rs

//! The process runner: launch, capture, race exit against cancellation, and
//! tear the process group down according to the alert level.

use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use nix::sys::signal::Signal;
use tokio::io::AsyncWrite;
use tokio::process::{Child, Command as OsCommand};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::exec::alert::AlertLevel;
use crate::exec::capture::{self, CaptureFailure, Stream};
use crate::exec::context::{CancelCause, ExecContext};
use crate::exec::error::ExecError;
use crate::exec::group::ProcessGroup;

/// Grace period used by [`ProcessRunner::default`].
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Lower bound on the final drain, so a zero grace period still collects
/// what is already buffered in the pipes.
const MIN_DRAIN_WINDOW: Duration = Duration::from_millis(250);

/// How the first phase of a run ended.
enum Race {
    Exited(io::Result<ExitStatus>, Instant),
    Cancelled(CancelCause),
}

type CaptureResult = (Result<u64, CaptureFailure>, Result<u64, CaptureFailure>);

/// Runs one OS process per call to [`run`](Self::run).
///
/// The runner itself holds only configuration; every run owns its child,
/// its process group and its sinks, so one runner can be shared freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessRunner {
    grace_period: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE_PERIOD)
    }
}

impl ProcessRunner {
    pub fn new(grace_period: Duration) -> Self {
        Self { grace_period }
    }

    /// How long a graceful signal is given before SIGKILL follows.
    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Launch `command`, forward its output, and wait until it reaches a
    /// terminal state.
    ///
    /// Returns only after the leader has been reaped, the rest of its process
    /// group has been killed, and both pipes have been drained (or abandoned
    /// once the drain window passes).
    pub async fn run<O, E>(
        &self,
        mut command: OsCommand,
        program: &str,
        level: AlertLevel,
        ctx: &ExecContext,
        stdout: &mut O,
        stderr: &mut E,
    ) -> Result<(), ExecError>
    where
        O: AsyncWrite + Unpin + ?Sized,
        E: AsyncWrite + Unpin + ?Sized,
    {
        if let Some(cause) = ctx.err() {
            debug!(program, %cause, "context already done; not launching");
            return Err(ExecError::Cancelled {
                program: program.to_string(),
                cause,
            });
        }

        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .process_group(0);

        let mut child = command.spawn().map_err(|source| ExecError::Launch {
            program: program.to_string(),
            source,
        })?;

        let Some(pid) = child.id() else {
            // Only possible if the child was already reaped, which cannot
            // happen before the first wait.
            return Err(ExecError::Wait {
                program: program.to_string(),
                source: io::Error::other("child has no pid after spawn"),
            });
        };
        let mut group = ProcessGroup::from_leader(pid, program);
        info!(program, pid, %level, "process started");

        let out_pipe = child.stdout.take();
        let err_pipe = child.stderr.take();
        let capture = async {
            tokio::join!(
                capture::drain(out_pipe, stdout, Stream::Stdout),
                capture::drain(err_pipe, stderr, Stream::Stderr),
            )
        };
        tokio::pin!(capture);
        let mut captured: Option<CaptureResult> = None;

        let race = loop {
            tokio::select! {
                status = child.wait() => break Race::Exited(status, Instant::now()),
                cause = ctx.done() => break Race::Cancelled(cause),
                res = &mut capture, if captured.is_none() => captured = Some(res),
            }
        };

        match race {
            Race::Exited(status, exited_at) => {
                let status = status.map_err(|source| ExecError::Wait {
                    program: program.to_string(),
                    source,
                })?;
                group.disarm();
                info!(program, pid, code = ?status.code(), success = status.success(), "process exited");

                // The leader is reaped; nothing it left in its group may
                // outlive the run.
                if let Err(e) = group.signal(Signal::SIGKILL) {
                    warn!(program, pgid = group.id(), error = %e, "failed to sweep process group after exit");
                }

                // Only a descendant that left the group (`setsid`) can still
                // hold a pipe open here.
                if captured.is_none() {
                    match time::timeout(self.drain_window(), &mut capture).await {
                        Ok(res) => captured = Some(res),
                        Err(_) => warn!(
                            program,
                            pid,
                            "output pipes still open after exit; abandoning capture"
                        ),
                    }
                }

                let failure = captured.and_then(first_failure);
                exit_outcome(program, status, exited_at, failure)
            }

            Race::Cancelled(cause) => {
                info!(program, pid, %cause, %level, "cancellation observed; terminating process group");

                let status = {
                    let terminate = self.terminate(&mut child, &group, level);
                    tokio::pin!(terminate);
                    loop {
                        tokio::select! {
                            status = &mut terminate => break status,
                            res = &mut capture, if captured.is_none() => captured = Some(res),
                        }
                    }
                };
                group.disarm();

                match status {
                    Ok(status) => debug!(program, pid, ?status, "cancelled process reaped"),
                    Err(e) => warn!(program, pid, error = %e, "failed to reap cancelled process"),
                }

                if captured.is_none() {
                    match time::timeout(self.drain_window(), &mut capture).await {
                        Ok(res) => captured = Some(res),
                        Err(_) => warn!(
                            program,
                            pid,
                            "output pipes still open after termination; abandoning capture"
                        ),
                    }
                }
                if let Some(failure) = captured.and_then(first_failure) {
                    debug!(program, stream = %failure.stream, error = %failure.source, "capture failed during cancellation");
                }

                Err(ExecError::Cancelled {
                    program: program.to_string(),
                    cause,
                })
            }
        }
    }

    /// How long leftover output may take to drain once the leader is gone.
    fn drain_window(&self) -> Duration {
        self.grace_period.max(MIN_DRAIN_WINDOW)
    }

    /// Signal the group per `level`, escalate after the grace period, and
    /// reap the leader.
    async fn terminate(
        &self,
        child: &mut Child,
        group: &ProcessGroup,
        level: AlertLevel,
    ) -> io::Result<ExitStatus> {
        let plan = level.termination(self.grace_period);

        if let Err(e) = group.signal(plan.signal) {
            warn!(pgid = group.id(), error = %e, "failed to signal process group; killing leader only");
            child.start_kill()?;
            return child.wait().await;
        }

        if let Some(grace) = plan.grace {
            match time::timeout(grace, child.wait()).await {
                Ok(status) => {
                    // The leader is gone; make sure nothing it left behind in
                    // the group survives.
                    group.signal(Signal::SIGKILL)?;
                    return status;
                }
                Err(_) => {
                    warn!(
                        pgid = group.id(),
                        ?grace,
                        signal = %plan.signal,
                        "process group still running after grace period; escalating to SIGKILL"
                    );
                    group.signal(Signal::SIGKILL)?;
                }
            }
        }

        child.wait().await
    }
}

/// Earliest capture failure across both streams.
fn first_failure((out, err): CaptureResult) -> Option<CaptureFailure> {
    match (out.err(), err.err()) {
        (Some(a), Some(b)) => Some(if b.at < a.at { b } else { a }),
        (a, b) => a.or(b),
    }
}

fn exit_outcome(
    program: &str,
    status: ExitStatus,
    exited_at: Instant,
    failure: Option<CaptureFailure>,
) -> Result<(), ExecError> {
    let capture_error = |f: CaptureFailure| ExecError::Capture {
        program: program.to_string(),
        stream: f.stream,
        source: f.source,
    };

    match failure {
        Some(f) if f.at <= exited_at => return Err(capture_error(f)),
        Some(f) if status.success() => return Err(capture_error(f)),
        _ => {}
    }

    if status.success() {
        return Ok(());
    }

    match (status.code(), status.signal()) {
        (Some(code), _) => Err(ExecError::NonZeroExit {
            program: program.to_string(),
            code,
        }),
        (None, Some(signal)) => Err(ExecError::Signalled {
            program: program.to_string(),
            signal,
        }),
        (None, None) => Err(ExecError::NonZeroExit {
            program: program.to_string(),
            code: -1,
        }),
    }
}
