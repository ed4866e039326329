// src/exec/group.rs

//! Process-group handle owned by a single run.

use std::io;

use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

/// The process group created for one launched child.
///
/// The child is spawned with `process_group(0)`, so its PID doubles as the
/// group ID and every descendant that does not create its own session shares
/// it. Until [`disarm`](Self::disarm) is called, dropping the handle sends
/// SIGKILL to the whole group.
#[derive(Debug)]
pub(crate) struct ProcessGroup {
    pgid: Pid,
    program: String,
    armed: bool,
}

impl ProcessGroup {
    pub(crate) fn from_leader(pid: u32, program: &str) -> Self {
        Self {
            pgid: Pid::from_raw(pid as i32),
            program: program.to_string(),
            armed: true,
        }
    }

    pub(crate) fn id(&self) -> i32 {
        self.pgid.as_raw()
    }

    /// Deliver `signal` to every member of the group.
    ///
    /// An empty group (ESRCH) is not an error: everything already exited.
    pub(crate) fn signal(&self, signal: Signal) -> io::Result<()> {
        match killpg(self.pgid, signal) {
            Ok(()) => {
                debug!(program = %self.program, pgid = self.id(), %signal, "signalled process group");
                Ok(())
            }
            Err(Errno::ESRCH) => Ok(()),
            Err(errno) => Err(io::Error::from(errno)),
        }
    }

    /// Called once the leader has been reaped; from then on the group is no
    /// longer killed implicitly.
    pub(crate) fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.signal(Signal::SIGKILL) {
            warn!(
                program = %self.program,
                pgid = self.id(),
                error = %e,
                "failed to kill process group on drop"
            );
        }
    }
}
