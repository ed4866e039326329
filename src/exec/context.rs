// src/exec/context.rs

//! Cancellable execution context.
//!
//! An [`ExecContext`] is the single source of truth for whether a running
//! process should be torn down. It combines an explicit cancellation token
//! with an optional deadline, and remembers which of the two fired so the
//! returned error can tell a timeout apart from a deliberate cancel.

use std::fmt;
use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

/// Why an execution context is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelCause {
    /// [`ExecContext::cancel`] was called (on this context or a parent).
    Cancelled,
    /// The context's deadline elapsed.
    DeadlineExceeded,
}

impl fmt::Display for CancelCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelCause::Cancelled => f.write_str("context cancelled"),
            CancelCause::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// Handle passed to every `exec` call.
///
/// Cloning is cheap; clones share the same cancellation state.
#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ExecContext {
    /// A context that is only ever done when explicitly cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context whose deadline is `now + timeout`. A timeout too large to
    /// represent as an instant means no deadline at all.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Derive a context that is cancelled whenever `self` is, but can also be
    /// cancelled on its own without affecting the parent.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Like [`child`](Self::child), with a deadline no later than
    /// `now + timeout`.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let deadline = match (self.deadline, Instant::now().checked_add(timeout)) {
            (Some(parent), Some(candidate)) => Some(parent.min(candidate)),
            (parent, candidate) => parent.or(candidate),
        };
        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    /// Request cancellation. Calling this more than once has no further
    /// effect.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Non-blocking check: `Some(cause)` once the context is done.
    ///
    /// An explicit cancel is reported in preference to an elapsed deadline.
    pub fn err(&self) -> Option<CancelCause> {
        if self.token.is_cancelled() {
            return Some(CancelCause::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelCause::DeadlineExceeded),
            _ => None,
        }
    }

    /// Wait until the context is done and report why.
    pub async fn done(&self) -> CancelCause {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => CancelCause::Cancelled,
                    _ = time::sleep_until(deadline) => CancelCause::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                CancelCause::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn deadline_reports_deadline_exceeded() {
        let ctx = ExecContext::with_timeout(Duration::from_millis(50));
        assert_eq!(ctx.err(), None);
        assert_eq!(ctx.done().await, CancelCause::DeadlineExceeded);
        assert_eq!(ctx.err(), Some(CancelCause::DeadlineExceeded));
    }

    #[tokio::test]
    async fn explicit_cancel_reports_cancelled() {
        let ctx = ExecContext::with_timeout(Duration::from_secs(60));
        ctx.cancel();
        ctx.cancel();
        assert_eq!(ctx.done().await, CancelCause::Cancelled);
        assert_eq!(ctx.err(), Some(CancelCause::Cancelled));
    }

    #[tokio::test]
    async fn parent_cancel_reaches_child_but_not_back() {
        let parent = ExecContext::background();
        let child = parent.child();
        let sibling = parent.child();

        sibling.cancel();
        assert_eq!(parent.err(), None);
        assert_eq!(child.err(), None);

        parent.cancel();
        assert_eq!(child.done().await, CancelCause::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn child_keeps_earlier_parent_deadline() {
        let parent = ExecContext::with_timeout(Duration::from_millis(10));
        let child = parent.child_with_timeout(Duration::from_secs(30));
        assert_eq!(child.deadline(), parent.deadline());

        let tighter = parent.child_with_timeout(Duration::from_millis(1));
        assert!(tighter.deadline() < parent.deadline());
    }

    #[test]
    fn unrepresentable_timeout_means_no_deadline() {
        let huge = Duration::from_secs(u64::MAX);

        let ctx = ExecContext::with_timeout(huge);
        assert_eq!(ctx.deadline(), None);
        assert_eq!(ctx.err(), None);

        let child = ctx.child_with_timeout(huge);
        assert_eq!(child.deadline(), None);

        let bounded = ExecContext::with_timeout(Duration::from_secs(60));
        assert_eq!(bounded.child_with_timeout(huge).deadline(), bounded.deadline());
    }
}
