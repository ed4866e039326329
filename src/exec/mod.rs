// src/exec/mod.rs

//! Process execution layer.
//!
//! This module maps an [`Executable`] onto one or more OS processes using
//! `tokio::process::Command`, forwards their output into caller-supplied
//! sinks, and tears the process group down when the [`ExecContext`] is
//! cancelled or its deadline passes.
//!
//! - [`alert`] defines [`AlertLevel`] and the signal plan derived from it.
//! - [`context`] is the cancellable execution context.
//! - [`command`], [`sequence`] and [`script`] are the things that can run;
//!   [`executable`] is the closed enum over them.
//! - [`runner`] owns the launch / capture / cancel state machine.
//! - [`capture`] drains a child pipe into a sink.
//! - [`group`] wraps the per-run process group handle.

pub mod alert;
pub mod capture;
pub mod command;
pub mod context;
pub mod error;
pub mod executable;
mod group;
pub mod runner;
pub mod script;
pub mod sequence;

pub use alert::{AlertLevel, Termination};
pub use capture::Stream;
pub use command::Command;
pub use context::{CancelCause, ExecContext};
pub use error::ExecError;
pub use executable::Executable;
pub use runner::{ProcessRunner, DEFAULT_GRACE_PERIOD};
pub use script::{default_shell, Script};
pub use sequence::SequentialCommands;
