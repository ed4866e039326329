// src/exec/alert.rs

//! Alert levels: how forcefully a process group is stopped on cancellation.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use nix::sys::signal::Signal;
use serde::Deserialize;

/// Severity tier applied when the execution context is cancelled.
///
/// The default is the mildest level, so an unconfigured script is always
/// given a chance to exit on its own before it is force-killed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// SIGINT, then SIGKILL after the full grace period.
    #[default]
    Calm,
    /// SIGTERM, then SIGKILL after half the grace period.
    #[serde(alias = "yellow", alias = "yellowalert")]
    YellowAlert,
    /// SIGKILL straight away.
    #[serde(alias = "red", alias = "redalert")]
    RedAlert,
}

impl AlertLevel {
    /// Resolve the signal sequence for this level given the runner's grace
    /// period.
    pub fn termination(self, grace_period: Duration) -> Termination {
        match self {
            AlertLevel::Calm => Termination {
                signal: Signal::SIGINT,
                grace: Some(grace_period),
            },
            AlertLevel::YellowAlert => Termination {
                signal: Signal::SIGTERM,
                grace: Some(grace_period / 2),
            },
            AlertLevel::RedAlert => Termination {
                signal: Signal::SIGKILL,
                grace: None,
            },
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertLevel::Calm => "calm",
            AlertLevel::YellowAlert => "yellow_alert",
            AlertLevel::RedAlert => "red_alert",
        };
        f.write_str(s)
    }
}

impl FromStr for AlertLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "calm" => Ok(AlertLevel::Calm),
            "yellow" | "yellow_alert" | "yellowalert" => Ok(AlertLevel::YellowAlert),
            "red" | "red_alert" | "redalert" => Ok(AlertLevel::RedAlert),
            other => Err(format!(
                "invalid alert level: {other} (expected \"calm\", \"yellow\" or \"red\")"
            )),
        }
    }
}

/// Concrete termination steps derived from an [`AlertLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Termination {
    /// First signal delivered to the process group.
    pub signal: Signal,
    /// How long to wait for the leader to exit before escalating to SIGKILL.
    /// `None` when `signal` is already SIGKILL.
    pub grace: Option<Duration>,
}

impl Termination {
    /// Time from cancellation until SIGKILL is guaranteed to have been sent.
    pub fn force_kill_after(&self) -> Duration {
        self.grace.unwrap_or(Duration::ZERO)
    }
}
