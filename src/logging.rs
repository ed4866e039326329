// src/logging.rs

//! Logging setup for `procrun` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `PROCRUN_LOG` environment variable, either a bare level ("debug",
//!    "warning") or `EnvFilter` directives ("warn,procrun::exec=trace")
//! 3. default to `info`
//!
//! Logs are sent to STDERR so that stdout carries only the child's output.
//! Colours are only used when STDERR is a terminal.

use std::io::IsTerminal;

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "PROCRUN_LOG";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let (filter, rejected) = build_filter(cli_level, env.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    if let Some(value) = rejected {
        tracing::warn!(env = LOG_ENV, %value, "ignoring unrecognised log filter; using info");
    }

    Ok(())
}

/// Resolve the filter, returning the env value too when it was unusable.
fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> (EnvFilter, Option<String>) {
    if let Some(lvl) = cli_level {
        return (EnvFilter::default().add_directive(level_from_log_level(lvl).into()), None);
    }

    let Some(raw) = env.map(str::trim).filter(|s| !s.is_empty()) else {
        return (info_filter(), None);
    };

    if let Some(level) = parse_level_str(raw) {
        return (EnvFilter::default().add_directive(level.into()), None);
    }

    // A lone word that is not a level would parse as a target name and
    // silently filter everything else out.
    if raw.contains('=') || raw.contains(',') {
        if let Ok(filter) = EnvFilter::try_new(raw) {
            return (filter, None);
        }
    }

    (info_filter(), Some(raw.to_string()))
}

fn info_filter() -> EnvFilter {
    EnvFilter::default().add_directive(LevelFilter::INFO.into())
}

fn level_from_log_level(lvl: LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<LevelFilter> {
    match s.trim().to_lowercase().as_str() {
        "off" => Some(LevelFilter::OFF),
        "error" => Some(LevelFilter::ERROR),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_level_strings() {
        assert_eq!(parse_level_str(" Debug "), Some(LevelFilter::DEBUG));
        assert_eq!(parse_level_str("warning"), Some(LevelFilter::WARN));
        assert_eq!(parse_level_str("loud"), None);
    }

    #[test]
    fn cli_flag_beats_env() {
        let (filter, rejected) = build_filter(Some(LogLevel::Trace), Some("error"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
        assert_eq!(rejected, None);
    }

    #[test]
    fn env_accepts_levels_and_directives() {
        let (filter, _) = build_filter(None, Some("warning"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));

        let (filter, rejected) = build_filter(None, Some("warn,procrun::exec=trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
        assert_eq!(rejected, None);
    }

    #[test]
    fn unknown_env_word_falls_back_to_info() {
        let (filter, rejected) = build_filter(None, Some("loud"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(rejected.as_deref(), Some("loud"));

        let (filter, rejected) = build_filter(None, Some("   "));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(rejected, None);
    }
}
