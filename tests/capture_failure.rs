// tests/capture_failure.rs
mod common;
use crate::common::init_tracing;

use std::time::Duration;

use procrun::exec::{Command, ExecContext, ExecError, Script, Stream};
use procrun_test_utils::FailingSink;

#[tokio::test]
async fn failing_stdout_sink_is_reported() {
    init_tracing();

    let cmd = Command::new("echo").arg("hello");
    let mut out = FailingSink;
    let mut err = Vec::new();
    let result = cmd.exec(&ExecContext::background(), &mut out, &mut err).await;

    match result {
        Err(ExecError::Capture { stream, .. }) => assert_eq!(stream, Stream::Stdout),
        other => panic!("expected Capture, got {other:?}"),
    }
}

#[tokio::test]
async fn failing_stderr_sink_keeps_stdout() {
    init_tracing();

    let cmd = Command::new("sh").args(["-c", "echo out; echo err >&2"]);
    let mut out = Vec::new();
    let mut err = FailingSink;
    let result = cmd.exec(&ExecContext::background(), &mut out, &mut err).await;

    match result {
        Err(ExecError::Capture { stream, .. }) => assert_eq!(stream, Stream::Stderr),
        other => panic!("expected Capture, got {other:?}"),
    }
    assert_eq!(String::from_utf8_lossy(&out), "out\n");
}

/// A writer that keeps producing output must not hang once its sink fails:
/// the pipe is closed and the writer sees EPIPE.
#[tokio::test]
async fn failed_capture_does_not_block_a_chatty_child() {
    init_tracing();

    let script = Script::new("/bin/sh", "while :; do echo spam; done");
    let ctx = ExecContext::with_timeout(Duration::from_secs(20));
    let mut out = FailingSink;
    let mut err = Vec::new();
    let result = script.exec(&ctx, &mut out, &mut err).await;

    match result {
        Err(ExecError::Capture { stream, .. }) => assert_eq!(stream, Stream::Stdout),
        other => panic!("expected Capture, got {other:?}"),
    }
}
