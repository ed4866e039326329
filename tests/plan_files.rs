// tests/plan_files.rs
mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use procrun::config::load_and_validate;
use procrun::exec::{AlertLevel, CancelCause, Executable};
use procrun::run_with_settings;

type TestResult = Result<(), Box<dyn Error>>;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

#[tokio::test]
async fn echo_sequence_demo_runs_both_steps() -> TestResult {
    init_tracing();

    let plan = load_and_validate(demo("echo-sequence.toml"))?;
    assert_eq!(plan.runner.grace_period, Duration::from_secs(1));
    assert_eq!(plan.runner.timeout, None);
    assert!(matches!(plan.exec, Executable::Sequence(ref s) if s.len() == 2));

    let mut out = Vec::new();
    let mut err = Vec::new();
    run_with_settings(&plan.exec, &plan.runner, &mut out, &mut err).await?;

    assert_eq!(String::from_utf8(out)?, "New Login\nsecond step\n");
    Ok(())
}

#[tokio::test]
async fn deadline_script_demo_is_cancelled() -> TestResult {
    init_tracing();

    let plan = load_and_validate(demo("deadline-script.toml"))?;
    assert_eq!(plan.runner.timeout, Some(Duration::from_millis(200)));
    match &plan.exec {
        Executable::Script(script) => {
            assert_eq!(script.level(), AlertLevel::RedAlert);
            assert_eq!(script.shell(), "/bin/bash");
            assert!(script.source().contains("sleep 10"));
        }
        other => panic!("expected script, got {other:?}"),
    }

    let mut out = Vec::new();
    let mut err = Vec::new();
    let result = run_with_settings(&plan.exec, &plan.runner, &mut out, &mut err).await;

    let err = result.expect_err("script must hit its deadline");
    assert_eq!(err.cancel_cause(), Some(CancelCause::DeadlineExceeded));
    Ok(())
}

#[test]
fn single_command_demo_describes_itself() -> TestResult {
    init_tracing();

    let plan = load_and_validate(demo("single-command.toml"))?;
    assert_eq!(plan.exec.describe(), "command: echo \"hello from procrun\"");
    assert_eq!(plan.exec.program(), Some("echo"));
    Ok(())
}

#[test]
fn missing_plan_file_is_an_io_error() {
    init_tracing();

    let err = load_and_validate(demo("does-not-exist.toml")).expect_err("missing file");
    assert!(matches!(err, procrun::errors::ProcrunError::IoError(_)));
}
