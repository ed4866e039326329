// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;

use std::fs;

use tracing::{debug, info};

use crate::cli::{CliArgs, CliCommand, ScriptArgs};
use crate::config::{load_and_validate, PlanFile, RunnerSettings};
use crate::errors::Result;
use crate::exec::{default_shell, Command, ExecContext, Executable, Script, DEFAULT_GRACE_PERIOD};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - plan loading (or building an executable from CLI arguments)
/// - the execution context (timeout + Ctrl-C)
/// - the process runner, writing to this process's stdout/stderr
pub async fn run(args: CliArgs) -> Result<()> {
    let Some(plan) = resolve_plan(&args)? else {
        return Ok(());
    };

    let runner = plan.runner.runner();
    let ctx = plan.runner.context();

    // Ctrl-C → explicit cancel.
    {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl+C received; cancelling");
            ctx.cancel();
        });
    }

    info!(
        program = plan.exec.program().unwrap_or("<none>"),
        grace_period = ?runner.grace_period(),
        timeout = ?plan.runner.timeout,
        "running"
    );

    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();
    plan.exec
        .exec_with(&runner, &ctx, &mut stdout, &mut stderr)
        .await?;

    debug!("run finished successfully");
    Ok(())
}

/// Turn CLI arguments into a validated plan. `None` means there is nothing
/// left to do (dry run).
fn resolve_plan(args: &CliArgs) -> Result<Option<PlanFile>> {
    let plan = match &args.command {
        CliCommand::Cmd { program, args: argv } => PlanFile {
            runner: default_settings(),
            exec: Command::new(program.clone()).args(argv.iter().cloned()).into(),
        },
        CliCommand::Script(script) => PlanFile {
            runner: default_settings(),
            exec: script_from_args(script)?,
        },
        CliCommand::Plan { path, dry_run } => {
            let plan = apply_overrides(load_and_validate(path)?, args);
            if *dry_run {
                print_dry_run(&plan);
                return Ok(None);
            }
            return Ok(Some(plan));
        }
    };

    Ok(Some(apply_overrides(plan, args)))
}

fn default_settings() -> RunnerSettings {
    RunnerSettings {
        grace_period: DEFAULT_GRACE_PERIOD,
        timeout: None,
    }
}

fn apply_overrides(mut plan: PlanFile, args: &CliArgs) -> PlanFile {
    if let Some(timeout) = args.timeout {
        plan.runner.timeout = Some(timeout);
    }
    if let Some(grace) = args.grace_period {
        plan.runner.grace_period = grace;
    }
    plan
}

fn script_from_args(args: &ScriptArgs) -> Result<Executable> {
    let source = match (&args.source, &args.file) {
        (Some(source), _) => source.clone(),
        (None, Some(file)) => fs::read_to_string(file)?,
        (None, None) => String::new(),
    };
    let shell = args.shell.clone().unwrap_or_else(default_shell);
    Ok(Script::new(shell, source).with_level(args.level).into())
}

/// Simple dry-run output: print runner settings and what would execute.
fn print_dry_run(plan: &PlanFile) {
    println!("procrun dry-run");
    println!("  runner.grace_period = {:?}", plan.runner.grace_period);
    match plan.runner.timeout {
        Some(timeout) => println!("  runner.timeout = {timeout:?}"),
        None => println!("  runner.timeout = none"),
    }
    println!();
    println!("{}", plan.exec.describe());

    debug!("dry-run complete (no execution)");
}

/// Run `exec` once under a fresh context derived from `settings`.
///
/// Convenience for embedding callers that already hold an [`Executable`].
pub async fn run_with_settings<O, E>(
    exec: &Executable,
    settings: &RunnerSettings,
    stdout: &mut O,
    stderr: &mut E,
) -> std::result::Result<(), exec::ExecError>
where
    O: tokio::io::AsyncWrite + Unpin + ?Sized,
    E: tokio::io::AsyncWrite + Unpin + ?Sized,
{
    let ctx: ExecContext = settings.context();
    exec.exec_with(&settings.runner(), &ctx, stdout, stderr).await
}
