// src/config/validate.rs

use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{CommandSpec, ExecSection, PlanFile, RawPlanFile, RunnerSection, RunnerSettings};
use crate::errors::{ProcrunError, Result};
use crate::exec::{default_shell, Command, Executable, Script, SequentialCommands, DEFAULT_GRACE_PERIOD};

impl TryFrom<RawPlanFile> for PlanFile {
    type Error = ProcrunError;

    fn try_from(raw: RawPlanFile) -> std::result::Result<Self, Self::Error> {
        let runner = validate_runner(&raw.runner)?;
        let exec = validate_exec(raw.exec)?;
        Ok(PlanFile { runner, exec })
    }
}

fn validate_runner(section: &RunnerSection) -> Result<RunnerSettings> {
    let grace_period = match section.grace_period.as_deref() {
        Some(s) => parse_field("[runner].grace_period", s)?,
        None => DEFAULT_GRACE_PERIOD,
    };

    let timeout = match section.timeout.as_deref() {
        Some(s) => {
            let timeout = parse_field("[runner].timeout", s)?;
            if timeout.is_zero() {
                return Err(ProcrunError::ConfigError(
                    "[runner].timeout must be greater than zero".to_string(),
                ));
            }
            Some(timeout)
        }
        None => None,
    };

    Ok(RunnerSettings {
        grace_period,
        timeout,
    })
}

fn parse_field(field: &str, value: &str) -> Result<Duration> {
    parse_duration(value).map_err(|e| ProcrunError::ConfigError(format!("{field}: {e}")))
}

fn validate_exec(section: ExecSection) -> Result<Executable> {
    match section {
        ExecSection::Command(spec) => Ok(to_command(spec, "[exec]")?.into()),

        ExecSection::Sequence { commands } => {
            let sequence = commands
                .into_iter()
                .enumerate()
                .map(|(i, spec)| to_command(spec, &format!("[[exec.commands]] #{}", i + 1)))
                .collect::<Result<SequentialCommands>>()?;
            Ok(sequence.into())
        }

        ExecSection::Script {
            shell,
            level,
            source,
        } => {
            let shell = match shell {
                Some(shell) if shell.trim().is_empty() => {
                    return Err(ProcrunError::ConfigError(
                        "[exec].shell must not be empty".to_string(),
                    ));
                }
                Some(shell) => shell,
                None => default_shell(),
            };
            Ok(Script::new(shell, source).with_level(level).into())
        }
    }
}

fn to_command(spec: CommandSpec, location: &str) -> Result<Command> {
    if spec.name.trim().is_empty() {
        return Err(ProcrunError::ConfigError(format!(
            "{location}: command `name` must not be empty"
        )));
    }
    Ok(Command::new(spec.name).args(spec.args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_plan;
    use crate::exec::AlertLevel;

    #[test]
    fn script_plan_with_defaults() -> Result<()> {
        let plan = parse_plan(
            r#"
            [exec]
            type = "script"
            shell = "/bin/bash"
            source = "echo hi"
            "#,
        )?;

        assert_eq!(plan.runner.grace_period, DEFAULT_GRACE_PERIOD);
        assert_eq!(plan.runner.timeout, None);
        match plan.exec {
            Executable::Script(script) => {
                assert_eq!(script.shell(), "/bin/bash");
                assert_eq!(script.level(), AlertLevel::Calm);
                assert_eq!(script.source(), "echo hi");
            }
            other => panic!("expected script, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn sequence_plan_keeps_order() -> Result<()> {
        let plan = parse_plan(
            r#"
            [runner]
            grace_period = "100ms"
            timeout = "5s"

            [exec]
            type = "sequence"

            [[exec.commands]]
            name = "echo"
            args = ["one"]

            [[exec.commands]]
            name = "true"
            "#,
        )?;

        assert_eq!(plan.runner.grace_period, Duration::from_millis(100));
        assert_eq!(plan.runner.timeout, Some(Duration::from_secs(5)));
        match plan.exec {
            Executable::Sequence(seq) => {
                let names: Vec<&str> = seq.commands().iter().map(Command::name).collect();
                assert_eq!(names, vec!["echo", "true"]);
                assert_eq!(seq.commands()[0].arguments(), ["one".to_string()]);
                assert!(seq.commands()[1].arguments().is_empty());
            }
            other => panic!("expected sequence, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn rejects_empty_command_name() {
        let err = parse_plan(
            r#"
            [exec]
            type = "sequence"

            [[exec.commands]]
            name = "echo"

            [[exec.commands]]
            name = " "
            "#,
        )
        .expect_err("empty name must be rejected");
        assert!(err.to_string().contains("#2"), "unexpected error: {err}");
    }

    #[test]
    fn rejects_zero_timeout_and_bad_durations() {
        let zero = parse_plan(
            r#"
            [runner]
            timeout = "0s"
            [exec]
            type = "command"
            name = "true"
            "#,
        );
        assert!(matches!(zero, Err(ProcrunError::ConfigError(_))));

        let bad = parse_plan(
            r#"
            [runner]
            grace_period = "soon"
            [exec]
            type = "command"
            name = "true"
            "#,
        );
        assert!(matches!(bad, Err(ProcrunError::ConfigError(_))));
    }

    #[test]
    fn unknown_exec_type_is_a_toml_error() {
        let err = parse_plan(
            r#"
            [exec]
            type = "daemon"
            "#,
        );
        assert!(matches!(err, Err(ProcrunError::TomlError(_))));
    }

    #[test]
    fn red_alias_parses() -> Result<()> {
        let plan = parse_plan(
            r#"
            [exec]
            type = "script"
            level = "red"
            source = "sleep 1"
            "#,
        )?;
        match plan.exec {
            Executable::Script(script) => assert_eq!(script.level(), AlertLevel::RedAlert),
            other => panic!("expected script, got {other:?}"),
        }
        Ok(())
    }
}
