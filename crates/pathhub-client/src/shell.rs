use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use pathhub_core::{CommandOutput, CommandRunner, PathHubError, ShellCommand};
use tracing::{debug, instrument};

/// Do not flash a console window for helper commands.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Runs commands with `tokio::process`, killing them after `timeout`.
#[derive(Debug, Clone)]
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    #[instrument(skip_all, fields(command = %command), level = "debug")]
    async fn run(&self, command: &ShellCommand) -> Result<CommandOutput, PathHubError> {
        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args)
            .envs(command.env.iter().map(|(key, value)| (key, value)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        let child = cmd.spawn().map_err(|e| PathHubError::Invocation {
            command: command.to_string(),
            reason: format!("failed to start: {}", e),
        })?;

        // Dropping the child on timeout kills it (kill_on_drop).
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| PathHubError::Invocation {
                command: command.to_string(),
                reason: e.to_string(),
            })?,
            Err(_) => {
                return Err(PathHubError::TimedOut {
                    command: command.to_string(),
                    secs: self.timeout.as_secs(),
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        debug!("Command exited with {}", output.status);

        if !output.status.success() && command.ignore_exit_status {
            debug!("Ignoring exit status of {}", command.program);
        } else if !output.status.success() {
            let reason = if stderr.trim().is_empty() {
                output.status.to_string()
            } else {
                format!("{}: {}", output.status, stderr.trim())
            };
            return Err(PathHubError::Invocation {
                command: command.to_string(),
                reason,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn runner() -> TokioCommandRunner {
        TokioCommandRunner::new(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_captures_stdout() {
        let output = runner()
            .run(&ShellCommand::new("echo").arg("hello"))
            .await
            .unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_error() {
        let result = runner().run(&ShellCommand::new("false")).await;
        assert!(matches!(result, Err(PathHubError::Invocation { .. })));
    }

    #[tokio::test]
    async fn test_missing_program_is_error() {
        let result = runner()
            .run(&ShellCommand::new("pathhub-definitely-missing-program"))
            .await;
        match result {
            Err(PathHubError::Invocation { reason, .. }) => assert!(reason.contains("failed to start")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ignored_exit_status_is_success() {
        let result = runner()
            .run(&ShellCommand::new("false").ignore_exit_status())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_env_reaches_child() {
        let command = ShellCommand::new("sh")
            .args(["-c", "printf '%s' \"$PATHHUB_TEST_MESSAGE\""])
            .env("PATHHUB_TEST_MESSAGE", "x’;echo injected;’ & y");
        let output = runner().run(&command).await.unwrap();
        assert_eq!(output.stdout, "x’;echo injected;’ & y");
    }

    #[tokio::test]
    async fn test_slow_command_times_out() {
        let runner = TokioCommandRunner::new(Duration::from_millis(200));
        let result = runner.run(&ShellCommand::new("sleep").arg("5")).await;
        assert!(matches!(result, Err(PathHubError::TimedOut { .. })));
    }
}
