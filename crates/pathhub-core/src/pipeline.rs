//! Ordered execution of external commands with early exit.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::command::ShellCommand;
use crate::error::PathHubError;

/// Captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Executes external commands.
///
/// A non-zero exit status, a spawn failure or a timeout is an `Err`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &ShellCommand) -> Result<CommandOutput, PathHubError>;
}

/// Outcome of one executed pipeline step.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Zero-based position in the submitted command list
    pub index: usize,
    pub command: ShellCommand,
    pub outcome: Result<CommandOutput, PathHubError>,
}

impl StepResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Stderr of a successful step, if it printed anything.
    pub fn warning(&self) -> Option<&str> {
        match &self.outcome {
            Ok(output) if !output.stderr.trim().is_empty() => Some(output.stderr.trim()),
            _ => None,
        }
    }
}

/// Result of a sequential run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Executed steps only; commands after a failure are absent.
    pub steps: Vec<StepResult>,
    pub total: usize,
}

impl PipelineReport {
    /// Every submitted command ran and succeeded.
    pub fn is_complete(&self) -> bool {
        self.steps.len() == self.total && self.steps.iter().all(StepResult::is_success)
    }

    pub fn failure(&self) -> Option<&StepResult> {
        self.steps.iter().find(|step| !step.is_success())
    }
}

/// Run `commands` in order, stopping at the first failure.
pub async fn run_sequential(
    commands: &[ShellCommand],
    runner: &dyn CommandRunner,
) -> PipelineReport {
    let mut steps = Vec::with_capacity(commands.len());

    for (index, command) in commands.iter().enumerate() {
        debug!("Running step {}/{}: {}", index + 1, commands.len(), command);
        let outcome = runner.run(command).await;
        let failed = outcome.is_err();
        if let Err(e) = &outcome {
            warn!("Step {}/{} failed: {}", index + 1, commands.len(), e);
        }

        steps.push(StepResult {
            index,
            command: command.clone(),
            outcome,
        });

        if failed {
            break;
        }
    }

    PipelineReport {
        steps,
        total: commands.len(),
    }
}
