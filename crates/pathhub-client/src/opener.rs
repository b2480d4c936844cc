//! Opening a decoded path with fallbacks.
//!
//! Flow: resolve the path against the filesystem, run the file-browser
//! commands for the platform until one works, and on failure of a UNC path
//! retry once with its `\\server\share` root. Every run ends in exactly one
//! notification.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pathhub_core::{
    decode_protocol_url_with_scheme, dispatch, file_name, open_commands, resolve,
    unc_server_root, CommandRunner, DispatchOutcome, DispatchStrategy, OpenAction, PathHubError,
    PathProbe, Platform, ResolutionPlan, ShellCommand, SuccessCell,
};
use tracing::{error, info, warn};

use crate::notify::{Notification, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failure,
}

/// One executed open command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAttempt {
    pub command: ShellCommand,
    pub outcome: AttemptOutcome,
    pub error_detail: Option<String>,
}

/// Terminal state of an activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened { target: String },
    /// The UNC path failed but its share root opened.
    OpenedServerRoot { root: String },
    Failed {
        detail: String,
        server_root: Option<String>,
    },
}

/// Everything that happened during one activation.
#[derive(Debug, Clone)]
pub struct OpenReport {
    pub plan: ResolutionPlan,
    pub attempts: Vec<OpenAttempt>,
    pub outcome: OpenOutcome,
    pub notification: Notification,
}

pub struct Opener {
    runner: Arc<dyn CommandRunner>,
    notifier: Arc<dyn Notifier>,
    probe: Arc<dyn PathProbe>,
    platform: Platform,
}

impl Opener {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        notifier: Arc<dyn Notifier>,
        probe: Arc<dyn PathProbe>,
        platform: Platform,
    ) -> Self {
        Self {
            runner,
            notifier,
            probe,
            platform,
        }
    }

    /// Open `path` in the file browser and notify the user of the result.
    pub async fn open(&self, path: &str) -> OpenReport {
        let plan = resolve(path, self.probe.as_ref());
        info!(
            "Resolved {} as {:?}, opening {} ({:?})",
            plan.path, plan.classification, plan.target, plan.action
        );

        let mut attempts = Vec::new();
        let first = self
            .invoke(plan.action, &plan.target, &mut attempts)
            .await;
        let outcome = match first {
            Ok(()) => {
                info!("Opened {}", plan.target);
                OpenOutcome::Opened {
                    target: plan.target.clone(),
                }
            }
            Err(e) if plan.is_unc() => self.open_server_root(&plan, e, &mut attempts).await,
            Err(e) => {
                error!("Failed to open {}: {}", plan.target, e);
                OpenOutcome::Failed {
                    detail: e.to_string(),
                    server_root: None,
                }
            }
        };

        let notification = notification_for(&plan, &outcome);
        if let Err(e) = self.notifier.notify(&notification).await {
            warn!("Failed to show notification: {}", e);
        }

        OpenReport {
            plan,
            attempts,
            outcome,
            notification,
        }
    }

    /// Retry a failed UNC path with its share root.
    async fn open_server_root(
        &self,
        plan: &ResolutionPlan,
        error: PathHubError,
        attempts: &mut Vec<OpenAttempt>,
    ) -> OpenOutcome {
        warn!("Network path may be unreachable: {}", error);

        let root = match unc_server_root(&plan.path) {
            Some(root) if root != plan.path => root,
            root => {
                error!("No share root to fall back to for {}", plan.path);
                return OpenOutcome::Failed {
                    detail: error.to_string(),
                    server_root: root,
                };
            }
        };

        info!("Trying server root {}", root);
        match self
            .invoke(OpenAction::OpenDirectory, &root, attempts)
            .await
        {
            Ok(()) => {
                info!("Opened server root {}", root);
                OpenOutcome::OpenedServerRoot { root }
            }
            Err(fallback_error) => {
                error!("Server root fallback failed: {}", fallback_error);
                OpenOutcome::Failed {
                    detail: format!("{}; fallback: {}", error, fallback_error),
                    server_root: Some(root),
                }
            }
        }
    }

    /// Try every open command for `target` until one succeeds.
    async fn invoke(
        &self,
        action: OpenAction,
        target: &str,
        attempts: &mut Vec<OpenAttempt>,
    ) -> Result<(), PathHubError> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let strategies: Vec<Box<dyn DispatchStrategy>> =
            open_commands(self.platform, action, target)
                .into_iter()
                .map(|command| {
                    Box::new(CommandStrategy {
                        command,
                        runner: self.runner.clone(),
                        log: log.clone(),
                    }) as Box<dyn DispatchStrategy>
                })
                .collect();

        let cell = SuccessCell::new(OPEN_COOLDOWN);
        let outcome = dispatch(target, &strategies, &cell, Duration::ZERO).await;
        attempts.extend(std::mem::take(
            &mut *log.lock().expect("attempt log poisoned"),
        ));

        match outcome {
            DispatchOutcome::Succeeded { .. } | DispatchOutcome::AlreadySettled { .. } => Ok(()),
            DispatchOutcome::Exhausted { mut failures } => {
                Err(failures.pop().unwrap_or_else(|| PathHubError::Invocation {
                    command: target.to_string(),
                    reason: "no file browser command available".to_string(),
                }))
            }
        }
    }
}

/// A fresh cell is used per target, so this only guards duplicate successes
/// within one open.
const OPEN_COOLDOWN: Duration = Duration::from_secs(8);

/// One file-browser command, recording its attempt.
struct CommandStrategy {
    command: ShellCommand,
    runner: Arc<dyn CommandRunner>,
    log: Arc<Mutex<Vec<OpenAttempt>>>,
}

#[async_trait]
impl DispatchStrategy for CommandStrategy {
    fn name(&self) -> &str {
        &self.command.program
    }

    async fn attempt(&self, _target: &str, _cell: &SuccessCell) -> Result<bool, PathHubError> {
        info!("Running: {}", self.command);
        let result = self.runner.run(&self.command).await;
        let attempt = OpenAttempt {
            command: self.command.clone(),
            outcome: if result.is_ok() {
                AttemptOutcome::Success
            } else {
                AttemptOutcome::Failure
            },
            error_detail: result.as_ref().err().map(ToString::to_string),
        };
        self.log.lock().expect("attempt log poisoned").push(attempt);
        result.map(|_| true)
    }
}

fn notification_for(plan: &ResolutionPlan, outcome: &OpenOutcome) -> Notification {
    let name = file_name(&plan.path);
    match outcome {
        OpenOutcome::Opened { .. } => Notification::info(format!("Opened path:\n{}", name), 3),
        OpenOutcome::OpenedServerRoot { root } => {
            Notification::info(format!("Opened server path:\n{}", root), 5)
        }
        OpenOutcome::Failed {
            server_root: Some(root),
            ..
        } => Notification::error(
            format!("Cannot access network path:\n{}\n\nServer: {}", name, root),
            7,
        ),
        OpenOutcome::Failed { .. } => {
            Notification::error(format!("Could not open path:\n{}", name), 5)
        }
    }
}

/// Decode `url` and open the path it carries.
///
/// Fails only when the URL carries no path; nothing is run in that case.
pub async fn activate(url: &str, scheme: &str, opener: &Opener) -> Result<OpenReport, PathHubError> {
    let decoded = decode_protocol_url_with_scheme(url, scheme);
    for issue in &decoded.lossy_segments {
        warn!("Path may differ from the shared one: {}", issue);
    }

    info!("Received URL: {}", url);
    info!("Extracted path: {}", decoded.path);

    let path = decoded.path.trim();
    if path.is_empty() {
        return Err(PathHubError::Validation(
            "no file path in protocol URL".to_string(),
        ));
    }

    Ok(opener.open(path).await)
}
