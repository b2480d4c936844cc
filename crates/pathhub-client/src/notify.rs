//! User-visible notifications for activation outcomes.

use std::sync::Arc;

use async_trait::async_trait;
use pathhub_core::{CommandRunner, PathHubError, Platform, ShellCommand};
use tracing::{error, info};

const TITLE_VAR: &str = "PATHHUB_NOTIFY_TITLE";
const MESSAGE_VAR: &str = "PATHHUB_NOTIFY_MESSAGE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// A desktop notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub level: NotificationLevel,
    /// How long the notification stays visible
    pub timeout_secs: u32,
    pub sound: bool,
}

impl Notification {
    pub fn info(message: impl Into<String>, timeout_secs: u32) -> Self {
        Self {
            title: "PathHub".to_string(),
            message: message.into(),
            level: NotificationLevel::Info,
            timeout_secs,
            sound: false,
        }
    }

    pub fn error(message: impl Into<String>, timeout_secs: u32) -> Self {
        Self {
            title: "PathHub Error".to_string(),
            message: message.into(),
            level: NotificationLevel::Error,
            timeout_secs,
            sound: true,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), PathHubError>;
}

/// Writes notifications to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), PathHubError> {
        match notification.level {
            NotificationLevel::Info => info!("{}: {}", notification.title, notification.message),
            NotificationLevel::Error => error!("{}: {}", notification.title, notification.message),
        }
        Ok(())
    }
}

/// Shows notifications through the platform's notification tool.
pub struct DesktopNotifier {
    runner: Arc<dyn CommandRunner>,
    platform: Platform,
}

impl DesktopNotifier {
    pub fn new(runner: Arc<dyn CommandRunner>, platform: Platform) -> Self {
        Self { runner, platform }
    }

    /// Command that displays `notification` on `platform`.
    pub fn command(platform: Platform, notification: &Notification) -> ShellCommand {
        match platform {
            Platform::Windows => ShellCommand::new("powershell")
                .args([
                    "-NoProfile".to_string(),
                    "-NonInteractive".to_string(),
                    "-Command".to_string(),
                    balloon_script(notification),
                ])
                .env(TITLE_VAR, notification.title.as_str())
                .env(MESSAGE_VAR, notification.message.as_str()),
            Platform::MacOs => {
                let sound = if notification.sound {
                    " sound name \"Basso\""
                } else {
                    ""
                };
                ShellCommand::new("osascript").args([
                    "-e".to_string(),
                    "on run argv".to_string(),
                    "-e".to_string(),
                    format!(
                        "display notification (item 2 of argv) with title (item 1 of argv){}",
                        sound
                    ),
                    "-e".to_string(),
                    "end run".to_string(),
                    notification.title.clone(),
                    notification.message.clone(),
                ])
            }
            Platform::Unix => {
                let urgency = match notification.level {
                    NotificationLevel::Info => "normal",
                    NotificationLevel::Error => "critical",
                };
                ShellCommand::new("notify-send").args([
                    format!("--urgency={}", urgency),
                    format!("--expire-time={}", notification.timeout_secs * 1000),
                    "--".to_string(),
                    notification.title.clone(),
                    notification.message.clone(),
                ])
            }
        }
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), PathHubError> {
        LogNotifier.notify(notification).await?;
        let command = Self::command(self.platform, notification);
        self.runner.run(&command).await.map(|_| ())
    }
}

/// Tray balloon via Windows Forms; stays up for the notification timeout.
///
/// Title and message are read from the environment, so no notification text
/// is ever part of the script.
fn balloon_script(notification: &Notification) -> String {
    let icon = match notification.level {
        NotificationLevel::Info => ("Information", "Info"),
        NotificationLevel::Error => ("Error", "Error"),
    };
    let sound = if notification.sound {
        "[System.Media.SystemSounds]::Exclamation.Play(); "
    } else {
        ""
    };
    format!(
        "Add-Type -AssemblyName System.Windows.Forms; Add-Type -AssemblyName System.Drawing; \
         $n = New-Object System.Windows.Forms.NotifyIcon; \
         $n.Icon = [System.Drawing.SystemIcons]::{}; \
         $n.BalloonTipIcon = '{}'; \
         $n.BalloonTipTitle = $env:{}; \
         $n.BalloonTipText = $env:{}; \
         $n.Visible = $true; {}\
         $n.ShowBalloonTip({}); \
         Start-Sleep -Seconds {}; \
         $n.Dispose()",
        icon.0,
        icon.1,
        TITLE_VAR,
        MESSAGE_VAR,
        sound,
        notification.timeout_secs * 1000,
        notification.timeout_secs
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_text_is_passed_through_environment() {
        let message = "Opened path:\nx’;Start-Process calc;’ it's ‘here‛ & ‚there‚";
        let notification = Notification::info(message, 3);
        let command = DesktopNotifier::command(Platform::Windows, &notification);

        assert_eq!(command.program, "powershell");
        let script = command.args.last().unwrap();
        assert!(!script.contains("Start-Process"));
        assert!(!script.contains("Opened path"));
        assert!(!script.contains("PathHub'"));
        assert!(script.contains("$n.BalloonTipText = $env:PATHHUB_NOTIFY_MESSAGE;"));
        assert!(script.contains("ShowBalloonTip(3000)"));
        assert!(!script.contains("SystemSounds"));
        assert_eq!(
            command.env,
            vec![
                ("PATHHUB_NOTIFY_TITLE".to_string(), "PathHub".to_string()),
                ("PATHHUB_NOTIFY_MESSAGE".to_string(), message.to_string()),
            ]
        );
    }

    #[test]
    fn test_macos_text_is_passed_as_arguments() {
        let notification = Notification::error("C:\\Users \"x\" end run", 5);
        let command = DesktopNotifier::command(Platform::MacOs, &notification);
        assert_eq!(command.program, "osascript");
        assert_eq!(
            command.args[3],
            "display notification (item 2 of argv) with title (item 1 of argv) sound name \"Basso\""
        );
        assert_eq!(command.args[6], "PathHub Error");
        assert_eq!(command.args[7], "C:\\Users \"x\" end run");
    }

    #[test]
    fn test_unix_uses_notify_send() {
        let notification = Notification::error("boom", 7);
        let command = DesktopNotifier::command(Platform::Unix, &notification);
        assert_eq!(
            command.args,
            vec!["--urgency=critical", "--expire-time=7000", "--", "PathHub Error", "boom"]
        );
    }

    #[test]
    fn test_unix_option_like_message_stays_text() {
        let notification = Notification::info("--help", 3);
        let command = DesktopNotifier::command(Platform::Unix, &notification);
        assert_eq!(command.args[2], "--");
        assert_eq!(command.args.last().map(String::as_str), Some("--help"));
    }
}
