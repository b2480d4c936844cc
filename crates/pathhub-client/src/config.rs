use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Configuration for the protocol helper.
#[derive(Parser, Debug, Clone)]
#[command(name = "pathhub-client")]
#[command(about = "Opens pathhub:// links in the native file browser")]
pub struct Config {
    /// Protocol URL passed by the OS, e.g. pathhub://C%3A%5CUsers%5CDocuments
    pub url: Option<String>,

    /// Mark this activation as triggered automatically by the share page
    #[arg(long)]
    pub auto: bool,

    /// Set by the share page when it triggers the link automatically
    #[arg(long, env = "BROWSER_AUTO_EXECUTION", hide = true)]
    pub browser_auto_execution: bool,

    /// URL scheme the helper is registered for
    #[arg(long, default_value = pathhub_core::SCHEME, env = "PATHHUB_SCHEME")]
    pub scheme: String,

    /// Timeout for each file-browser command (seconds)
    #[arg(long, default_value = "10", env = "PATHHUB_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    /// Append-only log file (defaults to the local data directory)
    #[arg(long, env = "PATHHUB_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log outcomes instead of showing desktop notifications
    #[arg(long, env = "PATHHUB_NO_NOTIFY")]
    pub no_notify: bool,
}

impl Config {
    /// Auto-execution only changes logging, never resolution.
    pub fn is_auto_execution(&self) -> bool {
        self.auto
            || self.browser_auto_execution
            || self
                .url
                .as_deref()
                .is_some_and(|url| url.contains("auto=true"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.log_file.clone().or_else(default_log_file)
    }
}

/// `<local data dir>/pathhub/pathhub-client.log`
pub fn default_log_file() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("pathhub").join("pathhub-client.log"))
}

/// Configuration for the protocol registration tool.
#[derive(Parser, Debug, Clone)]
#[command(name = "pathhub-install")]
#[command(about = "Registers the pathhub:// protocol handler for the current user (Windows)")]
pub struct InstallConfig {
    /// Remove the registration instead of creating it
    #[arg(long)]
    pub uninstall: bool,

    /// URL scheme to register
    #[arg(long, default_value = pathhub_core::SCHEME)]
    pub scheme: String,

    /// Helper executable (defaults to pathhub-client next to this tool)
    #[arg(long)]
    pub exe: Option<PathBuf>,
}
