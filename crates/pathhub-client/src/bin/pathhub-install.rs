//! Registers (or removes) the `pathhub://` protocol handler for the current
//! Windows user.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use pathhub_client::config::InstallConfig;
use pathhub_client::install::{install, uninstall};
use pathhub_client::shell::TokioCommandRunner;
use pathhub_core::{PathHubError, PipelineReport, Platform};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = InstallConfig::parse();

    if Platform::current() != Platform::Windows {
        error!("Protocol registration is only supported on Windows");
        return Ok(ExitCode::FAILURE);
    }

    let runner = TokioCommandRunner::new(Duration::from_secs(30));
    let report = if config.uninstall {
        uninstall(&config.scheme, &runner).await
    } else {
        let exe = match config.exe.clone() {
            Some(exe) => exe,
            None => default_client_exe()?,
        };
        if !exe.exists() {
            warn!("Helper executable not found at {}", exe.display());
        }
        install(&config.scheme, &exe, &runner).await
    };

    if !log_report(&report) {
        return Ok(ExitCode::FAILURE);
    }

    if config.uninstall {
        info!("Removed {}:// registration", config.scheme);
    } else {
        info!("Registered {}:// for the current user", config.scheme);
        info!("Test it from a command prompt:");
        info!("  start {}://C%3A%5CWindows", config.scheme);
    }
    Ok(ExitCode::SUCCESS)
}

fn default_client_exe() -> Result<PathBuf, PathHubError> {
    let current = std::env::current_exe()
        .map_err(|e| PathHubError::Validation(format!("cannot locate installer: {}", e)))?;
    let dir = current
        .parent()
        .ok_or_else(|| PathHubError::Validation("installer has no parent directory".to_string()))?;
    Ok(dir.join("pathhub-client.exe"))
}

/// Log every executed step; `false` when the run stopped early.
fn log_report(report: &PipelineReport) -> bool {
    for step in &report.steps {
        match &step.outcome {
            Ok(_) => info!("[{}/{}] {}", step.index + 1, report.total, step.command),
            Err(e) => error!("[{}/{}] {}", step.index + 1, report.total, e),
        }
        if let Some(warning) = step.warning() {
            warn!("  {}", warning);
        }
    }

    if report.is_complete() {
        return true;
    }
    error!(
        "Stopped after {} of {} steps",
        report.steps.len(),
        report.total
    );
    false
}
