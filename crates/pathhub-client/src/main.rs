//! Protocol helper started by the OS for every `pathhub://` activation.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use pathhub_client::config::Config;
use pathhub_client::logging;
use pathhub_client::notify::{DesktopNotifier, LogNotifier, Notifier};
use pathhub_client::opener::{activate, Opener};
use pathhub_client::shell::TokioCommandRunner;
use pathhub_core::{CommandRunner, FsProbe, PathHubError, Platform};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = Config::parse();
    let log_file = config.log_file_path();
    // Flushes the file log when main returns.
    let log_guard = logging::init(log_file.as_deref());

    let platform = Platform::current();
    info!("Starting pathhub-client v{}", env!("CARGO_PKG_VERSION"));
    info!("  Platform: {:?}", platform);
    info!("  Args: {:?}", std::env::args().collect::<Vec<_>>());
    if let (Some(path), Some(_)) = (&log_file, &log_guard) {
        info!("  Log file: {}", path.display());
    }

    let Some(url) = config.url.as_deref() else {
        info!("Usage: pathhub-client <{}://encoded-path>", config.scheme);
        info!("Example: pathhub-client {}://C%3A%5CUsers%5CDocuments", config.scheme);
        return Ok(ExitCode::SUCCESS);
    };

    if config.is_auto_execution() {
        info!("Mode: automatic (triggered by share page)");
    } else {
        info!("Mode: manual");
    }

    let runner: Arc<dyn CommandRunner> = Arc::new(TokioCommandRunner::new(config.timeout()));
    let notifier: Arc<dyn Notifier> = if config.no_notify {
        Arc::new(LogNotifier)
    } else {
        Arc::new(DesktopNotifier::new(runner.clone(), platform))
    };
    let opener = Opener::new(runner, notifier, Arc::new(FsProbe::new(platform)), platform);

    match activate(url, &config.scheme, &opener).await {
        Ok(report) => {
            info!("Finished: {:?}", report.outcome);
            Ok(ExitCode::SUCCESS)
        }
        Err(PathHubError::Validation(reason)) => {
            error!("Invalid protocol URL: {}", reason);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
