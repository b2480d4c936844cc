//! Per-user protocol handler registration on Windows.
//!
//! Registration is a fixed list of `reg` commands run with
//! [`run_sequential`]; the first failing command stops the run.

use std::path::Path;

use pathhub_core::{run_sequential, CommandRunner, PipelineReport, ShellCommand};
use tracing::info;

pub const REGISTRY_ROOT: &str = "HKEY_CURRENT_USER\\Software\\Classes";

fn scheme_key(scheme: &str) -> String {
    format!("{}\\{}", REGISTRY_ROOT, scheme)
}

fn reg_add(key: &str, value: Option<&str>, data: &str) -> ShellCommand {
    let mut cmd = ShellCommand::new("reg").args(["add", key]);
    cmd = match value {
        Some(name) => cmd.args(["/v", name]),
        None => cmd.arg("/ve"),
    };
    cmd.args(["/t", "REG_SZ", "/d", data, "/f"])
}

/// Commands that register `exe` as the handler for `scheme://` URLs.
pub fn registration_commands(scheme: &str, exe: &Path) -> Vec<ShellCommand> {
    let root = scheme_key(scheme);
    let exe = exe.display().to_string();
    let shell = format!("{}\\shell", root);
    let open = format!("{}\\open", shell);
    let command = format!("{}\\command", open);

    vec![
        reg_add(&root, None, &format!("URL:{} Protocol", scheme)),
        reg_add(&root, Some("URL Protocol"), ""),
        reg_add(&format!("{}\\DefaultIcon", root), None, &format!("{},1", exe)),
        reg_add(&shell, None, "open"),
        reg_add(&open, None, "Open with PathHub"),
        reg_add(&open, Some("FriendlyAppName"), "PathHub"),
        reg_add(&command, None, &format!("\"{}\" \"%1\"", exe)),
    ]
}

/// Commands that remove the `scheme://` registration.
pub fn unregistration_commands(scheme: &str) -> Vec<ShellCommand> {
    vec![ShellCommand::new("reg").args(["delete".to_string(), scheme_key(scheme), "/f".to_string()])]
}

pub async fn install(scheme: &str, exe: &Path, runner: &dyn CommandRunner) -> PipelineReport {
    info!("Registering {}:// for {}", scheme, exe.display());
    run_sequential(&registration_commands(scheme, exe), runner).await
}

pub async fn uninstall(scheme: &str, runner: &dyn CommandRunner) -> PipelineReport {
    info!("Removing {}:// registration", scheme);
    run_sequential(&unregistration_commands(scheme), runner).await
}
