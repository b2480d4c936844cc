use std::fmt;

use serde::Serialize;

use crate::normalize::parent_dir;
use crate::resolve::OpenAction;

/// An external command: program plus arguments, never passed through a shell
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment variables for the child process
    pub env: Vec<(String, String)>,
    /// Treat a non-zero exit status as success (programs that report
    /// nothing useful through it)
    pub ignore_exit_status: bool,
}

impl ShellCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            ignore_exit_status: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn ignore_exit_status(mut self) -> Self {
        self.ignore_exit_status = true;
        self
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Host platform, which decides the file-browser command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Unix
        }
    }

    /// Convert a normalized Windows path to this platform's separator style.
    pub fn native_path(&self, path: &str) -> String {
        match self {
            Platform::Windows => path.to_string(),
            Platform::MacOs | Platform::Unix => path.replace('\\', "/"),
        }
    }
}

/// Command that shows `path` in the platform's file browser.
pub fn open_command(platform: Platform, action: OpenAction, path: &str) -> ShellCommand {
    match (platform, action) {
        // explorer.exe exits non-zero even when it opened the window.
        (Platform::Windows, OpenAction::OpenDirectory) => ShellCommand::new("explorer.exe")
            .arg(path)
            .ignore_exit_status(),
        (Platform::Windows, OpenAction::RevealFile) => ShellCommand::new("explorer.exe")
            .args(["/select,", path])
            .ignore_exit_status(),
        (Platform::MacOs, OpenAction::OpenDirectory) => {
            ShellCommand::new("open").arg(unix_operand(platform, path))
        }
        (Platform::MacOs, OpenAction::RevealFile) => {
            ShellCommand::new("open").args(["-R".to_string(), unix_operand(platform, path)])
        }
        (Platform::Unix, action) => {
            ShellCommand::new("xdg-open").arg(unix_operand(platform, &unix_target(action, path)))
        }
    }
}

/// Every command that can show `path`, in the order they should be tried.
///
/// Desktops without `xdg-open` usually still ship `gio`.
pub fn open_commands(platform: Platform, action: OpenAction, path: &str) -> Vec<ShellCommand> {
    let primary = open_command(platform, action, path);
    match platform {
        Platform::Unix => vec![
            primary,
            ShellCommand::new("gio").args([
                "open".to_string(),
                unix_operand(platform, &unix_target(action, path)),
            ]),
        ],
        Platform::Windows | Platform::MacOs => vec![primary],
    }
}

/// `xdg-open` and `gio` cannot select a file; show the containing folder.
fn unix_target(action: OpenAction, path: &str) -> String {
    match action {
        OpenAction::OpenDirectory => path.to_string(),
        OpenAction::RevealFile => parent_dir(path),
    }
}

/// Native path that cannot be mistaken for an option.
fn unix_operand(platform: Platform, path: &str) -> String {
    let native = platform.native_path(path);
    if native.starts_with('-') {
        format!("./{}", native)
    } else {
        native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_open_directory() {
        let cmd = open_command(Platform::Windows, OpenAction::OpenDirectory, "C:\\Users");
        assert_eq!(cmd.program, "explorer.exe");
        assert_eq!(cmd.args, vec!["C:\\Users"]);
        assert!(cmd.ignore_exit_status);
    }

    #[test]
    fn test_windows_reveal_file() {
        let cmd = open_command(Platform::Windows, OpenAction::RevealFile, "C:\\a\\b.txt");
        assert_eq!(cmd.args, vec!["/select,", "C:\\a\\b.txt"]);
    }

    #[test]
    fn test_windows_metacharacters_stay_in_one_argument() {
        for path in ["\\\\srv\\x&calc.exe", "C:\\R&D\\50% off|x^y\\plan.txt"] {
            for action in [OpenAction::OpenDirectory, OpenAction::RevealFile] {
                let cmd = open_command(Platform::Windows, action, path);
                assert_eq!(cmd.program, "explorer.exe");
                assert_eq!(cmd.args.last().map(String::as_str), Some(path));
                assert!(cmd.args.iter().all(|arg| arg != "/C" && arg != "start"));
            }
        }
    }

    #[test]
    fn test_macos_reveal_uses_native_separators() {
        let cmd = open_command(Platform::MacOs, OpenAction::RevealFile, "\\Users\\me\\a.txt");
        assert_eq!(cmd.program, "open");
        assert_eq!(cmd.args, vec!["-R", "/Users/me/a.txt"]);
        assert!(!cmd.ignore_exit_status);
    }

    #[test]
    fn test_unix_reveal_opens_parent() {
        let cmd = open_command(Platform::Unix, OpenAction::RevealFile, "\\home\\me\\a.txt");
        assert_eq!(cmd.program, "xdg-open");
        assert_eq!(cmd.args, vec!["/home/me"]);
    }

    #[test]
    fn test_option_like_path_is_not_an_option() {
        let cmd = open_command(Platform::MacOs, OpenAction::OpenDirectory, "-a Calculator");
        assert_eq!(cmd.args, vec!["./-a Calculator"]);
    }

    #[test]
    fn test_unix_falls_back_to_gio() {
        let cmds = open_commands(Platform::Unix, OpenAction::OpenDirectory, "\\srv\\data");
        let programs: Vec<&str> = cmds.iter().map(|c| c.program.as_str()).collect();
        assert_eq!(programs, vec!["xdg-open", "gio"]);
        assert_eq!(cmds[1].args, vec!["open", "/srv/data"]);

        assert_eq!(
            open_commands(Platform::Windows, OpenAction::OpenDirectory, "C:\\x").len(),
            1
        );
    }

    #[test]
    fn test_display_quotes_empty_and_spaced_args() {
        let cmd = ShellCommand::new("notify-send").args(["", "C:\\My Files"]);
        assert_eq!(cmd.to_string(), "notify-send \"\" \"C:\\My Files\"");
    }

    #[test]
    fn test_env_is_not_rendered() {
        let cmd = ShellCommand::new("powershell").arg("-Command").env("KEY", "secret value");
        assert_eq!(cmd.env, vec![("KEY".to_string(), "secret value".to_string())]);
        assert_eq!(cmd.to_string(), "powershell -Command");
    }
}
