//! Console + append-only file logging.
//!
//! Each activation is its own process, so the log file is the only record of
//! what happened. Log file problems are reported on stderr and never abort
//! the activation.

use std::path::Path;

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILE_NAME: &str = "pathhub-client.log";

/// Appender for `path` that never rotates, so every run appends to the same
/// file. Missing parent directories are created.
pub fn file_appender(path: &Path) -> Result<RollingFileAppender, InitError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_FILE_NAME);

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
}

/// Console layer plus an optional file layer writing through `file_writer`.
///
/// Write failures on either layer are reported on stderr.
pub fn subscriber<W>(file_writer: Option<W>) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .log_internal_errors(true)
    });

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().log_internal_errors(true))
        .with(file_layer)
}

/// Install the global subscriber.
///
/// The returned guard flushes the file on drop and must live until the
/// process exits. `None` when no file was requested or it could not be opened.
pub fn init(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let appender = log_file.and_then(|path| match file_appender(path) {
        Ok(appender) => Some(appender),
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", path.display(), e);
            None
        }
    });

    match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            subscriber(Some(writer)).init();
            Some(guard)
        }
        None => {
            subscriber(None::<fn() -> std::io::Sink>).init();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tracing::info;

    #[test]
    fn test_appender_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("logs").join("client.log");

        let appender = file_appender(&path).unwrap();
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing::subscriber::with_default(subscriber(Some(writer)), || {
            info!("activation started");
        });
        drop(guard);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("activation started"));
    }

    #[test]
    fn test_existing_log_is_appended() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("client.log");
        std::fs::write(&path, "earlier run\n").unwrap();

        let (writer, guard) = tracing_appender::non_blocking(file_appender(&path).unwrap());
        tracing::subscriber::with_default(subscriber(Some(writer)), || {
            info!("second run");
        });
        drop(guard);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("earlier run\n"));
        assert!(content.contains("second run"));
    }

    #[test]
    fn test_unusable_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        assert!(file_appender(&blocker.join("client.log")).is_err());
    }

    /// Writer whose every write fails, like a log file on a full disk.
    #[derive(Clone, Default)]
    struct FailingWriter {
        attempts: Arc<AtomicUsize>,
    }

    impl io::Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failing_file_writes_do_not_stop_logging() {
        let writer = FailingWriter::default();
        let attempts = writer.attempts.clone();
        let make_writer = move || writer.clone();

        let finished = tracing::subscriber::with_default(subscriber(Some(make_writer)), || {
            info!("first");
            info!("second");
            true
        });

        assert!(finished);
        assert!(attempts.load(Ordering::SeqCst) >= 2);
    }
}
