use thiserror::Error;

/// Errors raised while decoding, probing, or opening a shared path.
///
/// Only `Validation` is fatal for the protocol helper. Every other variant is
/// recovered from by a degraded open attempt or a user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathHubError {
    #[error("Failed to decode segment '{segment}': {reason}")]
    Decode { segment: String, reason: String },

    #[error("Failed to probe {path}: {reason}")]
    Probe { path: String, reason: String },

    #[error("Command `{command}` failed: {reason}")]
    Invocation { command: String, reason: String },

    #[error("Command `{command}` timed out after {secs}s")]
    TimedOut { command: String, secs: u64 },

    #[error("Invalid path: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl PathHubError {
    /// Whether this error came from running an external command.
    pub fn is_invocation(&self) -> bool {
        matches!(
            self,
            PathHubError::Invocation { .. } | PathHubError::TimedOut { .. }
        )
    }
}
