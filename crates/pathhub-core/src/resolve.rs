//! Choosing what to open for a decoded path.
//!
//! Resolution is pure given a [`PathProbe`]: the filesystem is only touched
//! through the probe, so fallback policy can be tested without real files.

use std::io::ErrorKind;

use serde::Serialize;
use tracing::{debug, warn};

use crate::command::Platform;
use crate::error::PathHubError;
use crate::normalize::{is_unc_path, normalize_windows_path, parent_dir};

/// Kind of an existing filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// How a path was classified at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathClassification {
    LocalFile,
    LocalDirectory,
    UncPath,
    NonexistentLocal,
    /// The existence probe failed, e.g. permission denied.
    Unprobed,
}

/// What the file browser should do with the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenAction {
    OpenDirectory,
    /// Open the containing folder with the entry selected.
    RevealFile,
}

/// Decision for one activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionPlan {
    /// Normalized path that was requested
    pub path: String,
    pub classification: PathClassification,
    /// Path handed to the file browser (the parent for missing entries)
    pub target: String,
    pub action: OpenAction,
}

impl ResolutionPlan {
    pub fn is_unc(&self) -> bool {
        self.classification == PathClassification::UncPath
    }
}

/// Filesystem existence check.
pub trait PathProbe: Send + Sync {
    /// `Ok(None)` when nothing exists at `path`.
    fn probe(&self, path: &str) -> Result<Option<EntryKind>, PathHubError>;
}

/// Probe backed by `std::fs::metadata`.
#[derive(Debug, Clone, Copy)]
pub struct FsProbe {
    platform: Platform,
}

impl FsProbe {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

impl Default for FsProbe {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}

impl PathProbe for FsProbe {
    fn probe(&self, path: &str) -> Result<Option<EntryKind>, PathHubError> {
        let native = self.platform.native_path(path);
        match std::fs::metadata(&native) {
            Ok(metadata) if metadata.is_dir() => Ok(Some(EntryKind::Directory)),
            Ok(_) => Ok(Some(EntryKind::File)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PathHubError::Probe {
                path: native,
                reason: e.to_string(),
            }),
        }
    }
}

/// Classify `path` and pick the open target.
///
/// UNC paths are never probed: network shares can be slow or deny stat calls,
/// and the file browser reports its own errors for them.
pub fn resolve(path: &str, probe: &dyn PathProbe) -> ResolutionPlan {
    let path = normalize_windows_path(path);

    if is_unc_path(&path) {
        debug!("UNC path detected, skipping existence check");
        return ResolutionPlan {
            target: path.clone(),
            path,
            classification: PathClassification::UncPath,
            action: OpenAction::OpenDirectory,
        };
    }

    match probe.probe(&path) {
        Ok(Some(EntryKind::Directory)) => ResolutionPlan {
            target: path.clone(),
            path,
            classification: PathClassification::LocalDirectory,
            action: OpenAction::OpenDirectory,
        },
        Ok(Some(EntryKind::File)) => ResolutionPlan {
            target: path.clone(),
            path,
            classification: PathClassification::LocalFile,
            action: OpenAction::RevealFile,
        },
        Ok(None) => {
            let parent = parent_dir(&path);
            let parent_exists = matches!(probe.probe(&parent), Ok(Some(_)));
            debug!("{} does not exist, parent {} exists: {}", path, parent, parent_exists);
            let target = if parent_exists { parent } else { path.clone() };
            ResolutionPlan {
                path,
                classification: PathClassification::NonexistentLocal,
                target,
                action: OpenAction::OpenDirectory,
            }
        }
        Err(e) => {
            warn!("Existence check failed, opening path directly: {}", e);
            ResolutionPlan {
                target: path.clone(),
                path,
                classification: PathClassification::Unprobed,
                action: OpenAction::OpenDirectory,
            }
        }
    }
}
