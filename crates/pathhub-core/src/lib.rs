//! Core types and logic shared by the PathHub link service and protocol helper.
//!
//! This crate defines:
//! - `codec`: encoding paths into `pathhub://` URLs and decoding them back
//! - `normalize`: Windows path normalization and component helpers
//! - `resolve`: classifying a path and choosing what to open
//! - `command`: platform shell commands that reveal a path
//! - `pipeline`: sequential command execution with early exit
//! - `dispatch`: multi-strategy dispatch guarded by a single-assignment cell
//! - `share`: share records and the store abstraction

mod codec;
mod command;
mod dispatch;
mod error;
mod normalize;
mod pipeline;
mod resolve;
mod share;

pub use codec::{
    decode_protocol_url, decode_protocol_url_with_scheme, encode_path, protocol_url,
    protocol_url_with_scheme, DecodedPath, ProtocolUrl, ENCODED_SEPARATOR, SCHEME,
};
pub use command::{open_command, open_commands, Platform, ShellCommand};
pub use dispatch::{dispatch, DispatchOutcome, DispatchStrategy, SuccessCell};
pub use error::PathHubError;
pub use normalize::{
    file_name, is_unc_path, normalize_windows_path, parent_dir, unc_server_root,
};
pub use pipeline::{run_sequential, CommandOutput, CommandRunner, PipelineReport, StepResult};
pub use resolve::{
    resolve, EntryKind, FsProbe, OpenAction, PathClassification, PathProbe, ResolutionPlan,
};
pub use share::{SharePath, ShareStore};
