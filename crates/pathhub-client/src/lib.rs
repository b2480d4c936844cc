//! Protocol activation helper for `pathhub://` links.
//!
//! The OS starts `pathhub-client <url>` when a link is activated. The helper
//! decodes the URL, decides what to open, runs the file browser with a bounded
//! timeout and falls back to the share root for unreachable network paths.

pub mod config;
pub mod install;
pub mod logging;
pub mod notify;
pub mod opener;
pub mod shell;
