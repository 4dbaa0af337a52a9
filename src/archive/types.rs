//! Archive module type definitions

use std::path::PathBuf;

/// Extensions kept after extraction, compared case-insensitively
pub const ALLOWED_EXTENSIONS: &[&str] = &["lua", "manifest", "json", "vdf"];

/// Appended to the target directory name to get the staging directory
pub const STAGING_SUFFIX: &str = "_staging";

/// What a successful extraction left behind
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Flat directory holding the retained files
    pub target_dir: PathBuf,
    /// Files moved into `target_dir`
    pub retained: usize,
    /// Files dropped because of their extension
    pub discarded: usize,
}
