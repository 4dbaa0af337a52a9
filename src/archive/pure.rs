//! Pure helpers for extraction

use std::path::{Path, PathBuf};

use super::types::STAGING_SUFFIX;

/// Whether `path` has an extension in `allowed` (case-insensitive)
pub fn is_allowed(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

/// Sibling of `target` named `<target>_staging`
pub fn staging_dir_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(STAGING_SUFFIX);
    target.with_file_name(name)
}
