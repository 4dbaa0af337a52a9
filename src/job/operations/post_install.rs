//! Copy a job's `<appid>.lua` into Steam's plugin directory

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{AcquireError, AcquireResult};
use crate::steam_root::SteamRootResolver;

pub const PAYLOAD_EXTENSION: &str = "lua";

/// Plugin directory relative to the Steam root
pub fn plugin_dir(steam_root: &Path) -> PathBuf {
    steam_root.join("config").join("stplug-in")
}

/// Look for `<appid>.lua` directly in the download root, then in the working
/// directory, then anywhere below the download root.
pub fn find_payload(app_id: &str, download_root: &Path, work_dir: &Path) -> AcquireResult<PathBuf> {
    let file_name = format!("{}.{}", app_id, PAYLOAD_EXTENSION);

    for dir in [download_root, work_dir] {
        let candidate = dir.join(&file_name);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    if download_root.is_dir() {
        let found = WalkDir::new(download_root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .find(|e| e.file_type().is_file() && e.file_name() == file_name.as_str());
        if let Some(entry) = found {
            return Ok(entry.into_path());
        }
    }

    Err(AcquireError::FileNotFound { name: file_name })
}

/// Find the payload for `app_id` and copy it under the resolved Steam root.
///
/// Returns the destination path.
pub fn install_payload(
    app_id: &str,
    download_root: &Path,
    work_dir: &Path,
    resolver: &SteamRootResolver,
) -> AcquireResult<PathBuf> {
    let payload = find_payload(app_id, download_root, work_dir)?;
    let root = resolver.resolve()?;

    let dest_dir = plugin_dir(&root.path);
    fs::create_dir_all(&dest_dir).map_err(AcquireError::io("failed to create", &dest_dir))?;

    let file_name = payload.file_name().unwrap_or_default();
    let dest = dest_dir.join(file_name);
    fs::copy(&payload, &dest).map_err(AcquireError::io("failed to copy to", &dest))?;

    tracing::info!("copied {} to {}", payload.display(), dest.display());
    Ok(dest)
}
