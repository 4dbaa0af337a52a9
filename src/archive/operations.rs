//! Extraction into staging and the move into the target directory

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

use walkdir::WalkDir;
use zip::ZipArchive;

use crate::error::{AcquireError, AcquireResult};

use super::pure::{is_allowed, staging_dir_for};
use super::types::ExtractionSummary;

/// Extract `archive` and keep only files whose extension is in `allowed`,
/// moved flat into `target`.
///
/// The staging directory `<target>_staging` is recreated from scratch and
/// removed again before returning, whatever the outcome. Files are moved in
/// lexicographic path order, so when two entries share a base name the one
/// sorting last wins. The archive file itself is left alone.
pub fn extract_filtered(
    archive: &Path,
    target: &Path,
    allowed: &[&str],
) -> AcquireResult<ExtractionSummary> {
    let staging = staging_dir_for(target);

    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(AcquireError::io("failed to clear", &staging))?;
    }
    fs::create_dir_all(target).map_err(AcquireError::io("failed to create", target))?;
    fs::create_dir_all(&staging).map_err(AcquireError::io("failed to create", &staging))?;

    if let Err(e) = unpack(archive, &staging) {
        fs::remove_dir_all(&staging).ok();
        return Err(e);
    }

    let (retained, discarded) = move_allowed(&staging, target, allowed);

    if let Err(e) = fs::remove_dir_all(&staging) {
        tracing::debug!("could not remove {}: {}", staging.display(), e);
    }

    tracing::info!(
        "extracted {}: kept {} file(s), dropped {}",
        archive.display(),
        retained,
        discarded
    );

    Ok(ExtractionSummary {
        target_dir: target.to_path_buf(),
        retained,
        discarded,
    })
}

/// Unpack every entry of a zip archive under `dest_dir`
fn unpack(archive: &Path, dest_dir: &Path) -> AcquireResult<()> {
    let invalid = |reason: String| AcquireError::InvalidArchive {
        path: archive.to_path_buf(),
        reason,
    };

    let file = File::open(archive).map_err(AcquireError::io("failed to open", archive))?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|e| invalid(e.to_string()))?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| invalid(e.to_string()))?;
        let outpath = match entry.enclosed_name() {
            Some(path) => dest_dir.join(path),
            None => {
                tracing::warn!("skipping unsafe entry {}", entry.name());
                continue;
            }
        };

        if entry.is_dir() {
            fs::create_dir_all(&outpath).map_err(AcquireError::io("failed to create", &outpath))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(AcquireError::io("failed to create", parent))?;
        }
        let mut outfile =
            File::create(&outpath).map_err(AcquireError::io("failed to create", &outpath))?;
        io::copy(&mut entry, &mut outfile)
            .map_err(|e| invalid(format!("{}: {}", entry.name(), e)))?;
    }

    Ok(())
}

/// Move allow-listed regular files from `staging` into `target`.
///
/// Returns (retained, discarded). Retained counts distinct names now in
/// `target`, so a file overwritten by a later one of the same name is counted
/// once. A file that cannot be moved is logged and counted as neither.
fn move_allowed(staging: &Path, target: &Path, allowed: &[&str]) -> (usize, usize) {
    let mut discarded = 0;
    let mut moved: HashSet<OsString> = HashSet::new();

    let walk = WalkDir::new(staging)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walk.into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        if !is_allowed(entry.path(), allowed) {
            discarded += 1;
            continue;
        }

        let name = entry.file_name().to_os_string();
        let dest = target.join(&name);
        if moved.contains(&name) {
            tracing::warn!(
                "{} overwrites an earlier file with the same name",
                entry.path().display()
            );
        }

        match move_file(entry.path(), &dest) {
            Ok(()) => {
                moved.insert(name);
            }
            Err(e) => tracing::warn!(
                "failed to move {} -> {}: {}",
                entry.path().display(),
                dest.display(),
                e
            ),
        }
    }

    (moved.len(), discarded)
}

fn move_file(src: &Path, dest: &Path) -> io::Result<()> {
    if fs::rename(src, dest).is_ok() {
        return Ok(());
    }
    // Rename can't cross filesystems
    fs::copy(src, dest)?;
    fs::remove_file(src)
}

/// Write a stored (uncompressed) zip with the given entries
#[cfg(test)]
pub(crate) fn write_test_zip(path: &Path, entries: &[(&str, &[u8])]) {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}
