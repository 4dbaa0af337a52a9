//! One acquisition job from start to finish.
//!
//! Metadata lookup, source-specific download, filtered extraction, archive
//! cleanup, and the optional copy into Steam. Every step runs sequentially on
//! the calling thread; only mirror probing fans out.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use crate::archive::{ALLOWED_EXTENSIONS, ExtractionSummary, extract_filtered};
use crate::config::{Endpoints, Source};
use crate::error::{AcquireError, AcquireResult};
use crate::fetch::{
    MIRROR_DOWNLOAD_TIMEOUT, PRIMARY_CHECK_TIMEOUT, PRIMARY_DOWNLOAD_TIMEOUT, PROBE_TIMEOUT,
    Timeout, browser_headers, build_client, fetch_status, find_reachable_mirror, mirror_url,
    primary_url, stream_to_file,
};
use crate::job::operations::install_payload;
use crate::job::types::{EventSink, Job, JobEvent, JobReport, JobState, PostInstall};
use crate::metadata::fetch_app_info;
use crate::paths::{PATH_DOWNLOAD, PATH_WORK};
use crate::steam_root::SteamRootResolver;

/// Everything a job needs besides the job itself
pub struct AcquireContext {
    /// Archives land here, and each job extracts into a subdirectory of it
    pub download_root: PathBuf,
    /// Second place to look for the post-install payload
    pub work_dir: PathBuf,
    pub endpoints: Endpoints,
    pub auto_import: bool,
    pub resolver: SteamRootResolver,
}

impl AcquireContext {
    pub fn system(auto_import: bool) -> Self {
        Self {
            download_root: PATH_DOWNLOAD.clone(),
            work_dir: PATH_WORK.clone(),
            endpoints: Endpoints::default(),
            auto_import,
            resolver: SteamRootResolver::system(),
        }
    }
}

/// A download that is ready to start
struct Transfer {
    url: String,
    archive: PathBuf,
    headers: Option<HeaderMap>,
    timeout: Timeout,
}

/// Removes the archive when dropped, whether or not extraction worked.
/// Also covers a download that failed halfway.
struct ArchiveGuard<'a> {
    path: PathBuf,
    events: &'a EventSink,
}

impl Drop for ArchiveGuard<'_> {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => self
                .events
                .log(format!("Removed temporary archive {}", self.path.display())),
            Err(e) => self.events.warn(format!(
                "Could not remove archive {}: {}",
                self.path.display(),
                e
            )),
        }
    }
}

/// Run `job` to completion and report how it went. Never panics on job
/// failures; they end up in the report.
pub fn run_job(job: &Job, ctx: &AcquireContext, events: &EventSink) -> JobReport {
    let mut report = JobReport::new(job.clone());
    events.log(format!(
        "Starting {} download for app {}",
        job.source, job.app_id
    ));

    let info = fetch_app_info(&ctx.endpoints, &job.app_id);
    let folder = info.folder_name(&job.app_id);
    match &info.name {
        Some(name) => events.log(format!("Game: {}", name)),
        None => events.log("Game name unknown"),
    }
    events.send(JobEvent::GameInfo {
        name: info.name.clone(),
        header_image: info.header_image.clone(),
        folder: folder.clone(),
    });

    let summary = match acquire(job, ctx, &folder, events) {
        Ok(summary) => summary,
        Err(e) => {
            events.warn(e.to_string());
            if e.suggests_other_source() {
                events.log(format!("Try the {} source instead", job.source.other()));
            }
            events.log("Job failed, see the log for details");
            return report.fail(e);
        }
    };

    events.log(format!(
        "Extracted {} file(s) to {}, skipped {}",
        summary.retained,
        summary.target_dir.display(),
        summary.discarded
    ));
    report.target_dir = Some(summary.target_dir);
    report.retained = summary.retained;

    if ctx.auto_import {
        events.log("Download complete, installing into Steam...");
        report.post_install =
            match install_payload(&job.app_id, &ctx.download_root, &ctx.work_dir, &ctx.resolver) {
                Ok(dest) => {
                    events.log(format!("Installed {}", dest.display()));
                    PostInstall::Installed(dest)
                }
                Err(e) => {
                    events.warn(format!("Install step failed: {}", e));
                    PostInstall::Failed(e)
                }
            };
    }

    report.state = JobState::Succeeded;
    events.log("Job finished");
    report
}

fn acquire(
    job: &Job,
    ctx: &AcquireContext,
    folder: &str,
    events: &EventSink,
) -> AcquireResult<ExtractionSummary> {
    fs::create_dir_all(&ctx.download_root)
        .map_err(AcquireError::io("failed to create", &ctx.download_root))?;

    let transfer = match job.source {
        Source::Primary => prepare_primary(&job.app_id, ctx, events)?,
        Source::Mirrored => prepare_mirrored(&job.app_id, ctx, events)?,
    };

    let _guard = ArchiveGuard {
        path: transfer.archive.clone(),
        events,
    };

    let bytes = stream_to_file(
        &transfer.url,
        &transfer.archive,
        transfer.headers.as_ref(),
        transfer.timeout,
    )?;
    events.log(format!("Downloaded {} bytes", bytes));

    let target = ctx.download_root.join(folder);
    extract_filtered(&transfer.archive, &target, ALLOWED_EXTENSIONS)
}

fn prepare_primary(app_id: &str, ctx: &AcquireContext, events: &EventSink) -> AcquireResult<Transfer> {
    let url = primary_url(&ctx.endpoints.primary_base, app_id);
    check_primary(&url, app_id)?;
    events.log("Primary source is reachable, downloading...");

    Ok(Transfer {
        url,
        archive: archive_path(&ctx.download_root, app_id, None),
        headers: None,
        timeout: PRIMARY_DOWNLOAD_TIMEOUT,
    })
}

/// Existence check that tells "not cataloged" apart from connectivity trouble
fn check_primary(url: &str, app_id: &str) -> AcquireResult<()> {
    let client = build_client(Timeout::Overall(PRIMARY_CHECK_TIMEOUT))?;
    match fetch_status(&client, url) {
        Ok(status) if status.is_success() => Ok(()),
        Ok(StatusCode::NOT_FOUND) => Err(AcquireError::NotCataloged {
            id: app_id.to_string(),
        }),
        Ok(status) => Err(AcquireError::connectivity(url, format!("HTTP {}", status))),
        Err(e) => Err(AcquireError::connectivity(url, e)),
    }
}

fn prepare_mirrored(app_id: &str, ctx: &AcquireContext, events: &EventSink) -> AcquireResult<Transfer> {
    let endpoints = &ctx.endpoints;
    let client = build_client(Timeout::Overall(PROBE_TIMEOUT))?;
    events.log(format!("Probing {} mirror(s)...", endpoints.mirror_count));

    let node = find_reachable_mirror(&client, endpoints.mirror_count, |n| {
        mirror_url(&endpoints.mirror_base, app_id, n)
    })
    .ok_or_else(|| AcquireError::NoMirror {
        id: app_id.to_string(),
    })?;
    events.log(format!("Using mirror {}", node));

    Ok(Transfer {
        url: mirror_url(&endpoints.mirror_base, app_id, node),
        archive: archive_path(&ctx.download_root, app_id, Some(node)),
        headers: Some(browser_headers(&endpoints.mirror_base)),
        timeout: MIRROR_DOWNLOAD_TIMEOUT,
    })
}

fn archive_path(download_root: &Path, app_id: &str, node: Option<usize>) -> PathBuf {
    match node {
        Some(n) => download_root.join(format!("{}_src{}.zip", app_id, n)),
        None => download_root.join(format!("{}.zip", app_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{staging_dir_for, write_test_zip};
    use crate::fetch::serve_cut_off_body;
    use httpmock::prelude::*;
    use std::sync::mpsc;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        steam: PathBuf,
        ctx: AcquireContext,
    }

    fn fixture(server: &MockServer, auto_import: bool) -> Fixture {
        let temp = TempDir::new().unwrap();
        let work = temp.path().join("work");
        let steam = temp.path().join("Steam");
        fs::create_dir_all(&work).unwrap();
        fs::create_dir_all(&steam).unwrap();
        let ctx = AcquireContext {
            download_root: work.join("download"),
            work_dir: work,
            endpoints: Endpoints {
                primary_base: server.url("/heads"),
                mirror_base: server.base_url(),
                store_api: server.url("/api/appdetails"),
                mirror_count: 6,
            },
            auto_import,
            resolver: SteamRootResolver::empty().with_default_paths(vec![steam.clone()]),
        };
        Fixture {
            _temp: temp,
            steam,
            ctx,
        }
    }

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.zip");
        write_test_zip(&path, entries);
        fs::read(path).unwrap()
    }

    fn names_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    fn mock_store(server: &MockServer, app_id: &str, name: &str) {
        let body = serde_json::json!({
            app_id: { "success": true, "data": { "name": name, "header_image": "https://img/h.jpg" } }
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/appdetails").query_param("appids", app_id);
            then.status(200).json_body(body);
        });
    }

    #[test]
    fn test_primary_end_to_end() {
        let server = MockServer::start();
        mock_store(&server, "480", "Spacewar");
        let archive = zip_bytes(&[
            ("ManifestHub-480/480.lua", b"addappid(480)"),
            ("ManifestHub-480/480.manifest", b"m"),
            ("ManifestHub-480/readme.txt", b"r"),
        ]);
        let download = server.mock(|when, then| {
            when.method(GET).path("/heads/480.zip");
            then.status(200).body(archive.clone());
        });

        let f = fixture(&server, false);
        let (tx, rx) = mpsc::channel();
        let report = run_job(&Job::new("480", Source::Primary), &f.ctx, &EventSink::new(tx));

        assert!(report.succeeded(), "{}", report);
        // Existence check plus the actual download
        download.assert_hits(2);

        let target = f.ctx.download_root.join("Spacewar");
        assert_eq!(report.target_dir.as_deref(), Some(target.as_path()));
        assert_eq!(names_in(&target), vec!["480.lua", "480.manifest"]);
        assert!(!f.ctx.download_root.join("480.zip").exists());
        assert!(!staging_dir_for(&target).exists());
        assert!(matches!(report.post_install, PostInstall::Skipped));

        let events: Vec<JobEvent> = rx.try_iter().collect();
        assert!(events.iter().any(|e| matches!(
            e,
            JobEvent::GameInfo { folder, .. } if folder == "Spacewar"
        )));
    }

    #[test]
    fn test_not_cataloged_stops_early() {
        let server = MockServer::start();
        let primary = server.mock(|when, then| {
            when.method(GET).path("/heads/999999.zip");
            then.status(404);
        });
        let mirror = server.mock(|when, then| {
            when.method(GET).path("/download");
            then.status(200);
        });

        let f = fixture(&server, true);
        let report = run_job(
            &Job::new("999999", Source::Primary),
            &f.ctx,
            &EventSink::detached(),
        );

        assert_eq!(report.state, JobState::Failed);
        let failure = report.failure.as_ref().unwrap();
        assert!(matches!(failure, AcquireError::NotCataloged { id } if id == "999999"));
        assert!(failure.suggests_other_source());
        primary.assert_hits(1);
        assert_eq!(mirror.hits(), 0);
        assert!(!f.ctx.download_root.join("999999.zip").exists());
        assert!(matches!(report.post_install, PostInstall::Skipped));
    }

    #[test]
    fn test_primary_server_error_is_connectivity() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/heads/10.zip");
            then.status(502);
        });

        let f = fixture(&server, false);
        let report = run_job(&Job::new("10", Source::Primary), &f.ctx, &EventSink::detached());

        let failure = report.failure.unwrap();
        assert!(matches!(failure, AcquireError::Connectivity { .. }));
        assert!(!failure.suggests_other_source());
    }

    #[test]
    fn test_mirrored_with_post_install() {
        let server = MockServer::start();
        mock_store(&server, "480", "Space: War");
        let archive = zip_bytes(&[("480.lua", b"addappid(480)"), ("key.vdf", b"k")]);
        for node in 0..6 {
            let status = if node == 2 { 200 } else { 503 };
            let body = archive.clone();
            server.mock(move |when, then| {
                when.method(GET)
                    .path("/download")
                    .query_param("id", "GQ4DA")
                    .query_param("src", node.to_string());
                then.status(status).body(body);
            });
        }

        let f = fixture(&server, true);
        let report = run_job(&Job::new("480", Source::Mirrored), &f.ctx, &EventSink::detached());

        assert!(report.succeeded(), "{}", report);
        let target = f.ctx.download_root.join("Space_ War");
        assert_eq!(names_in(&target), vec!["480.lua", "key.vdf"]);
        assert!(!f.ctx.download_root.join("480_src2.zip").exists());

        let installed = f.steam.join("config").join("stplug-in").join("480.lua");
        assert!(matches!(&report.post_install, PostInstall::Installed(p) if p.ends_with("stplug-in/480.lua")));
        assert_eq!(fs::read_to_string(installed).unwrap(), "addappid(480)");
    }

    #[test]
    fn test_no_mirror() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/download");
            then.status(500);
        });

        let f = fixture(&server, false);
        let report = run_job(&Job::new("480", Source::Mirrored), &f.ctx, &EventSink::detached());

        assert!(matches!(report.failure, Some(AcquireError::NoMirror { .. })));
    }

    #[test]
    fn test_invalid_archive_is_reported_and_removed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/heads/480.zip");
            then.status(200).body("<html>not a zip</html>");
        });

        let f = fixture(&server, false);
        let report = run_job(&Job::new("480", Source::Primary), &f.ctx, &EventSink::detached());

        assert!(matches!(report.failure, Some(AcquireError::InvalidArchive { .. })));
        assert!(!f.ctx.download_root.join("480.zip").exists());
        assert!(!staging_dir_for(&f.ctx.download_root.join("480")).exists());
    }

    #[test]
    fn test_cut_off_download_removes_partial_archive() {
        let server = MockServer::start();
        let addr = serve_cut_off_body(100_000, b"PK\x03\x04partial");

        let mut f = fixture(&server, true);
        f.ctx.endpoints.primary_base = format!("http://{}/heads", addr);
        let report = run_job(&Job::new("480", Source::Primary), &f.ctx, &EventSink::detached());

        assert_eq!(report.state, JobState::Failed);
        assert!(matches!(report.failure, Some(AcquireError::Connectivity { .. })));
        assert!(!f.ctx.download_root.join("480.zip").exists());
        assert!(matches!(report.post_install, PostInstall::Skipped));
    }

    #[test]
    fn test_install_failure_keeps_success() {
        let server = MockServer::start();
        let archive = zip_bytes(&[("480.manifest", b"m")]);
        server.mock(|when, then| {
            when.method(GET).path("/heads/480.zip");
            then.status(200).body(archive.clone());
        });

        let f = fixture(&server, true);
        let report = run_job(&Job::new("480", Source::Primary), &f.ctx, &EventSink::detached());

        assert_eq!(report.state, JobState::Succeeded);
        assert!(report.failure.is_none());
        assert!(matches!(
            report.post_install,
            PostInstall::Failed(AcquireError::FileNotFound { .. })
        ));
    }
}
