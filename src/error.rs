//! Error taxonomy for acquisition jobs.
//!
//! Every failure a job can report maps onto one variant here. Connectivity
//! and not-cataloged failures are kept apart so the caller can suggest
//! switching sources.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for acquisition operations.
pub type AcquireResult<T> = Result<T, AcquireError>;

#[derive(Debug, Error)]
pub enum AcquireError {
    /// Transport failure or an unexpected HTTP status.
    #[error("connection to {url} failed: {reason}")]
    Connectivity { url: String, reason: String },

    /// The primary source answered 404 for this identifier.
    #[error("the primary source has no archive for {id}, try the mirrored source")]
    NotCataloged { id: String },

    /// Every mirror candidate failed its reachability check.
    #[error("no usable mirror for {id}, try again later")]
    NoMirror { id: String },

    /// The downloaded file is not a readable ZIP archive.
    #[error("{} is not a valid archive: {reason}", path.display())]
    InvalidArchive { path: PathBuf, reason: String },

    /// None of the discovery strategies found a Steam installation.
    #[error("could not locate the Steam installation, set STEAM_PATH to override")]
    InstallRootNotFound,

    /// The file expected for post-install was not found.
    #[error("{name} not found, make sure it is in the download directory or the working directory")]
    FileNotFound { name: String },

    /// A job is already running.
    #[error("a job is already running, please wait")]
    Busy,

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start job thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl AcquireError {
    /// Build a closure that wraps an `io::Error` with the path it concerns.
    pub fn io(action: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io {
            action,
            path,
            source,
        }
    }

    pub fn connectivity(url: &str, reason: impl ToString) -> Self {
        Self::Connectivity {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether switching to the other source might help.
    pub fn suggests_other_source(&self) -> bool {
        matches!(self, Self::NotCataloged { .. } | Self::NoMirror { .. })
    }
}
