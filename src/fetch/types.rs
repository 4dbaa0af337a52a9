//! Fetch module type definitions

use std::time::Duration;

/// Write granularity for streamed downloads
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Per-candidate budget when probing mirrors
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Existence check against the primary host
pub const PRIMARY_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

pub const PRIMARY_DOWNLOAD_TIMEOUT: Timeout = Timeout::Overall(Duration::from_secs(30));

/// Mirrors are slower to start sending, so they get a separate read budget
pub const MIRROR_DOWNLOAD_TIMEOUT: Timeout = Timeout::ConnectRead {
    connect: Duration::from_secs(5),
    read: Duration::from_secs(30),
};

/// Timeout policy for a single request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timeout {
    /// One budget for the whole request
    Overall(Duration),
    /// Separate budgets for establishing the connection and for I/O.
    ///
    /// The blocking client has no per-read timeout, so `read` caps the whole
    /// request, connection included. A body that is still streaming when it
    /// runs out fails even if bytes keep arriving.
    ConnectRead { connect: Duration, read: Duration },
}

/// Outcome of a candidate's reachability check
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Reachability {
    /// Not checked (yet, or skipped after a winner was found)
    #[default]
    Unknown,
    Reachable,
    Unreachable,
}

/// One mirror node considered during a probing round
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MirrorCandidate {
    pub index: usize,
    pub url: String,
    pub reachable: Reachability,
}

impl MirrorCandidate {
    pub fn new(index: usize, url: String) -> Self {
        Self {
            index,
            url,
            reachable: Reachability::Unknown,
        }
    }
}
