//! Network side of an acquisition job
//!
//! ## Module Structure
//! - `types.rs`: Timeout, MirrorCandidate, timing constants
//! - `pure/`: URL construction, identifier encoding, browser header bag
//! - `operations/`: HTTP clients, reachability checks, streamed download
//! - `pipelines/`: concurrent mirror probing

mod operations;
mod pipelines;
mod pure;
mod types;

// Re-export types
pub use types::{
    MIRROR_DOWNLOAD_TIMEOUT, PRIMARY_CHECK_TIMEOUT, PRIMARY_DOWNLOAD_TIMEOUT, PROBE_TIMEOUT,
    Timeout,
};

// Re-export operations
pub use operations::{build_client, fetch_status, stream_to_file};
#[cfg(test)]
pub(crate) use operations::serve_cut_off_body;

// Re-export pipelines
pub use pipelines::find_reachable_mirror;

// Re-export pure functions
pub use pure::{browser_headers, mirror_url, primary_url, proxy_page_url};
