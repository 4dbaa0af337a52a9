//! Fetch operations - atomic network side effects

mod client;
mod download;
mod reachability;

pub use client::build_client;
pub use download::stream_to_file;
#[cfg(test)]
pub(crate) use download::serve_cut_off_body;
pub use reachability::{check_reachable, fetch_status};
