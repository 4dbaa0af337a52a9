//! Filtered archive extraction
//!
//! A downloaded ZIP is unpacked into a scratch directory next to the target,
//! allow-listed files are moved flat into the target, and the scratch
//! directory is always removed afterwards.
//!
//! ## Module Structure
//! - `types.rs`: ExtractionSummary, allow-list
//! - `pure.rs`: extension matching, staging path derivation
//! - `operations.rs`: extraction and move

mod operations;
mod pure;
mod types;

pub use operations::extract_filtered;
pub use types::{ALLOWED_EXTENSIONS, ExtractionSummary};

#[cfg(test)]
pub(crate) use operations::write_test_zip;
#[cfg(test)]
pub(crate) use pure::staging_dir_for;
