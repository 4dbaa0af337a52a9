//! Job pipelines - composes metadata, fetch, archive and install steps

mod acquire;

pub use acquire::{AcquireContext, run_job};
