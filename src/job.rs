//! Acquisition jobs
//!
//! A job downloads the manifest archive for one app id from the selected
//! source, extracts the allow-listed files into the download root, and
//! optionally copies `<appid>.lua` into Steam. Jobs run one at a time on a
//! background thread and report back over a channel.
//!
//! ## Module Structure
//! - `types.rs`: Job, JobState, JobEvent, JobReport, EventSink
//! - `operations/`: post-install copy into Steam
//! - `pipelines/`: the acquisition pipeline itself
//! - `runner.rs`: single-job background runner

mod operations;
mod pipelines;
mod runner;
mod types;

// Re-export types
pub use types::{Job, JobEvent, JobReport, PostInstall};

// Re-export pipelines
pub use pipelines::AcquireContext;

pub use runner::JobRunner;
