//! Fetch pipelines - high-level orchestration

mod mirror_probe;

pub use mirror_probe::find_reachable_mirror;
