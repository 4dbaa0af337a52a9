use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a job pulls its archive from
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Source {
    /// Single proxied GitHub host, fewer titles but usually closer
    #[default]
    #[serde(rename = "domestic", alias = "primary")]
    Primary,
    /// Set of mirror nodes, picked by first-reachable probing
    #[serde(rename = "overseas", alias = "mirrored")]
    Mirrored,
}

impl Source {
    pub fn other(self) -> Self {
        match self {
            Source::Primary => Source::Mirrored,
            Source::Mirrored => Source::Primary,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Source::Primary => "primary",
            Source::Mirrored => "mirrored",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Persisted settings. Loaded once at startup, saved on every change.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub download_source: Source,
    /// Copy `<appid>.lua` into Steam after a successful download
    #[serde(default)]
    pub auto_import: bool,
}

/// Remote endpoints used by a job. Not persisted; tests point these at a
/// local mock server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    /// Prefix of `<appid>.zip` on the primary host
    pub primary_base: String,
    /// Mirror host serving `/download` and `/proxy`
    pub mirror_base: String,
    /// Steam store app details API
    pub store_api: String,
    /// Number of mirror nodes behind `mirror_base`
    pub mirror_count: usize,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            primary_base: "https://proxy.pipers.cn/https://github.com/SteamAutoCracks/ManifestHub/archive/refs/heads".to_string(),
            mirror_base: "https://api-psi-eight-12.vercel.app".to_string(),
            store_api: "https://store.steampowered.com/api/appdetails".to_string(),
            mirror_count: 6,
        }
    }
}
