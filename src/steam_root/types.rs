//! Steam root type definitions

use std::fmt;
use std::path::PathBuf;

/// Environment overrides, checked in this order
pub const STEAM_ENV_KEYS: &[&str] = &["STEAM_PATH", "SteamPath", "STEAMPATH"];

/// Registry locations holding a `SteamPath` value, checked in this order
pub const STEAM_REGISTRY_KEYS: &[&str] = &[
    r"HKEY_CURRENT_USER\Software\Valve\Steam",
    r"HKEY_LOCAL_MACHINE\SOFTWARE\WOW6432Node\Valve\Steam",
    r"HKEY_LOCAL_MACHINE\SOFTWARE\Valve\Steam",
];

/// Which strategy produced an install root
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscoveryMethod {
    EnvVar,
    Registry,
    DefaultPath,
    /// steamlocate's own platform discovery, tried last
    Locator,
}

impl DiscoveryMethod {
    pub fn name(&self) -> &'static str {
        match self {
            DiscoveryMethod::EnvVar => "environment variable",
            DiscoveryMethod::Registry => "registry",
            DiscoveryMethod::DefaultPath => "default path",
            DiscoveryMethod::Locator => "steamlocate",
        }
    }
}

impl fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved Steam installation directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallRoot {
    pub path: PathBuf,
    pub method: DiscoveryMethod,
}
