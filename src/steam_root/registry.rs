//! Registry lookup through `reg query`

use std::path::PathBuf;
use std::process::Command;

use super::pure::parse_reg_query_output;
use super::types::STEAM_REGISTRY_KEYS;

/// Source of a `SteamPath` registry value
pub trait RegistryReader: Send + Sync {
    /// Values found, in lookup order
    fn steam_paths(&self) -> Vec<PathBuf>;
}

/// Reads `SteamPath` with the system `reg` tool
pub struct RegQuery {
    keys: Vec<String>,
}

impl Default for RegQuery {
    fn default() -> Self {
        Self {
            keys: STEAM_REGISTRY_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl RegistryReader for RegQuery {
    fn steam_paths(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();

        for key in &self.keys {
            let output = match Command::new("reg")
                .args(["query", key, "/v", "SteamPath"])
                .output()
            {
                Ok(output) if output.status.success() => output,
                Ok(_) => continue,
                Err(e) => {
                    tracing::debug!("reg query {} failed: {}", key, e);
                    continue;
                }
            };

            if let Some(value) = parse_reg_query_output(&String::from_utf8_lossy(&output.stdout)) {
                found.push(PathBuf::from(value));
            }
        }

        found
    }
}

/// The registry reader for this platform, if it has a registry
pub fn platform_registry() -> Option<Box<dyn RegistryReader>> {
    if cfg!(windows) {
        Some(Box::new(RegQuery::default()))
    } else {
        None
    }
}
