//! Steam installation discovery
//!
//! Strategies run in a fixed order and the first existing path wins:
//! environment overrides, the Windows registry, well-known default paths,
//! and finally steamlocate. Nothing is cached; every install attempt
//! resolves again so a freshly moved or installed Steam is picked up.

mod pure;
mod registry;
mod types;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{AcquireError, AcquireResult};
use crate::paths::PATH_HOME;

use pure::{default_steam_paths, expand_home};
use registry::platform_registry;

pub use registry::RegistryReader;
pub use types::{DiscoveryMethod, InstallRoot, STEAM_ENV_KEYS};

type EnvLookup = Box<dyn Fn(&str) -> Option<OsString> + Send + Sync>;

pub struct SteamRootResolver {
    env_keys: Vec<String>,
    env: EnvLookup,
    registry: Option<Box<dyn RegistryReader>>,
    default_paths: Vec<PathBuf>,
    home: Option<PathBuf>,
    use_locator: bool,
}

impl SteamRootResolver {
    /// Resolver for the running system
    pub fn system() -> Self {
        let home = PATH_HOME.clone();
        Self {
            env_keys: STEAM_ENV_KEYS.iter().map(|k| k.to_string()).collect(),
            env: Box::new(|key| std::env::var_os(key)),
            registry: platform_registry(),
            default_paths: default_steam_paths(home.as_deref()),
            home,
            use_locator: true,
        }
    }

    /// Resolver with no sources at all; configure it with the `with_*` methods
    pub fn empty() -> Self {
        Self {
            env_keys: Vec::new(),
            env: Box::new(|_| None),
            registry: None,
            default_paths: Vec::new(),
            home: None,
            use_locator: false,
        }
    }

    pub fn with_env<F>(mut self, keys: &[&str], lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString> + Send + Sync + 'static,
    {
        self.env_keys = keys.iter().map(|k| k.to_string()).collect();
        self.env = Box::new(lookup);
        self
    }

    pub fn with_registry(mut self, registry: Box<dyn RegistryReader>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_default_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.default_paths = paths;
        self
    }

    /// Find the Steam root, or `InstallRootNotFound`
    pub fn resolve(&self) -> AcquireResult<InstallRoot> {
        let found = self
            .from_env()
            .map(|path| (path, DiscoveryMethod::EnvVar))
            .or_else(|| self.from_registry().map(|path| (path, DiscoveryMethod::Registry)))
            .or_else(|| self.from_defaults().map(|path| (path, DiscoveryMethod::DefaultPath)))
            .or_else(|| self.from_locator().map(|path| (path, DiscoveryMethod::Locator)));

        match found {
            Some((path, method)) => {
                tracing::info!("Steam root {} (via {})", path.display(), method);
                Ok(InstallRoot {
                    path: absolute(&path),
                    method,
                })
            }
            None => Err(AcquireError::InstallRootNotFound),
        }
    }

    fn from_env(&self) -> Option<PathBuf> {
        self.env_keys.iter().find_map(|key| {
            let raw = (self.env)(key)?;
            let raw = raw.to_string_lossy();
            if raw.is_empty() {
                return None;
            }
            let candidate = expand_home(&raw, self.home.as_deref());
            if candidate.exists() {
                Some(candidate)
            } else {
                tracing::warn!("{} points to missing {}, ignoring", key, candidate.display());
                None
            }
        })
    }

    fn from_registry(&self) -> Option<PathBuf> {
        self.registry
            .as_ref()?
            .steam_paths()
            .into_iter()
            .find(|path| path.exists())
    }

    fn from_defaults(&self) -> Option<PathBuf> {
        self.default_paths.iter().find(|path| path.exists()).cloned()
    }

    fn from_locator(&self) -> Option<PathBuf> {
        if !self.use_locator {
            return None;
        }
        match steamlocate::SteamDir::locate() {
            Ok(steam_dir) => Some(steam_dir.path().to_path_buf()),
            Err(e) => {
                tracing::debug!("steamlocate found nothing: {}", e);
                None
            }
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
