use crate::config::types::AppConfig;

use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn load_cfg(path: &Path) -> AppConfig {
    if let Ok(file) = File::open(path) {
        match serde_json::from_reader::<_, AppConfig>(BufReader::new(file)) {
            Ok(config) => return config,
            Err(e) => tracing::warn!("ignoring unreadable {}: {}", path.display(), e),
        }
    }

    // Return default settings if file doesn't exist or has error
    AppConfig::default()
}

pub fn save_cfg(path: &Path, config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, config)?;
    Ok(())
}
