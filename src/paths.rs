use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Everything the tool writes lives next to where it was started.
pub static PATH_WORK: LazyLock<PathBuf> =
    LazyLock::new(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

pub static PATH_DOWNLOAD: LazyLock<PathBuf> = LazyLock::new(|| PATH_WORK.join("download"));

pub static PATH_CONFIG: LazyLock<PathBuf> = LazyLock::new(|| PATH_WORK.join("config.json"));

pub static PATH_LOG: LazyLock<PathBuf> = LazyLock::new(|| PATH_WORK.join("log"));

pub static PATH_HOME: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
});
