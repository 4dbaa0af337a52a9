//! Pure helpers for Steam root discovery

use std::path::{Path, PathBuf};

/// Expand a leading `~` against `home`
pub fn expand_home(raw: &str, home: Option<&Path>) -> PathBuf {
    match (raw.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home.to_path_buf(),
        (Some(rest), Some(home)) if rest.starts_with(['/', '\\']) => home.join(&rest[1..]),
        _ => PathBuf::from(raw),
    }
}

/// Pull the `SteamPath` value out of `reg query ... /v SteamPath` output.
///
/// Matching lines look like `    SteamPath    REG_SZ    c:/program files (x86)/steam`.
pub fn parse_reg_query_output(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let rest = line.trim_start().strip_prefix("SteamPath")?;
        let (_, value) = rest.trim_start().split_once("REG_SZ")?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Well-known install locations for the current platform
pub fn default_steam_paths(home: Option<&Path>) -> Vec<PathBuf> {
    if cfg!(windows) {
        return vec![
            PathBuf::from(r"C:\Program Files (x86)\Steam"),
            PathBuf::from(r"C:\Program Files\Steam"),
            PathBuf::from(r"D:\Program Files (x86)\Steam"),
        ];
    }

    let Some(home) = home else {
        return Vec::new();
    };

    if cfg!(target_os = "macos") {
        return vec![home.join("Library/Application Support/Steam")];
    }

    vec![
        home.join(".local/share/Steam"),
        // Usually a symlink into the real install
        home.join(".steam/steam"),
        // Flatpak Steam
        home.join(".var/app/com.valvesoftware.Steam/.local/share/Steam"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home() {
        let home = Path::new("/home/user");
        assert_eq!(expand_home("~", Some(home)), PathBuf::from("/home/user"));
        assert_eq!(
            expand_home("~/.steam/steam", Some(home)),
            PathBuf::from("/home/user/.steam/steam")
        );
        assert_eq!(expand_home("/opt/steam", Some(home)), PathBuf::from("/opt/steam"));
        assert_eq!(expand_home("~other/x", Some(home)), PathBuf::from("~other/x"));
        assert_eq!(expand_home("~/x", None), PathBuf::from("~/x"));
    }

    #[test]
    fn test_parse_reg_query_output() {
        let output = "\r\nHKEY_CURRENT_USER\\Software\\Valve\\Steam\r\n    SteamPath    REG_SZ    c:/program files (x86)/steam\r\n\r\n";
        assert_eq!(
            parse_reg_query_output(output),
            Some("c:/program files (x86)/steam".to_string())
        );
    }

    #[test]
    fn test_parse_reg_query_output_without_value() {
        assert_eq!(parse_reg_query_output(""), None);
        assert_eq!(
            parse_reg_query_output("    SteamExe    REG_SZ    c:/steam/steam.exe"),
            None
        );
        assert_eq!(parse_reg_query_output("    SteamPath    REG_SZ    "), None);
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn test_linux_defaults_follow_home() {
        let paths = default_steam_paths(Some(Path::new("/home/user")));
        assert_eq!(paths[0], PathBuf::from("/home/user/.local/share/Steam"));
        assert_eq!(paths.len(), 3);
        assert!(default_steam_paths(None).is_empty());
    }
}
