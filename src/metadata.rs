//! Display name and header image lookup for an app id.
//!
//! The store API is asked first; whatever it leaves missing is filled in from
//! the mirror host's proxy page. Every failure degrades to "unknown" rather
//! than an error, since the name only decides the folder a job extracts into.

use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::config::Endpoints;
use crate::fetch::{Timeout, build_client, proxy_page_url};

const STORE_TIMEOUT: Duration = Duration::from_secs(5);
const PROXY_TIMEOUT: Duration = Duration::from_secs(8);

/// Folder used when a name sanitizes down to nothing
pub const FALLBACK_FOLDER: &str = "steam_app";

static RESERVED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]"#).unwrap());
static GAME_INFO_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div[^>]*\bclass\s*=\s*["'][^"']*\bgame-info\b[^"']*["'][^>]*>"#)
        .unwrap()
});
static DIV_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<(/?)div\b[^>]*>").unwrap());
static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h2[^>]*>(.*?)</h2>").unwrap());
static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<img[^>]*\bsrc\s*=\s*["']([^"']+)["']"#).unwrap()
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppInfo {
    pub name: Option<String>,
    pub header_image: Option<String>,
}

impl AppInfo {
    fn is_complete(&self) -> bool {
        self.name.is_some() && self.header_image.is_some()
    }

    /// Keep what we have, take the rest from `other`
    fn fill_from(self, other: AppInfo) -> AppInfo {
        AppInfo {
            name: self.name.or(other.name),
            header_image: self.header_image.or(other.header_image),
        }
    }

    /// Sanitized name, or the raw id when no name is known
    pub fn folder_name(&self, app_id: &str) -> String {
        match &self.name {
            Some(name) => sanitize_folder_name(name),
            None => app_id.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct StoreEntry {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<StoreData>,
}

#[derive(Deserialize)]
struct StoreData {
    name: Option<String>,
    header_image: Option<String>,
}

/// Replace path-reserved characters with `_` and trim.
///
/// Names that would not name a directory of their own (empty, `.`, `..`)
/// become `FALLBACK_FOLDER`.
pub fn sanitize_folder_name(name: &str) -> String {
    let cleaned = RESERVED_CHARS.replace_all(name, "_");
    let cleaned = cleaned.trim();
    if cleaned.chars().all(|c| c == '.') {
        FALLBACK_FOLDER.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Look up whatever is known about `app_id`. Never fails.
pub fn fetch_app_info(endpoints: &Endpoints, app_id: &str) -> AppInfo {
    let info = from_store(&endpoints.store_api, app_id).unwrap_or_default();
    if info.is_complete() {
        return info;
    }
    let proxy = from_proxy_page(&endpoints.mirror_base, app_id).unwrap_or_default();
    info.fill_from(proxy)
}

fn from_store(store_api: &str, app_id: &str) -> Option<AppInfo> {
    let client = build_client(Timeout::Overall(STORE_TIMEOUT)).ok()?;
    let response = client
        .get(store_api)
        .query(&[("appids", app_id), ("cc", "CN"), ("l", "schinese")])
        .send()
        .and_then(|r| r.error_for_status());

    let response = match response {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("app details lookup failed: {}", e);
            return None;
        }
    };

    let mut entries: HashMap<String, StoreEntry> = match response.json() {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("unexpected app details response: {}", e);
            return None;
        }
    };

    let entry = entries.remove(app_id)?;
    if !entry.success {
        return None;
    }
    let data = entry.data?;
    Some(AppInfo {
        name: data.name.filter(|n| !n.trim().is_empty()),
        header_image: data.header_image.filter(|u| !u.is_empty()),
    })
}

fn from_proxy_page(mirror_base: &str, app_id: &str) -> Option<AppInfo> {
    let url = proxy_page_url(mirror_base, app_id);
    let client = build_client(Timeout::Overall(PROXY_TIMEOUT)).ok()?;
    let body = client
        .get(&url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text());

    match body {
        Ok(html) => parse_game_info(&html),
        Err(e) => {
            tracing::warn!("proxy page lookup failed: {}", e);
            None
        }
    }
}

/// Pull the title and first image out of the `game-info` block of a proxy page
pub fn parse_game_info(html: &str) -> Option<AppInfo> {
    let block = game_info_block(html)?;

    let name = TITLE
        .captures(block)
        .and_then(|c| c.get(1))
        .map(|m| decode_entities(TAG.replace_all(m.as_str(), "").trim()))
        .filter(|n| !n.is_empty());
    let header_image = IMG_SRC
        .captures(block)
        .and_then(|c| c.get(1))
        .map(|m| decode_entities(m.as_str()));

    Some(AppInfo { name, header_image })
}

/// Inner HTML of the `game-info` div, up to its matching `</div>`.
/// An unclosed block runs to the end of the page.
fn game_info_block(html: &str) -> Option<&str> {
    let rest = &html[GAME_INFO_OPEN.find(html)?.end()..];
    let mut depth = 1usize;
    for tag in DIV_TAG.captures_iter(rest) {
        let closing = tag.get(1).is_some_and(|m| !m.is_empty());
        if !closing {
            depth += 1;
            continue;
        }
        depth -= 1;
        if depth == 0 {
            return tag.get(0).map(|m| &rest[..m.start()]);
        }
    }
    Some(rest)
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn endpoints(server: &MockServer) -> Endpoints {
        Endpoints {
            primary_base: server.url("/heads"),
            mirror_base: server.base_url(),
            store_api: server.url("/api/appdetails"),
            mirror_count: 6,
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_folder_name("Half-Life: Source"), "Half-Life_ Source");
        assert_eq!(sanitize_folder_name(r#"a\b/c*d?e"f<g>h|i"#), "a_b_c_d_e_f_g_h_i");
        assert_eq!(sanitize_folder_name("  Spacewar  "), "Spacewar");
        assert_eq!(sanitize_folder_name("   "), FALLBACK_FOLDER);
        assert_eq!(sanitize_folder_name(""), FALLBACK_FOLDER);
        assert_eq!(sanitize_folder_name("."), FALLBACK_FOLDER);
        assert_eq!(sanitize_folder_name(" .. "), FALLBACK_FOLDER);
        assert_eq!(sanitize_folder_name("..."), FALLBACK_FOLDER);
        assert_eq!(sanitize_folder_name("Half-Life..."), "Half-Life...");
    }

    #[test]
    fn test_dot_names_stay_inside_download_root() {
        let info = AppInfo {
            name: Some("..".to_string()),
            header_image: None,
        };
        assert_eq!(info.folder_name("480"), FALLBACK_FOLDER);
    }

    #[test]
    fn test_folder_name_falls_back_to_id() {
        assert_eq!(AppInfo::default().folder_name("480"), "480");
        let info = AppInfo {
            name: Some("Portal 2".to_string()),
            header_image: None,
        };
        assert_eq!(info.folder_name("620"), "Portal 2");
    }

    #[test]
    fn test_parse_game_info() {
        let html = r#"<html><body>
            <div class="card game-info">
              <img class="cover" src="https://cdn.example/480/header.jpg" />
              <h2> <span>Tom &amp; Jerry</span> </h2>
            </div></body></html>"#;

        let info = parse_game_info(html).unwrap();
        assert_eq!(info.name.as_deref(), Some("Tom & Jerry"));
        assert_eq!(
            info.header_image.as_deref(),
            Some("https://cdn.example/480/header.jpg")
        );
    }

    #[test]
    fn test_title_outside_block_is_ignored() {
        let html = r#"<div class="game-info"><img src="/h.jpg"></div><div class="ad"><h2>Sponsored</h2></div>"#;

        let info = parse_game_info(html).unwrap();
        assert_eq!(info.name, None);
        assert_eq!(info.header_image.as_deref(), Some("/h.jpg"));
    }

    #[test]
    fn test_nested_divs_stay_in_block() {
        let html = r#"<div class="game-info">
              <div class="cover"><img src="/cover.jpg"></div>
              <div class="title"><h2>Portal 2</h2></div>
            </div>
            <div class="related"><h2>Portal</h2></div>"#;

        let info = parse_game_info(html).unwrap();
        assert_eq!(info.name.as_deref(), Some("Portal 2"));
        assert_eq!(info.header_image.as_deref(), Some("/cover.jpg"));
    }

    #[test]
    fn test_parse_without_block() {
        assert!(parse_game_info("<div class=\"other\"><h2>x</h2></div>").is_none());
    }

    #[test]
    fn test_store_api_complete() {
        let server = MockServer::start();
        let store = server.mock(|when, then| {
            when.method(GET)
                .path("/api/appdetails")
                .query_param("appids", "480")
                .query_param("cc", "CN")
                .query_param("l", "schinese");
            then.status(200).json_body(serde_json::json!({
                "480": {
                    "success": true,
                    "data": { "name": "Spacewar", "header_image": "https://img/480.jpg" }
                }
            }));
        });
        let proxy = server.mock(|when, then| {
            when.method(GET).path("/proxy");
            then.status(200).body("");
        });

        let info = fetch_app_info(&endpoints(&server), "480");

        store.assert();
        assert_eq!(proxy.hits(), 0);
        assert_eq!(info.name.as_deref(), Some("Spacewar"));
        assert_eq!(info.header_image.as_deref(), Some("https://img/480.jpg"));
    }

    #[test]
    fn test_proxy_fills_gaps() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/appdetails");
            then.status(200)
                .json_body(serde_json::json!({ "730": { "success": false } }));
        });
        let proxy = server.mock(|when, then| {
            when.method(GET).path("/proxy").query_param("id", "G4ZTA");
            then.status(200).body(
                r#"<div class="game-info"><img src="/h.jpg"><h2>Counter-Strike 2</h2></div>"#,
            );
        });

        let info = fetch_app_info(&endpoints(&server), "730");

        proxy.assert();
        assert_eq!(info.name.as_deref(), Some("Counter-Strike 2"));
        assert_eq!(info.header_image.as_deref(), Some("/h.jpg"));
    }

    #[test]
    fn test_everything_down_is_unknown() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/appdetails");
            then.status(503);
        });
        server.mock(|when, then| {
            when.method(GET).path("/proxy");
            then.status(404);
        });

        let info = fetch_app_info(&endpoints(&server), "999999");
        assert_eq!(info, AppInfo::default());
        assert_eq!(info.folder_name("999999"), "999999");
    }
}
