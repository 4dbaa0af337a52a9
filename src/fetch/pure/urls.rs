//! Endpoint construction for both sources

use super::encoding::base32_encode;

/// Archive location on the primary host
pub fn primary_url(base: &str, app_id: &str) -> String {
    format!("{}/{}.zip", base.trim_end_matches('/'), app_id)
}

/// Download endpoint of mirror node `node`
pub fn mirror_url(base: &str, app_id: &str, node: usize) -> String {
    format!(
        "{}/download?id={}&src={}",
        base.trim_end_matches('/'),
        base32_encode(app_id),
        node
    )
}

/// Info page the mirror host renders for an app
pub fn proxy_page_url(base: &str, app_id: &str) -> String {
    format!("{}/proxy?id={}", base.trim_end_matches('/'), base32_encode(app_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_url() {
        assert_eq!(
            primary_url("https://example.com/archive/refs/heads/", "480"),
            "https://example.com/archive/refs/heads/480.zip"
        );
    }

    #[test]
    fn test_mirror_url_is_deterministic_per_node() {
        let a = mirror_url("https://mirror.example", "480", 3);
        assert_eq!(a, "https://mirror.example/download?id=GQ4DA&src=3");
        assert_eq!(a, mirror_url("https://mirror.example", "480", 3));
        assert_ne!(a, mirror_url("https://mirror.example", "480", 4));
    }

    #[test]
    fn test_proxy_page_url() {
        assert_eq!(
            proxy_page_url("https://mirror.example", "480"),
            "https://mirror.example/proxy?id=GQ4DA"
        );
    }
}
