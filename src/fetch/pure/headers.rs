//! Request headers for the mirror host
//!
//! The mirror host filters out requests that don't look like they come
//! from a browser navigation, so mirrored downloads carry a fixed header bag.

use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/141.0.0.0 Safari/537.36";

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,\
image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";

const FIXED: &[(&str, &str)] = &[
    ("sec-ch-ua", "\"Chromium\";v=\"141\", \"Not?A_Brand\";v=\"8\""),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Windows\""),
    ("accept-language", "zh-CN,zh;q=0.9"),
    ("upgrade-insecure-requests", "1"),
    ("user-agent", USER_AGENT),
    ("accept", ACCEPT),
    ("sec-fetch-site", "same-origin"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-user", "?1"),
    ("sec-fetch-dest", "document"),
    ("priority", "u=0, i"),
];

/// Browser-like headers for a download from `mirror_base`.
///
/// `Host` and `Referer` follow the mirror base URL. No `Accept-Encoding` is
/// sent: the body is written to disk as received.
pub fn browser_headers(mirror_base: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for &(name, value) in FIXED {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    if let Ok(url) = Url::parse(mirror_base)
        && let Some(host) = url.host_str()
    {
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        if let Ok(value) = HeaderValue::from_str(&authority) {
            headers.insert(reqwest::header::HOST, value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("{}://{}/", url.scheme(), authority)) {
            headers.insert(reqwest::header::REFERER, value);
        }
    }

    headers
}
