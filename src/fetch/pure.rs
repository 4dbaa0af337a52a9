//! Pure functions for the fetch module
//!
//! These functions have no side effects and are deterministic.

mod encoding;
mod headers;
mod urls;

pub use encoding::base32_encode;
pub use headers::browser_headers;
pub use urls::{mirror_url, primary_url, proxy_page_url};
