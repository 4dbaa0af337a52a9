use reqwest::StatusCode;
use reqwest::blocking::Client;

/// GET `url` and report only its status. The body is never read.
pub fn fetch_status(client: &Client, url: &str) -> Result<StatusCode, reqwest::Error> {
    client.get(url).send().map(|response| response.status())
}

/// True only for a 2xx answer; every error counts as unreachable.
pub fn check_reachable(client: &Client, url: &str) -> bool {
    match fetch_status(client, url) {
        Ok(status) => status.is_success(),
        Err(e) => {
            tracing::debug!("{} unreachable: {}", url, e);
            false
        }
    }
}
