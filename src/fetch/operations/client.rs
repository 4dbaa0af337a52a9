use reqwest::blocking::Client;

use crate::error::{AcquireError, AcquireResult};
use crate::fetch::types::Timeout;

/// Build a blocking client honoring the given timeout policy
pub fn build_client(timeout: Timeout) -> AcquireResult<Client> {
    let builder = Client::builder();
    let builder = match timeout {
        Timeout::Overall(total) => builder.timeout(total),
        Timeout::ConnectRead { connect, read } => builder.connect_timeout(connect).timeout(read),
    };

    builder
        .build()
        .map_err(|e| AcquireError::Client(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    #[test]
    fn test_read_budget_caps_whole_request() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).body("late").delay(Duration::from_millis(1500));
        });

        let client = build_client(Timeout::ConnectRead {
            connect: Duration::from_secs(2),
            read: Duration::from_millis(300),
        })
        .unwrap();
        let err = client.get(server.url("/slow")).send().unwrap_err();

        assert!(err.is_timeout(), "{}", err);
    }

    #[test]
    fn test_overall_budget_allows_slow_start() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).body("late").delay(Duration::from_millis(300));
        });

        let client = build_client(Timeout::Overall(Duration::from_secs(5))).unwrap();
        let body = client.get(server.url("/slow")).send().unwrap().text().unwrap();

        assert_eq!(body, "late");
    }
}
