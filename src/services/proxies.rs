// src/services/proxies.rs

//! Proxy source adapter.
//!
//! Fetches a plain-text list of `host:port` relays and normalizes each
//! entry into a scheme-qualified endpoint.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::services::relay::Relay;

static HOST_PORT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.\-\[\]:]+:\d{1,5}$").ok());

/// Remote list of relay endpoints.
pub struct ProxySource {
    client: Client,
    list_url: String,
    scheme: String,
}

impl ProxySource {
    pub fn new(client: Client, list_url: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self {
            client,
            list_url: list_url.into(),
            scheme: scheme.into(),
        }
    }

    /// Download and parse the list. An empty list is returned as-is.
    pub async fn fetch(&self) -> Result<Vec<String>> {
        let body = self
            .client
            .get(&self.list_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let proxies = parse_proxy_list(&body, &self.scheme);
        log::info!("Proxy source returned {} relays", proxies.len());
        Ok(proxies)
    }
}

/// Split a newline-separated list into scheme-qualified endpoints.
///
/// Blank lines and `#` comments are skipped. Bare entries must look like
/// `host:port`; every entry must then parse as a relay, so one bad line
/// drops only itself.
pub fn parse_proxy_list(body: &str, scheme: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| qualify(line, scheme).ok())
        .collect()
}

fn qualify(entry: &str, scheme: &str) -> Result<String> {
    let endpoint = if entry.contains("://") {
        entry.to_string()
    } else if HOST_PORT.as_ref().is_some_and(|re| re.is_match(entry)) {
        format!("{scheme}://{entry}")
    } else {
        log::debug!("Ignoring proxy list entry {entry:?}");
        return Err(AppError::proxy(format!("not a host:port entry: {entry}")));
    };

    match Relay::parse(&endpoint) {
        Ok(relay) => Ok(relay.endpoint().to_string()),
        Err(e) => {
            log::debug!("Ignoring proxy list entry {entry:?}: {e}");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct_client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    #[test]
    fn test_parse_prefixes_scheme() {
        let body = "10.0.0.1:8080\n\n  10.0.0.2:3128  \n# comment\n";
        assert_eq!(
            parse_proxy_list(body, "http"),
            vec!["http://10.0.0.1:8080", "http://10.0.0.2:3128"]
        );
    }

    #[test]
    fn test_parse_keeps_qualified_entries() {
        let body = "https://10.0.0.3:8443\nproxy.example.net:80";
        assert_eq!(
            parse_proxy_list(body, "http"),
            vec!["https://10.0.0.3:8443", "http://proxy.example.net:80"]
        );
    }

    #[test]
    fn test_parse_drops_malformed_qualified_entry() {
        let body = "10.0.0.1:8080\nhttp://bad host:99\n10.0.0.2:8080";
        assert_eq!(
            parse_proxy_list(body, "http"),
            vec!["http://10.0.0.1:8080", "http://10.0.0.2:8080"]
        );
    }

    #[test]
    fn test_parse_skips_garbage() {
        assert!(parse_proxy_list("<html>blocked</html>\nnot-a-proxy", "http").is_empty());
    }

    #[tokio::test]
    async fn test_fetch_reads_remote_list() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/proxies.txt")
            .with_status(200)
            .with_body("1.2.3.4:80\r\n5.6.7.8:8080\r\n")
            .create_async()
            .await;

        let source = ProxySource::new(
            direct_client(),
            format!("{}/proxies.txt", server.url()),
            "http",
        );
        assert_eq!(
            source.fetch().await.unwrap(),
            vec!["http://1.2.3.4:80", "http://5.6.7.8:8080"]
        );
    }

    #[tokio::test]
    async fn test_fetch_fails_on_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/proxies.txt")
            .with_status(500)
            .create_async()
            .await;

        let source = ProxySource::new(
            direct_client(),
            format!("{}/proxies.txt", server.url()),
            "http",
        );
        assert!(source.fetch().await.is_err());
    }
}
