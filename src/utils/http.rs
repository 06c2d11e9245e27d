// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, REFERER};

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;
use crate::services::relay::Relay;

/// Headers sent with every page request.
pub fn default_headers(config: &CrawlerConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value("Accept", &config.accept)?);
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value("Accept-Language", &config.accept_language)?,
    );
    if let Some(referer) = &config.referer {
        headers.insert(REFERER, header_value("Referer", referer)?);
    }
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::config(format!("Invalid header name '{name}': {e}")))?;
        let value = header_value(name.as_str(), value)?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::config(format!("Invalid value for header '{name}': {e}")))
}

/// Create a configured asynchronous HTTP client, optionally behind a relay.
pub fn create_async_client(
    config: &CrawlerConfig,
    relay: Option<&Relay>,
) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(default_headers(config)?)
        .timeout(Duration::from_secs(config.timeout_secs));

    builder = match relay {
        Some(relay) => builder.proxy(reqwest::Proxy::all(relay.endpoint())?),
        None => builder.no_proxy(),
    };

    Ok(builder.build()?)
}

/// Create a direct client for auxiliary requests such as the proxy list.
pub fn create_plain_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .no_proxy()
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_headers_include_extras() {
        let mut config = CrawlerConfig::default();
        config.referer = Some("https://recruitment.nic.in/".to_string());
        config
            .headers
            .insert("X-Requested-With".to_string(), "XMLHttpRequest".to_string());

        let headers = default_headers(&config).unwrap();
        assert_eq!(headers[REFERER], "https://recruitment.nic.in/");
        assert_eq!(headers["x-requested-with"], "XMLHttpRequest");
        assert!(headers.contains_key(ACCEPT));
    }

    #[test]
    fn test_default_headers_reject_invalid_name() {
        let mut config = CrawlerConfig::default();
        config.headers.insert("bad header".to_string(), "1".to_string());
        assert!(default_headers(&config).is_err());
    }

    #[test]
    fn test_client_builds_with_relay() {
        let config = CrawlerConfig::default();
        let relay = Relay::parse("http://10.0.0.1:3128").unwrap();
        assert!(create_async_client(&config, Some(&relay)).is_ok());
        assert!(create_async_client(&config, None).is_ok());
    }
}
