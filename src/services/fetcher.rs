// src/services/fetcher.rs

//! Document fetching.
//!
//! The engine depends only on [`DocumentFetcher`]; `HttpFetcher` serves
//! `http(s)` targets and `FileFetcher` serves local `file://` pages.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;
use crate::services::relay::{Relay, Routing};
use crate::utils::http::create_async_client;

/// A fetched page and the URL its relative links resolve against.
#[derive(Debug, Clone)]
pub struct Document {
    /// Final URL after redirects
    pub base_url: Url,
    pub body: String,
}

/// Capability: fetch the document at `url`, optionally through `relay`.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &Url, relay: Option<&Relay>) -> Result<Document>;
}

/// reqwest-backed fetcher with one client per route.
pub struct HttpFetcher {
    direct: Client,
    relayed: HashMap<String, Client>,
}

impl HttpFetcher {
    /// Build clients for direct access and for every relay `routing` can select.
    pub fn new(config: &CrawlerConfig, routing: &Routing) -> Result<Self> {
        let direct = create_async_client(config, None)?;
        let mut relayed = HashMap::new();
        for relay in routing.relays() {
            let client = create_async_client(config, Some(relay))?;
            relayed.insert(relay.endpoint().to_string(), client);
        }
        Ok(Self { direct, relayed })
    }

    fn client_for(&self, relay: Option<&Relay>) -> Result<&Client> {
        match relay {
            None => Ok(&self.direct),
            Some(relay) => self
                .relayed
                .get(relay.endpoint())
                .ok_or_else(|| AppError::proxy(format!("no client configured for {relay}"))),
        }
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, relay: Option<&Relay>) -> Result<Document> {
        let response = self
            .client_for(relay)?
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;
        let base_url = response.url().clone();
        let body = response.text().await?;
        Ok(Document { base_url, body })
    }
}

/// Reads `file://` targets from disk; relays do not apply.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFetcher;

#[async_trait]
impl DocumentFetcher for FileFetcher {
    async fn fetch(&self, url: &Url, _relay: Option<&Relay>) -> Result<Document> {
        let path = url
            .to_file_path()
            .map_err(|_| AppError::fetch(url.as_str(), "not a local file URL"))?;
        let body = tokio::fs::read_to_string(&path).await?;
        Ok(Document {
            base_url: url.clone(),
            body,
        })
    }
}

/// Pick the fetcher that serves `target`'s scheme.
pub fn for_target(
    target: &Url,
    config: &CrawlerConfig,
    routing: &Routing,
) -> Result<Box<dyn DocumentFetcher>> {
    match target.scheme() {
        "file" => Ok(Box::new(FileFetcher)),
        "http" | "https" => Ok(Box::new(HttpFetcher::new(config, routing)?)),
        other => Err(AppError::config(format!(
            "No fetcher for scheme '{other}' ({target})"
        ))),
    }
}
