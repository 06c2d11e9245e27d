// src/services/engine.rs

//! Fetch-and-extract engine.
//!
//! Owns the routing and retry policy for one target page. A run fetches the
//! page (retrying with a fixed backoff), extracts candidates, and returns.
//! Nothing survives between runs except what the engine was built with.

use std::time::Duration;

use url::Url;

use crate::error::Result;
use crate::models::{Candidate, Config};
use crate::services::extract::extract_candidates;
use crate::services::fetcher::{Document, DocumentFetcher};
use crate::services::relay::Routing;

/// Retry and timeout policy for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Sleep between attempts
    pub backoff: Duration,
    /// Bound on the whole fetch, retries included
    pub run_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.crawler.max_retries,
            backoff: Duration::from_millis(config.crawler.retry_backoff_ms),
            run_timeout: Duration::from_secs(config.crawler.run_timeout_secs),
        }
    }
}

/// Position of one logical request within its retry chain.
///
/// `attempt` counts retries already taken; `cursor` is the relay rotation
/// index for the next attempt. A fresh request starts at the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lineage {
    pub attempt: u32,
    pub cursor: usize,
}

impl Lineage {
    /// The lineage of the next retry, rotation cursor already advanced.
    pub fn retry(self, cursor: usize) -> Self {
        Self {
            attempt: self.attempt + 1,
            cursor,
        }
    }
}

/// Fetches a single target and extracts its candidates.
pub struct FetchEngine<F: ?Sized> {
    routing: Routing,
    policy: RetryPolicy,
    fetcher: Box<F>,
}

impl<F: DocumentFetcher + ?Sized> FetchEngine<F> {
    pub fn new(fetcher: Box<F>, routing: Routing, policy: RetryPolicy) -> Self {
        Self {
            routing,
            policy,
            fetcher,
        }
    }

    /// Fetch `target` and extract candidates.
    ///
    /// Only an undispatchable target is an error. Exhausted retries or an
    /// expired run timeout yield an empty candidate set.
    pub async fn run(&self, target: &str) -> Result<Vec<Candidate>> {
        let url = Url::parse(target.trim())?;
        log::info!("Visiting {} via {}", url, self.routing.describe());

        let fetched =
            tokio::time::timeout(self.policy.run_timeout, self.fetch_with_retry(&url)).await;

        let document = match fetched {
            Ok(Some(document)) => document,
            Ok(None) => return Ok(Vec::new()),
            Err(_) => {
                log::warn!(
                    "Run timeout of {:?} expired while fetching {}; abandoning",
                    self.policy.run_timeout,
                    url
                );
                return Ok(Vec::new());
            }
        };

        Ok(extract_candidates(&document))
    }

    /// Issue the request, retrying on failure until the budget is spent.
    async fn fetch_with_retry(&self, url: &Url) -> Option<Document> {
        let mut lineage = Lineage::default();
        loop {
            let (relay, next_cursor) = self.routing.select(lineage.cursor);

            match self.fetcher.fetch(url, relay).await {
                Ok(document) => return Some(document),
                Err(error) if lineage.attempt < self.policy.max_retries => {
                    let next = lineage.retry(next_cursor);
                    log::warn!(
                        "Request to {} failed ({}); retry {}/{} in {:?}",
                        url,
                        error,
                        next.attempt,
                        self.policy.max_retries,
                        self.policy.backoff
                    );
                    tokio::time::sleep(self.policy.backoff).await;
                    lineage = next;
                }
                Err(error) => {
                    log::warn!(
                        "Giving up on {} after {} attempts: {}",
                        url,
                        lineage.attempt + 1,
                        error
                    );
                    return None;
                }
            }
        }
    }
}
