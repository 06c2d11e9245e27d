//! Service layer for the job crawler.
//!
//! This module contains the business logic for:
//! - Page fetching over HTTP or from disk (`DocumentFetcher`)
//! - Relay routing and the proxy list (`Routing`, `ProxySource`)
//! - Fetch-with-retry and anchor extraction (`FetchEngine`)
//! - Posting identity (`identity::assign`)

pub mod engine;
pub mod extract;
pub mod fetcher;
pub mod identity;
pub mod proxies;
pub mod relay;

pub use engine::{FetchEngine, Lineage, RetryPolicy};
pub use fetcher::{Document, DocumentFetcher, FileFetcher, HttpFetcher};
pub use proxies::ProxySource;
pub use relay::{Relay, RelayPool, Routing};
