// src/pipeline/crawl.rs

//! Crawl-and-persist pipeline.
//!
//! fetch → extract → assign ids → upsert → seal → publish

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Candidate, Config, JobList, JobRecord, Posting};
use crate::services::fetcher;
use crate::services::{FetchEngine, ProxySource, Relay, RelayPool, RetryPolicy, Routing};
use crate::storage::{PostingStore, SnapshotMetadata, SnapshotPublisher};
use crate::utils::http::create_plain_client;

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Candidates the engine returned
    pub candidate_count: usize,
    /// Postings handed to the store (the published `job_count`)
    pub processed: usize,
    /// Upserts that failed and were skipped
    pub upsert_failures: usize,
    pub metadata: SnapshotMetadata,
    /// Raw export location, when one was written
    pub jobs_export: Option<PathBuf>,
}

/// Run the crawler against `config.site.target_url`, writing under `root`.
///
/// Fatal: store open, undispatchable target, seal, metadata publish.
/// Everything else is logged and the run continues.
pub async fn run_crawler(config: &Config, root: &Path) -> Result<RunSummary> {
    let started: DateTime<Utc> = Utc::now();
    let db_path = config.paths.database_path(root);

    // The store is untouched until the target is known to be dispatchable.
    let target = config.site.target()?;
    let routing = resolve_routing(config).await;
    let fetcher = fetcher::for_target(&target, &config.crawler, &routing)?;
    let engine = FetchEngine::new(fetcher, routing, RetryPolicy::from_config(config));

    log::info!("Step 1/5: Opening posting store");
    let store = PostingStore::open(&db_path)?;

    log::info!("Step 2/5: Fetching {}", config.site.target_url);
    let candidates = engine.run(target.as_str()).await?;

    let observed_date = started.format("%Y-%m-%d").to_string();
    let postings = assemble_postings(&candidates, config, &observed_date);
    log::info!(
        "Scraped {} postings from {} candidates. Inserting into store...",
        postings.len(),
        candidates.len()
    );

    log::info!("Step 3/5: Upserting postings");
    let upsert_failures = upsert_all(&store, &postings, Utc::now().timestamp());

    log::info!("Step 4/5: Sealing store");
    store.seal_and_close()?;

    log::info!("Step 5/5: Publishing snapshot");
    let mut publisher = SnapshotPublisher::new(config.paths.metadata_path(root));
    if config.paths.export_jobs {
        publisher = publisher.with_jobs_export(config.paths.jobs_json_path(root));
    }
    let metadata = publisher.publish(&db_path, postings.len()).await?;

    let processed = postings.len();
    let job_list = JobList {
        last_updated: started.timestamp(),
        jobs: postings,
    };
    let jobs_export = match publisher.export_jobs(&job_list).await {
        Ok(path) => path,
        Err(e) => {
            log::warn!("Failed to export raw jobs: {}", e);
            None
        }
    };

    Ok(RunSummary {
        candidate_count: candidates.len(),
        processed,
        upsert_failures,
        metadata,
        jobs_export,
    })
}

/// Decide how requests leave the process.
///
/// A static relay wins, then a fetched pool, then a direct connection.
/// A malformed static relay falls through to the pool; proxy source and
/// pool failures only downgrade to direct.
pub async fn resolve_routing(config: &Config) -> Routing {
    if let Some(endpoint) = config.proxy.static_relay() {
        match Relay::parse(endpoint) {
            Ok(relay) => return Routing::Static(relay),
            Err(e) => log::warn!("Ignoring static relay: {}", e),
        }
    }

    let Some(list_url) = config.proxy.list_url.as_deref() else {
        return Routing::Direct;
    };

    let client = match create_plain_client(&config.crawler) {
        Ok(client) => client,
        Err(e) => {
            log::warn!("Cannot build proxy source client: {}. Using direct.", e);
            return Routing::Direct;
        }
    };

    let endpoints = match ProxySource::new(client, list_url, &config.proxy.scheme)
        .fetch()
        .await
    {
        Ok(endpoints) => endpoints,
        Err(e) => {
            log::warn!("Proxy source {} failed: {}. Using direct.", list_url, e);
            return Routing::Direct;
        }
    };

    match RelayPool::new(&endpoints) {
        Ok(pool) => Routing::Pool(pool),
        Err(e) => {
            log::warn!("Relay pool unusable: {}. Using direct.", e);
            Routing::Direct
        }
    }
}

/// Turn candidates into postings, dropping blanks and repeated ids.
fn assemble_postings(
    candidates: &[Candidate],
    config: &Config,
    observed_date: &str,
) -> Vec<Posting> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .filter_map(|c| Posting::from_candidate(c, &config.site, observed_date))
        .filter(|p| seen.insert(p.id.clone()))
        .collect()
}

/// Upsert every posting; failures are logged and counted, never fatal.
fn upsert_all(store: &PostingStore, postings: &[Posting], posted_date: i64) -> usize {
    let mut failures = 0;
    for posting in postings {
        let record = JobRecord::from_posting(posting, posted_date);
        if let Err(e) = store.upsert(&record) {
            failures += 1;
            log::warn!("Failed to upsert job {} ({}): {}", posting.id, posting.url, e);
        }
    }
    failures
}
