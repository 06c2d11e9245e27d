// src/models/mod.rs

//! Domain models for the job crawler.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod posting;

// Re-export all public types
pub use config::{Config, CrawlerConfig, PROXY_ENV, PathsConfig, ProxyConfig, SiteConfig};
pub use posting::{Candidate, JobList, JobRecord, Posting};
