//! Pipeline entry points for crawler operations.
//!
//! - `run_crawler`: fetch the target, persist postings, seal and publish

pub mod crawl;

pub use crawl::{RunSummary, resolve_routing, run_crawler};
