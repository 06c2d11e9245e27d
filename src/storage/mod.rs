//! Durable storage for postings and the published snapshot.
//!
//! - `sqlite`: the posting store, one upsert per posting, sealed once per run
//! - `snapshot`: checksum metadata and the raw JSON export of a run

pub mod snapshot;
pub mod sqlite;

// Re-export for convenience
pub use snapshot::{SnapshotMetadata, SnapshotPublisher, checksum_file};
pub use sqlite::PostingStore;
