//! Snapshot publishing.
//!
//! Produces the artifacts downstream consumers read after a run:
//!
//! ```text
//! {root}/
//! ├── jobs.db            # sealed posting store
//! ├── metadata.json      # {last_updated, checksum, job_count}
//! └── data/
//!     └── jobs.json      # raw output of the last run
//! ```
//!
//! The checksum is the SHA-256 of the sealed database file, so it must be
//! computed only after [`PostingStore::seal_and_close`](super::PostingStore::seal_and_close).

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::JobList;

/// Contents of `metadata.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotMetadata {
    /// Epoch seconds of the publish step
    pub last_updated: i64,
    /// Lowercase hex SHA-256 of the store file
    pub checksum: String,
    /// Postings processed by the run that published this record
    pub job_count: usize,
}

impl SnapshotMetadata {
    /// Load a previously published record.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Whether the store file still hashes to the recorded checksum.
    pub fn verify(&self, store_path: impl AsRef<Path>) -> Result<bool> {
        Ok(checksum_file(store_path)? == self.checksum)
    }
}

/// Stream a file through SHA-256 and return the lowercase hex digest.
pub fn checksum_file(path: impl AsRef<Path>) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Writes the metadata record and the optional raw export.
#[derive(Debug, Clone)]
pub struct SnapshotPublisher {
    metadata_path: PathBuf,
    jobs_path: Option<PathBuf>,
}

impl SnapshotPublisher {
    pub fn new(metadata_path: impl Into<PathBuf>) -> Self {
        Self {
            metadata_path: metadata_path.into(),
            jobs_path: None,
        }
    }

    /// Also export the run's postings to `jobs_path`.
    pub fn with_jobs_export(mut self, jobs_path: impl Into<PathBuf>) -> Self {
        self.jobs_path = Some(jobs_path.into());
        self
    }

    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// Hash the sealed store and write `metadata.json`.
    pub async fn publish(
        &self,
        store_path: impl AsRef<Path>,
        processed_count: usize,
    ) -> Result<SnapshotMetadata> {
        let store_path = store_path.as_ref();
        let checksum = checksum_file(store_path).map_err(|e| {
            AppError::publish(format!("cannot hash {}: {e}", store_path.display()))
        })?;

        let metadata = SnapshotMetadata {
            last_updated: Utc::now().timestamp(),
            checksum,
            job_count: processed_count,
        };

        write_json(&self.metadata_path, &metadata)
            .await
            .map_err(|e| {
                AppError::publish(format!(
                    "cannot write {}: {e}",
                    self.metadata_path.display()
                ))
            })?;

        log::info!(
            "Published metadata to {} (checksum {}, {} jobs)",
            self.metadata_path.display(),
            metadata.checksum,
            metadata.job_count
        );
        Ok(metadata)
    }

    /// Write the raw run output. Returns the path written, if export is enabled.
    pub async fn export_jobs(&self, jobs: &JobList) -> Result<Option<PathBuf>> {
        let Some(path) = &self.jobs_path else {
            return Ok(None);
        };
        write_json(path, jobs).await?;
        log::info!("Exported {} jobs to {}", jobs.jobs.len(), path.display());
        Ok(Some(path.clone()))
    }
}

/// Ensure parent directory exists.
async fn ensure_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

/// Write bytes atomically (write to temp, then rename).
async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_dir(path).await?;

    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Write pretty-printed JSON.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_bytes(path, &bytes).await
}
