//! SQLite-backed posting store.
//!
//! The store is a single `jobs` table keyed by posting id. Writes run in
//! WAL mode; [`PostingStore::seal_and_close`] vacuums the file and returns
//! it to rollback-journal mode so only one self-contained file remains.
//!
//! ## Schema
//!
//! ```text
//! jobs(id TEXT PRIMARY KEY, title TEXT, department TEXT,
//!      location TEXT, posted_date INTEGER, url TEXT)
//! ```

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{AppError, Result};
use crate::models::JobRecord;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS jobs (
    id TEXT PRIMARY KEY,
    title TEXT,
    department TEXT,
    location TEXT,
    posted_date INTEGER,
    url TEXT
);
";

/// Exclusive writer handle on the posting database.
pub struct PostingStore {
    conn: Connection,
    path: PathBuf,
}

impl PostingStore {
    /// Open (or create) the store and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| AppError::storage_init(&path, e))?;
        }

        let conn = Connection::open(&path).map_err(|e| AppError::storage_init(&path, e))?;
        let _mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(|e| AppError::storage_init(&path, e))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::storage_init(&path, e))?;

        log::info!("Opened posting store at {}", path.display());
        Ok(Self { conn, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert the record, or replace every column of the existing row.
    pub fn upsert(&self, record: &JobRecord) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO jobs (id, title, department, location, posted_date, url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.title,
                record.department,
                record.location,
                record.posted_date,
                record.url
            ],
        )?;
        Ok(())
    }

    /// Total rows in the store, across all runs.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn get(&self, id: &str) -> Result<Option<JobRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, title, department, location, posted_date, url FROM jobs WHERE id = ?1",
                params![id],
                |row| {
                    Ok(JobRecord {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        department: row.get(2)?,
                        location: row.get(3)?,
                        posted_date: row.get(4)?,
                        url: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Compact the file, leave WAL mode, and close the handle.
    ///
    /// Must be the last call on the store. On error the file may be in an
    /// intermediate state and should not be published.
    pub fn seal_and_close(self) -> Result<()> {
        log::info!("Sealing posting store at {}", self.path.display());

        self.conn
            .execute_batch("VACUUM;")
            .map_err(|e| AppError::seal(format!("VACUUM failed: {e}")))?;

        let mode: String = self
            .conn
            .pragma_update_and_check(None, "journal_mode", "DELETE", |row| row.get(0))
            .map_err(|e| AppError::seal(format!("journal_mode switch failed: {e}")))?;
        if !mode.eq_ignore_ascii_case("delete") {
            return Err(AppError::seal(format!(
                "journal_mode is '{mode}' after switching to DELETE"
            )));
        }

        self.conn
            .close()
            .map_err(|(_, e)| AppError::seal(format!("close failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, title: &str, posted_date: i64) -> JobRecord {
        JobRecord {
            id: id.to_string(),
            title: title.to_string(),
            department: "NIC".to_string(),
            location: "All India".to_string(),
            posted_date,
            url: format!("https://recruitment.nic.in/{id}.pdf"),
        }
    }

    fn wal_path(db: &Path) -> PathBuf {
        let mut name = db.as_os_str().to_owned();
        name.push("-wal");
        PathBuf::from(name)
    }

    #[test]
    fn test_open_creates_file_and_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/jobs.db");
        let store = PostingStore::open(&path).unwrap();

        assert!(path.exists());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_open_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.db");
        std::fs::write(&path, vec![0x42u8; 4096]).unwrap();

        assert!(matches!(
            PostingStore::open(&path),
            Err(AppError::StorageInit { .. })
        ));
    }

    #[test]
    fn test_repeated_upsert_keeps_one_row_with_last_date() {
        let dir = TempDir::new().unwrap();
        let store = PostingStore::open(dir.path().join("jobs.db")).unwrap();

        for posted_date in [100, 200, 300] {
            store.upsert(&record("a", "Scientist B", posted_date)).unwrap();
        }

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get("a").unwrap().unwrap().posted_date, 300);
    }

    #[test]
    fn test_upsert_replaces_all_fields() {
        let dir = TempDir::new().unwrap();
        let store = PostingStore::open(dir.path().join("jobs.db")).unwrap();

        store.upsert(&record("a", "Old title", 1)).unwrap();
        let mut updated = record("a", "New title", 2);
        updated.location = "Delhi".to_string();
        store.upsert(&updated).unwrap();

        assert_eq!(store.get("a").unwrap(), Some(updated));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_rows_persist_across_runs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.db");

        let store = PostingStore::open(&path).unwrap();
        store.upsert(&record("a", "A", 1)).unwrap();
        store.seal_and_close().unwrap();

        let store = PostingStore::open(&path).unwrap();
        store.upsert(&record("b", "B", 2)).unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_seal_leaves_single_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.db");
        let store = PostingStore::open(&path).unwrap();
        store.upsert(&record("a", "A", 1)).unwrap();

        store.seal_and_close().unwrap();

        assert!(path.exists());
        assert!(!wal_path(&path).exists());

        let conn = Connection::open(&path).unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "delete");
    }
}
