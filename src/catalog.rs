use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

/// One generated file known to the catalog. `file_path` is the
/// slash-separated path relative to the site root and unique within the
/// catalog; `last_transferred_at` is the `YYYY-MM-DD HH:MM:SS` UTC time of
/// the last successful transfer, if any.
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: i64,
    pub file_path: String,
    pub last_transferred_at: Option<String>,
}

/// SQLite-backed catalog of the generated site plus a small key/value meta
/// table (the run epoch lives there). Rows with an empty `file_path` are
/// tolerated but invisible to every selector.
pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(&path).with_context(|| {
            format!("cannot open catalog database {}", path.as_ref().display())
        })?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS pages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_path TEXT UNIQUE NOT NULL,
                last_transferred_at TEXT
            )",
            [],
        )
        .context("cannot create pages table")?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .context("cannot create meta table")?;
        Ok(Catalog { conn })
    }

    /// Record a generated file. Returns true when the path was not yet known.
    /// Re-recording an existing path leaves its transfer state untouched.
    pub fn upsert_path(&self, file_path: &str) -> Result<bool> {
        let inserted = self
            .conn
            .execute("INSERT OR IGNORE INTO pages (file_path) VALUES (?1)", params![file_path])
            .context("cannot insert page record")?;
        Ok(inserted > 0)
    }

    /// Up to `limit` records still eligible against `epoch`: non-empty path
    /// and never transferred, or last transferred before the epoch. Ordered
    /// by path so batches are deterministic.
    pub fn select_pending(&self, epoch: &str, limit: usize) -> Result<Vec<PageRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, file_path, last_transferred_at FROM pages
                 WHERE file_path != ''
                   AND (last_transferred_at IS NULL OR last_transferred_at < ?1)
                 ORDER BY file_path
                 LIMIT ?2",
            )
            .context("cannot prepare pending query")?;
        let rows = stmt
            .query_map(params![epoch, limit as i64], |row| {
                Ok(PageRecord {
                    id: row.get(0)?,
                    file_path: row.get(1)?,
                    last_transferred_at: row.get(2)?,
                })
            })
            .context("cannot query pending records")?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row.context("cannot read page record")?);
        }
        Ok(records)
    }

    /// Unbounded count of records matching the pending filter.
    pub fn count_pending(&self, epoch: &str) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM pages
                 WHERE file_path != ''
                   AND (last_transferred_at IS NULL OR last_transferred_at < ?1)",
                params![epoch],
                |row| row.get(0),
            )
            .context("cannot count pending records")?;
        Ok(count as u64)
    }

    /// Count of every record with a non-empty path, regardless of transfer
    /// state. This is the stable progress denominator: it must not shrink as
    /// files get marked transferred.
    pub fn count_total(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages WHERE file_path != ''", [], |row| row.get(0))
            .context("cannot count records")?;
        Ok(count as u64)
    }

    /// Count of records never transferred at all (status display).
    pub fn count_never_transferred(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM pages
                 WHERE file_path != '' AND last_transferred_at IS NULL",
                [],
                |row| row.get(0),
            )
            .context("cannot count untransferred records")?;
        Ok(count as u64)
    }

    pub fn mark_transferred(&self, file_path: &str, timestamp: &str) -> Result<()> {
        self.conn
            .execute(
                "UPDATE pages SET last_transferred_at = ?2 WHERE file_path = ?1",
                params![file_path, timestamp],
            )
            .context("cannot update transfer time")?;
        Ok(())
    }

    /// Forget every per-file transfer time; the next run re-uploads the whole
    /// site.
    pub fn clear_transfer_state(&self) -> Result<()> {
        self.conn
            .execute("UPDATE pages SET last_transferred_at = NULL", [])
            .context("cannot clear transfer state")?;
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM meta WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
            .context("cannot read meta value")
    }

    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .context("cannot write meta value")?;
        Ok(())
    }

    pub fn delete_meta(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM meta WHERE key = ?1", params![key])
            .context("cannot delete meta value")?;
        Ok(())
    }
}
