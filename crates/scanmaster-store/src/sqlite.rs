// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SQLite-backed blob store.
//
// Schema:
//   blobs(
//     key        TEXT PRIMARY KEY,
//     value      BLOB NOT NULL,
//     checksum   TEXT NOT NULL,   -- SHA-256 hex digest of value
//     updated_at TEXT NOT NULL    -- RFC 3339
//   )

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use scanmaster_core::error::{Result, ScanmasterError};
use tracing::{debug, instrument, warn};

use crate::blob::BlobStore;
use crate::integrity::{hash_bytes, verify_hash};

// ---------------------------------------------------------------------------
// Local error helpers
// ---------------------------------------------------------------------------

/// Convert a `rusqlite::Error` into a `ScanmasterError::Database`.
fn db_err(e: rusqlite::Error) -> ScanmasterError {
    ScanmasterError::Database(e.to_string())
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS blobs (
    key        TEXT PRIMARY KEY,
    value      BLOB NOT NULL,
    checksum   TEXT NOT NULL,
    updated_at TEXT NOT NULL
);";

/// Durable blob store in a single SQLite file.
///
/// Each value is stored with its SHA-256 checksum, which is verified on every
/// read; a mismatch surfaces as `IntegrityMismatch` rather than bad data.
pub struct SqliteBlobStore {
    conn: Connection,
}

impl SqliteBlobStore {
    /// Open (or create) the store at `path`.
    ///
    /// The `blobs` table is created automatically if it does not already
    /// exist. WAL mode is enabled for better concurrent-read performance.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(db_err)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(db_err)?;
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        debug!("blob store opened");
        Ok(Self { conn })
    }

    /// Open an in-memory store (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        debug!("in-memory blob store opened");
        Ok(Self { conn })
    }

    /// Keys currently stored, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM blobs ORDER BY key ASC")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(db_err)?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row.map_err(db_err)?);
        }
        Ok(keys)
    }

    #[cfg(test)]
    pub(crate) fn conn_for_tests(&self) -> &Connection {
        &self.conn
    }
}

const UPSERT: &str = "INSERT INTO blobs (key, value, checksum, updated_at)
     VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT(key) DO UPDATE SET
         value = excluded.value,
         checksum = excluded.checksum,
         updated_at = excluded.updated_at";

impl BlobStore for SqliteBlobStore {
    #[instrument(skip(self))]
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let row: Option<(Vec<u8>, String)> = self
            .conn
            .query_row(
                "SELECT value, checksum FROM blobs WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(db_err)?;

        match row {
            Some((value, checksum)) => {
                if let Err(err) = verify_hash(&value, &checksum) {
                    warn!(key, "stored value failed its checksum");
                    return Err(err);
                }
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, value), fields(len = value.len()))]
    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.conn
            .execute(
                UPSERT,
                params![key, value, hash_bytes(value), Utc::now().to_rfc3339()],
            )
            .map_err(db_err)?;
        debug!("blob stored");
        Ok(())
    }

    /// All entries in one transaction; a failure leaves every key as it was.
    #[instrument(skip_all, fields(count = entries.len()))]
    fn put_many(&self, entries: &[(&str, &[u8])]) -> Result<()> {
        let tx = self.conn.unchecked_transaction().map_err(db_err)?;
        {
            let mut stmt = tx.prepare_cached(UPSERT).map_err(db_err)?;
            let now = Utc::now().to_rfc3339();
            for (key, value) in entries {
                stmt.execute(params![key, value, hash_bytes(value), now])
                    .map_err(db_err)?;
            }
        }
        tx.commit().map_err(db_err)?;
        debug!("blobs stored");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM blobs WHERE key = ?1", params![key])
            .map_err(db_err)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let removed = self.conn.execute("DELETE FROM blobs", []).map_err(db_err)?;
        debug!(removed, "blob store cleared");
        Ok(())
    }
}
