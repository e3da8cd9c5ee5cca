// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All reads and writes go through tokio-rusqlite's single background thread.
//! Do NOT create additional connections for writes.

use std::path::Path;

use attune_core::AttuneError;
use tracing::debug;

use crate::migrations;

/// Handle to the attune SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` in WAL mode and
    /// applies pending migrations.
    pub async fn open(path: &str) -> Result<Self, AttuneError> {
        Self::open_with(path, true).await
    }

    /// Like [`open`](Self::open) with an explicit journal mode choice.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, AttuneError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| AttuneError::Storage {
                source: Box::new(e),
            })?;
        }

        // Migrations need an owned `&mut Connection`; run them on a blocking
        // connection before handing the file to the async one.
        let migrate_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), AttuneError> {
            let mut conn = rusqlite::Connection::open(&migrate_path).map_err(storage_err)?;
            let journal = if wal_mode { "WAL" } else { "DELETE" };
            conn.pragma_update_and_check(None, "journal_mode", journal, |_| Ok(()))
                .map_err(storage_err)?;
            migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(|e| AttuneError::Internal(format!("migration task failed: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(storage_err)?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA synchronous = NORMAL;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The async connection all queries run on.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL and closes the connection.
    pub async fn close(self) -> Result<(), AttuneError> {
        checkpoint(&self.conn).await?;
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Truncating WAL checkpoint.
pub(crate) async fn checkpoint(conn: &tokio_rusqlite::Connection) -> Result<(), AttuneError> {
    conn.call(|conn| -> Result<(), rusqlite::Error> {
        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    })
    .await
    .map_err(map_tr_err)
}

pub(crate) fn storage_err(e: rusqlite::Error) -> AttuneError {
    AttuneError::Storage {
        source: Box::new(e),
    }
}

/// Convert tokio-rusqlite errors to [`AttuneError::Storage`].
pub(crate) fn map_tr_err<E: std::fmt::Display>(e: tokio_rusqlite::Error<E>) -> AttuneError {
    AttuneError::Storage {
        source: format!("database error: {e}").into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("attune.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists());

        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap();
        for expected in ["annotations", "conversation_turns", "emotion_samples"] {
            assert!(tables.iter().any(|t| t == expected), "missing {expected}: {tables:?}");
        }
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("twice.db");
        let path = db_path.to_str().unwrap();
        Database::open(path).await.unwrap().close().await.unwrap();
        Database::open(path).await.unwrap().close().await.unwrap();
    }

    #[tokio::test]
    async fn wal_mode_is_applied() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("wal.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let mode: String = db
            .connection()
            .call(|conn| -> Result<String, rusqlite::Error> {
                conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
        db.close().await.unwrap();
    }
}
