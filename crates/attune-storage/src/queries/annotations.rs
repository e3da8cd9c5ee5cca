// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reviewer annotations.

use attune_core::{Annotation, AttuneError};
use rusqlite::params;

use super::{format_ts, parse_ts};
use crate::database::{Database, map_tr_err};

pub async fn add_annotation(db: &Database, annotation: &Annotation) -> Result<(), AttuneError> {
    let a = annotation.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO annotations (id, reviewer_id, subject_id, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![a.id, a.reviewer_id, a.subject_id, a.content, format_ts(&a.created_at)],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Notes for one (reviewer, subject) pair, newest first.
pub async fn list_annotations(
    db: &Database,
    reviewer_id: &str,
    subject_id: &str,
) -> Result<Vec<Annotation>, AttuneError> {
    let reviewer_id = reviewer_id.to_string();
    let subject_id = subject_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<Annotation>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, reviewer_id, subject_id, content, created_at FROM annotations
                 WHERE reviewer_id = ?1 AND subject_id = ?2
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt.query_map(params![reviewer_id, subject_id], |row| {
                let created_at: String = row.get(4)?;
                Ok(Annotation {
                    id: row.get(0)?,
                    reviewer_id: row.get(1)?,
                    subject_id: row.get(2)?,
                    content: row.get(3)?,
                    created_at: parse_ts(4, &created_at)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
