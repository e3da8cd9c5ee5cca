// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only emotion sample log.

use attune_core::{AttuneError, EmotionLabel, EmotionSample};
use rusqlite::params;

use super::{conversion_err, format_ts, parse_ts};
use crate::database::{Database, map_tr_err};

/// Append one sample for `user_id`.
pub async fn record_emotion(
    db: &Database,
    user_id: &str,
    sample: &EmotionSample,
) -> Result<(), AttuneError> {
    let user_id = user_id.to_string();
    let label = sample.label().to_string();
    let intensity = sample.intensity();
    let observed_at = format_ts(&sample.observed_at());
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO emotion_samples (user_id, label, intensity, observed_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, label, intensity, observed_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The `limit` most recent samples of `user_id`, oldest first.
pub async fn list_emotions(
    db: &Database,
    user_id: &str,
    limit: usize,
) -> Result<Vec<EmotionSample>, AttuneError> {
    let user_id = user_id.to_string();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| -> Result<Vec<EmotionSample>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT label, intensity, observed_at FROM (
                     SELECT id, label, intensity, observed_at FROM emotion_samples
                     WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2
                 ) ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![user_id, limit], |row| {
                let label: String = row.get(0)?;
                let label: EmotionLabel = label.parse().map_err(|e| conversion_err(0, e))?;
                let observed_at: String = row.get(2)?;
                EmotionSample::at(label, row.get(1)?, parse_ts(2, &observed_at)?)
                    .map_err(|e| conversion_err(1, e))
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
