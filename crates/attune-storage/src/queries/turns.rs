// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation turn persistence.

use attune_core::{AttuneError, ConversationTurn, EmotionLabel, EmotionSample, Role};
use rusqlite::params;

use super::{conversion_err, format_ts, parse_ts};
use crate::database::{Database, map_tr_err};

/// Load all turns of a session in append order.
pub async fn load_turns(db: &Database, session_id: &str) -> Result<Vec<ConversationTurn>, AttuneError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<ConversationTurn>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT role, content, created_at, emotion_label, emotion_intensity, emotion_observed_at
                 FROM conversation_turns WHERE session_id = ?1 ORDER BY seq ASC",
            )?;
            let rows = stmt.query_map(params![session_id], |row| {
                let role: String = row.get(0)?;
                let created_at: String = row.get(2)?;
                let label: Option<String> = row.get(3)?;
                let intensity: Option<f64> = row.get(4)?;
                let observed_at: Option<String> = row.get(5)?;

                let emotion_context = match (label, intensity, observed_at) {
                    (Some(label), Some(intensity), Some(observed_at)) => {
                        let label: EmotionLabel =
                            label.parse().map_err(|e| conversion_err(3, e))?;
                        let observed_at = parse_ts(5, &observed_at)?;
                        Some(
                            EmotionSample::at(label, intensity, observed_at)
                                .map_err(|e| conversion_err(4, e))?,
                        )
                    }
                    _ => None,
                };

                Ok(ConversationTurn {
                    role: role.parse().map_err(|e| conversion_err(0, e))?,
                    content: row.get(1)?,
                    timestamp: parse_ts(2, &created_at)?,
                    emotion_context,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Replace the stored turns of a session in one transaction.
pub async fn save_turns(
    db: &Database,
    session_id: &str,
    turns: &[ConversationTurn],
) -> Result<(), AttuneError> {
    let session_id = session_id.to_string();
    let turns = turns.to_vec();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM conversation_turns WHERE session_id = ?1",
                params![session_id],
            )?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO conversation_turns
                     (session_id, seq, role, content, created_at, emotion_label, emotion_intensity, emotion_observed_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )?;
                for (seq, turn) in turns.iter().enumerate() {
                    let emotion = turn.emotion_context.as_ref();
                    stmt.execute(params![
                        session_id,
                        seq as i64,
                        turn.role.to_string(),
                        turn.content,
                        format_ts(&turn.timestamp),
                        emotion.map(|s| s.label().to_string()),
                        emotion.map(|s| s.intensity()),
                        emotion.map(|s| format_ts(&s.observed_at())),
                    ])?;
                }
            }
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}
