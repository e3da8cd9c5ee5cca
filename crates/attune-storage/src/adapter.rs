// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use attune_config::StorageConfig;
use attune_core::{
    AdapterType, Annotation, AttuneError, ConversationTurn, EmotionSample, HealthStatus,
    PluginAdapter, StorageAdapter,
};

use crate::database::{self, Database, map_tr_err};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened by [`StorageAdapter::initialize`]; every other
/// operation fails with a storage error until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, AttuneError> {
        self.db.get().ok_or_else(|| AttuneError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, AttuneError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AttuneError> {
        if let Some(db) = self.db.get() {
            database::checkpoint(db.connection()).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), AttuneError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| AttuneError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), AttuneError> {
        database::checkpoint(self.db()?.connection()).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn load_turns(&self, session_id: &str) -> Result<Vec<ConversationTurn>, AttuneError> {
        queries::turns::load_turns(self.db()?, session_id).await
    }

    async fn save_turns(
        &self,
        session_id: &str,
        turns: &[ConversationTurn],
    ) -> Result<(), AttuneError> {
        queries::turns::save_turns(self.db()?, session_id, turns).await
    }

    async fn record_emotion(
        &self,
        user_id: &str,
        sample: &EmotionSample,
    ) -> Result<(), AttuneError> {
        queries::emotions::record_emotion(self.db()?, user_id, sample).await
    }

    async fn list_emotions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<EmotionSample>, AttuneError> {
        queries::emotions::list_emotions(self.db()?, user_id, limit).await
    }

    async fn add_annotation(&self, annotation: &Annotation) -> Result<(), AttuneError> {
        queries::annotations::add_annotation(self.db()?, annotation).await
    }

    async fn list_annotations(
        &self,
        reviewer_id: &str,
        subject_id: &str,
    ) -> Result<Vec<Annotation>, AttuneError> {
        queries::annotations::list_annotations(self.db()?, reviewer_id, subject_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attune_core::{EmotionLabel, Role};
    use chrono::Utc;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(
            dir.path().join("test.db").to_str().unwrap(),
        ));
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(
            dir.path().join("double.db").to_str().unwrap(),
        ));
        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(
            dir.path().join("none.db").to_str().unwrap(),
        ));
        assert!(storage.health_check().await.is_err());
        let err = storage.load_turns("s").await.unwrap_err();
        assert_eq!(err.kind(), attune_core::ErrorKind::Storage);
    }

    #[tokio::test]
    async fn turns_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        let turn = ConversationTurn {
            role: Role::User,
            content: "hello".into(),
            timestamp: Utc::now(),
            emotion_context: Some(EmotionSample::new(EmotionLabel::Calm, 0.3).unwrap()),
        };

        {
            let storage = SqliteStorage::new(make_config(path.to_str().unwrap()));
            storage.initialize().await.unwrap();
            storage.save_turns("s1", &[turn.clone()]).await.unwrap();
            storage.close().await.unwrap();
        }

        let storage = SqliteStorage::new(make_config(path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        let restored = storage.load_turns("s1").await.unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].content, "hello");
        assert_eq!(
            restored[0].emotion_context.as_ref().map(|s| s.label()),
            Some(EmotionLabel::Calm)
        );
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
        storage.shutdown().await.unwrap();
    }
}
