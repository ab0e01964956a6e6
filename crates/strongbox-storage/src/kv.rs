// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`KeyValueStore`] trait.

use async_trait::async_trait;
use rusqlite::{OptionalExtension, params};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use strongbox_config::model::StorageConfig;
use strongbox_core::{AdapterType, HealthStatus, KeyValueStore, PluginAdapter, StrongboxError};

use crate::database::{Database, map_tr_err};

/// SQLite-backed key-value store.
///
/// Values are stored as JSON text. The database is opened lazily by
/// [`SqliteKvStore::initialize`].
pub struct SqliteKvStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteKvStore {
    /// Create a store for the configured database path without opening it.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Create and initialize in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, StrongboxError> {
        let store = Self::new(config);
        store.initialize().await?;
        Ok(store)
    }

    /// Open the database and run migrations.
    pub async fn initialize(&self) -> Result<(), StrongboxError> {
        let db = Database::open(&self.config.database_path).await?;
        self.db.set(db).map_err(|_| StrongboxError::Storage {
            source: "key-value store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite key-value store initialized");
        Ok(())
    }

    fn db(&self) -> Result<&Database, StrongboxError> {
        self.db.get().ok_or_else(|| StrongboxError::Storage {
            source: "key-value store not initialized -- call initialize() first".into(),
        })
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[async_trait]
impl PluginAdapter for SqliteKvStore {
    fn name(&self) -> &str {
        "sqlite-kv"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Persistence
    }

    async fn health_check(&self) -> Result<HealthStatus, StrongboxError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), StrongboxError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StrongboxError> {
        let namespace = namespace.to_string();
        let key = key.to_string();
        let raw: Option<String> = self
            .db()?
            .connection()
            .call(move |conn| {
                conn.query_row(
                    "SELECT value FROM kv_store WHERE namespace = ?1 AND key = ?2",
                    params![namespace, key],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, namespace: &str, key: &str, value: Value) -> Result<(), StrongboxError> {
        self.set_many(namespace, vec![(key.to_string(), value)])
            .await
    }

    async fn set_many(
        &self,
        namespace: &str,
        entries: Vec<(String, Value)>,
    ) -> Result<(), StrongboxError> {
        let namespace = namespace.to_string();
        let rows = entries
            .into_iter()
            .map(|(key, value)| Ok((key, serde_json::to_string(&value)?)))
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        let count = rows.len();
        let updated_at = now_rfc3339();

        self.db()?
            .connection()
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO kv_store (namespace, key, value, updated_at)
                         VALUES (?1, ?2, ?3, ?4)
                         ON CONFLICT(namespace, key)
                         DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                    )?;
                    for (key, value) in &rows {
                        stmt.execute(params![namespace, key, value, updated_at])?;
                    }
                }
                tx.commit()
            })
            .await
            .map_err(map_tr_err)?;

        debug!(count, "key-value batch committed");
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<bool, StrongboxError> {
        let namespace = namespace.to_string();
        let key = key.to_string();
        let removed = self
            .db()?
            .connection()
            .call(move |conn| {
                conn.execute(
                    "DELETE FROM kv_store WHERE namespace = ?1 AND key = ?2",
                    params![namespace, key],
                )
            })
            .await
            .map_err(map_tr_err)?;
        Ok(removed > 0)
    }
}
