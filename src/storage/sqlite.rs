use std::sync::Arc;

use anyhow::Context;
use entities::kv_entry;
use sea_orm::{DatabaseConnection, EntityTrait, Set, sea_query::OnConflict};

use super::KeyValueStorage;

/// Durable storage in the `kv_entries` table. Survives restarts and is shared by every
/// process pointing at the same database file, without change notifications between them.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    db: Arc<DatabaseConnection>,
}

impl SqliteStorage {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl KeyValueStorage for SqliteStorage {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let row = kv_entry::Entity::find_by_id(key.to_string())
            .one(self.db.as_ref())
            .await
            .with_context(|| format!("Failed to read storage key {}", key))?;
        Ok(row.map(|r| r.value))
    }

    #[tracing::instrument(level = "debug", skip(self, value))]
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let row = kv_entry::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
        };
        // One statement, so readers never observe a half-written blob.
        kv_entry::Entity::insert(row)
            .on_conflict(
                OnConflict::column(kv_entry::Column::Key)
                    .update_column(kv_entry::Column::Value)
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .with_context(|| format!("Failed to write storage key {}", key))?;
        Ok(())
    }
}
