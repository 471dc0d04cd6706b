// Backing media for locally persisted state; the progress store only sees this trait

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

#[async_trait::async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    /// Replace the value under `key` as a single write.
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}
