//! Last-read chapter per book, persisted as one JSON array under a single storage key.
//!
//! The store owns the collection. Views read copies through [`ProgressStore::get_all`] and
//! learn about writes through a [`ProgressSubscription`].

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{
    Mutex,
    broadcast::{self, error::RecvError},
};

use crate::{domain::models::ReadingProgressRecord, storage::KeyValueStorage};

pub const DEFAULT_STORAGE_KEY: &str = "booksData";

const NOTIFY_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("chapter number must be at least 1, got {0}")]
    InvalidChapter(u32),

    #[error("failed to encode progress: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Sent to subscribers after a write has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressChanged {
    pub book_id: String,
    pub chapter_number: u32,
}

pub struct ProgressStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    // serializes scan -> mutate -> persist within this process
    write_lock: Mutex<()>,
    notifier: broadcast::Sender<ProgressChanged>,
}

impl ProgressStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        let (notifier, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self {
            storage,
            key: key.into(),
            write_lock: Mutex::new(()),
            notifier,
        }
    }

    /// All records in insertion order. Missing, unreadable or malformed state reads as empty.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_all(&self) -> Vec<ReadingProgressRecord> {
        match self.storage.get(&self.key).await {
            Ok(raw) => parse_blob(&self.key, raw.as_deref()),
            Err(e) => {
                tracing::warn!(
                    error = %format!("{:?}", e),
                    key = %self.key,
                    "failed to read progress, treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Insert or overwrite the record for `book_id`, persist the whole collection, then notify.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn upsert(
        &self,
        book_id: &str,
        book_name: &str,
        chapter_number: u32,
    ) -> Result<(), ProgressError> {
        if chapter_number == 0 {
            return Err(ProgressError::InvalidChapter(chapter_number));
        }

        let _guard = self.write_lock.lock().await;
        let raw = self.storage.get(&self.key).await?;
        let mut records = parse_blob(&self.key, raw.as_deref());

        match records.iter_mut().find(|r| r.book_id == book_id) {
            Some(existing) => {
                existing.chapter_number = chapter_number;
                existing.book_name = book_name.to_string();
            }
            None => records.push(ReadingProgressRecord {
                book_id: book_id.to_string(),
                book_name: book_name.to_string(),
                chapter_number,
            }),
        }

        let blob = serde_json::to_string(&records)?;
        self.storage.set(&self.key, &blob).await?;
        tracing::debug!(%book_id, chapter_number, records = records.len(), "progress persisted");

        // Ignore send errors (no subscribers)
        let _ = self.notifier.send(ProgressChanged {
            book_id: book_id.to_string(),
            chapter_number,
        });
        Ok(())
    }

    pub fn subscribe(&self) -> ProgressSubscription {
        ProgressSubscription {
            rx: self.notifier.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.notifier.receiver_count()
    }
}

fn parse_blob(key: &str, raw: Option<&str>) -> Vec<ReadingProgressRecord> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(error = %e, %key, "malformed progress blob, treating as empty");
            Vec::new()
        }
    }
}

/// Listener on store writes. Dropping it unsubscribes.
pub struct ProgressSubscription {
    rx: broadcast::Receiver<ProgressChanged>,
}

impl ProgressSubscription {
    /// Wait for the next persisted write. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<ProgressChanged> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "progress subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::storage::MemoryStorage;

    fn store_with(storage: MemoryStorage) -> ProgressStore {
        ProgressStore::new(Arc::new(storage), DEFAULT_STORAGE_KEY)
    }

    struct BrokenStorage;

    #[async_trait::async_trait]
    impl KeyValueStorage for BrokenStorage {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[tokio::test]
    async fn upsert_same_book_keeps_one_record_with_last_chapter() {
        let store = store_with(MemoryStorage::new());
        store.upsert("b1", "Foo", 2).await.unwrap();
        store.upsert("b1", "Foo", 5).await.unwrap();

        let all = store.get_all().await;
        assert_eq!(
            all,
            vec![ReadingProgressRecord {
                book_id: "b1".into(),
                book_name: "Foo".into(),
                chapter_number: 5,
            }]
        );
    }

    #[tokio::test]
    async fn upsert_new_book_appends_in_insertion_order() {
        let store = store_with(MemoryStorage::new());
        store.upsert("b2", "Bar", 1).await.unwrap();
        store.upsert("b1", "Foo", 3).await.unwrap();
        store.upsert("b2", "Bar (2nd ed.)", 7).await.unwrap();

        let all = store.get_all().await;
        let ids: Vec<_> = all.iter().map(|r| r.book_id.as_str()).collect();
        assert_eq!(ids, ["b2", "b1"]);
        assert_eq!(all[0].chapter_number, 7);
        assert_eq!(all[0].book_name, "Bar (2nd ed.)");
    }

    #[tokio::test]
    async fn malformed_blob_reads_as_empty() {
        let store = store_with(MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, "{not json"));
        assert!(store.get_all().await.is_empty());
    }

    #[tokio::test]
    async fn upsert_over_malformed_blob_starts_fresh() {
        let store = store_with(MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, "{not json"));
        store.upsert("b1", "Foo", 1).await.unwrap();
        assert_eq!(store.get_all().await.len(), 1);
    }

    #[tokio::test]
    async fn reads_blob_written_in_wire_format() {
        let blob = r#"[{ "book_id": "b1", "book_name": "Foo", "chapter_number": 3 }]"#;
        let store = store_with(MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, blob));
        let all = store.get_all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].chapter_number, 3);
    }

    #[tokio::test]
    async fn chapter_zero_is_rejected() {
        let store = store_with(MemoryStorage::new());
        let err = store.upsert("b1", "Foo", 0).await.unwrap_err();
        assert!(matches!(err, ProgressError::InvalidChapter(0)));
        assert!(store.get_all().await.is_empty());
    }

    #[tokio::test]
    async fn subscribers_notified_after_persist() {
        let store = store_with(MemoryStorage::new());
        let mut sub = store.subscribe();
        store.upsert("b1", "Foo", 3).await.unwrap();

        let event = sub.changed().await.unwrap();
        assert_eq!(
            event,
            ProgressChanged {
                book_id: "b1".into(),
                chapter_number: 3
            }
        );
        // already persisted when the notification arrives
        assert_eq!(store.get_all().await[0].chapter_number, 3);
    }

    #[tokio::test]
    async fn failed_persist_does_not_notify() {
        let store = ProgressStore::new(Arc::new(BrokenStorage), DEFAULT_STORAGE_KEY);
        let mut sub = store.subscribe();
        assert!(matches!(
            store.upsert("b1", "Foo", 1).await,
            Err(ProgressError::Storage(_))
        ));
        let waited = tokio::time::timeout(Duration::from_millis(20), sub.changed()).await;
        assert!(waited.is_err(), "no notification expected");
    }

    #[tokio::test]
    async fn dropping_subscription_releases_listener() {
        let store = store_with(MemoryStorage::new());
        let a = store.subscribe();
        let b = store.subscribe();
        assert_eq!(store.subscriber_count(), 2);
        drop(a);
        assert_eq!(store.subscriber_count(), 1);
        drop(b);
        assert_eq!(store.subscriber_count(), 0);
    }
}
