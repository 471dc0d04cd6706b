use std::sync::Arc;

use crate::{
    domain::models::{ReaderLocation, ReadingProgressRecord},
    progress::{ProgressStore, ProgressSubscription},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub book_id: String,
    pub book_name: String,
    pub chapter_number: u32,
    pub label: String,
    pub href: String,
}

/// One shortcut per record, in store order.
pub fn render(records: &[ReadingProgressRecord]) -> Vec<FeedEntry> {
    records
        .iter()
        .map(|r| FeedEntry {
            book_id: r.book_id.clone(),
            book_name: r.book_name.clone(),
            chapter_number: r.chapter_number,
            label: format!("{}: Chapter {}", r.book_name, r.chapter_number),
            href: ReaderLocation::new(r.book_id.clone(), r.chapter_number).href(),
        })
        .collect()
}

/// "Continue reading" list. Subscribed to the store for as long as it lives.
pub struct ProgressFeed {
    store: Arc<ProgressStore>,
    subscription: ProgressSubscription,
    entries: Vec<FeedEntry>,
}

impl ProgressFeed {
    pub async fn activate(store: Arc<ProgressStore>) -> Self {
        // subscribe before the first read so a write in between is not lost
        let subscription = store.subscribe();
        let entries = render(&store.get_all().await);
        tracing::debug!(entries = entries.len(), "progress feed activated");
        ProgressFeed {
            store,
            subscription,
            entries,
        }
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    /// Wait for the next store change and re-render. `None` once the channel closes.
    pub async fn changed(&mut self) -> Option<&[FeedEntry]> {
        let event = self.subscription.changed().await?;
        tracing::debug!(book_id = %event.book_id, "progress changed, re-rendering feed");
        self.entries = render(&self.store.get_all().await);
        Some(&self.entries)
    }

    pub fn deactivate(self) {
        tracing::debug!("progress feed deactivated");
    }
}
