pub mod feed;
pub mod toc;

pub use feed::{FeedEntry, ProgressFeed};
pub use toc::{SelectError, Selection, TableOfContents};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        content_client::{ContentService, mock::MockContent},
        domain::models::ReadingProgressRecord,
        progress::{DEFAULT_STORAGE_KEY, ProgressStore},
        reader::ChapterNavigator,
        storage::MemoryStorage,
    };

    #[tokio::test]
    async fn select_read_and_page_through_a_book() {
        let content = Arc::new(MockContent::new().with_book("b1", "Foo", 5));
        let store = Arc::new(ProgressStore::new(
            Arc::new(MemoryStorage::new()),
            DEFAULT_STORAGE_KEY,
        ));
        assert!(store.get_all().await.is_empty());

        // chapter index: pick chapter 3
        let book = content.get_book("b1").await.unwrap();
        let toc = TableOfContents::new(&book);
        let selection = toc.select(&store, 3).await.unwrap();
        assert_eq!(
            store.get_all().await,
            vec![ReadingProgressRecord {
                book_id: "b1".into(),
                book_name: "Foo".into(),
                chapter_number: 3,
            }]
        );

        // landing view shows the shortcut
        let feed = ProgressFeed::activate(store.clone()).await;
        assert_eq!(feed.entries().len(), 1);
        assert_eq!(feed.entries()[0].label, "Foo: Chapter 3");
        assert_eq!(feed.entries()[0].href, selection.location.href());
        feed.deactivate();

        // reader
        let nav = ChapterNavigator::activate(content.clone(), selection.location)
            .await
            .unwrap();
        nav.next().unwrap().await.unwrap();
        assert_eq!(nav.current_chapter(), 4);
        assert_eq!(content.chapter_calls().last(), Some(&("b1".to_string(), 4)));

        for _ in 0..3 {
            if let Some(fetch) = nav.prev() {
                fetch.await.unwrap();
            }
        }
        assert_eq!(nav.current_chapter(), 1);
        assert!(nav.prev().is_none());
        assert_eq!(nav.current_chapter(), 1);
        assert_eq!(nav.view().chapter.unwrap().chapter_number, 1);

        // the reader does not write progress
        assert_eq!(store.get_all().await[0].chapter_number, 3);
    }
}
