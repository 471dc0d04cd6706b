use thiserror::Error;

use crate::{
    domain::models::{BookAggregate, ReaderLocation},
    progress::ProgressStore,
};

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("book {book_id} has no chapter {chapter_number}")]
    UnknownChapter { book_id: String, chapter_number: u32 },
}

/// Split `items` into two columns at `ceil(n/2)`; the first column takes the odd one.
pub fn split_columns<T>(items: &[T]) -> (&[T], &[T]) {
    items.split_at(items.len().div_ceil(2))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub chapter_number: u32,
    pub title: String,
    pub label: String,
    pub href: String,
}

/// Where the reader should go after a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub location: ReaderLocation,
    pub progress_saved: bool,
}

/// Two-column chapter index for one loaded book.
#[derive(Debug, Clone)]
pub struct TableOfContents {
    pub book_id: String,
    pub book_name: String,
    pub total_chapters: u32,
    pub first_column: Vec<TocEntry>,
    pub second_column: Vec<TocEntry>,
}

impl TableOfContents {
    pub fn new(book: &BookAggregate) -> Self {
        let entries: Vec<TocEntry> = book
            .chapters
            .iter()
            .map(|c| TocEntry {
                chapter_number: c.chapter_number,
                title: c.title.clone(),
                label: format!("Chapter {}: {}", c.chapter_number, c.title),
                href: ReaderLocation::new(book.id.clone(), c.chapter_number).href(),
            })
            .collect();
        let (first, second) = split_columns(&entries);
        TableOfContents {
            book_id: book.id.clone(),
            book_name: book.title.clone(),
            total_chapters: book.total_chapters,
            first_column: first.to_vec(),
            second_column: second.to_vec(),
        }
    }

    fn contains(&self, chapter_number: u32) -> bool {
        self.first_column
            .iter()
            .chain(self.second_column.iter())
            .any(|e| e.chapter_number == chapter_number)
    }

    /// Record the chapter as the book's progress, then hand back where to navigate.
    ///
    /// The write finishes before this returns. A failed write is logged and the
    /// navigation goes ahead anyway.
    #[tracing::instrument(level = "debug", skip(self, store), fields(book_id = %self.book_id))]
    pub async fn select(
        &self,
        store: &ProgressStore,
        chapter_number: u32,
    ) -> Result<Selection, SelectError> {
        if !self.contains(chapter_number) {
            return Err(SelectError::UnknownChapter {
                book_id: self.book_id.clone(),
                chapter_number,
            });
        }

        let progress_saved = match store
            .upsert(&self.book_id, &self.book_name, chapter_number)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, chapter_number, "failed to save reading progress");
                false
            }
        };

        Ok(Selection {
            location: ReaderLocation::new(self.book_id.clone(), chapter_number),
            progress_saved,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        content_client::{ContentService, mock::MockContent},
        progress::DEFAULT_STORAGE_KEY,
        storage::MemoryStorage,
    };

    fn sizes(n: usize) -> (usize, usize) {
        let items: Vec<usize> = (0..n).collect();
        let (a, b) = split_columns(&items);
        (a.len(), b.len())
    }

    #[test]
    fn split_law() {
        assert_eq!(sizes(7), (4, 3));
        assert_eq!(sizes(8), (4, 4));
        assert_eq!(sizes(1), (1, 0));
        assert_eq!(sizes(0), (0, 0));
    }

    #[test]
    fn split_preserves_order() {
        let items = [1, 2, 3, 4, 5];
        let (a, b) = split_columns(&items);
        assert_eq!(a, [1, 2, 3]);
        assert_eq!(b, [4, 5]);
    }

    async fn book(chapters: u32) -> BookAggregate {
        MockContent::new()
            .with_book("b1", "Foo", chapters)
            .get_book("b1")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn entries_label_and_link_chapters() {
        let toc = TableOfContents::new(&book(7).await);
        assert_eq!(toc.first_column.len(), 4);
        assert_eq!(toc.second_column.len(), 3);
        let first = &toc.first_column[0];
        assert_eq!(first.label, "Chapter 1: Chapter title 1");
        assert_eq!(first.href, "/books/b1/1");
        assert_eq!(toc.second_column[0].chapter_number, 5);
    }

    #[tokio::test]
    async fn select_writes_progress_before_returning() {
        let store = ProgressStore::new(Arc::new(MemoryStorage::new()), DEFAULT_STORAGE_KEY);
        let toc = TableOfContents::new(&book(5).await);

        let selection = toc.select(&store, 3).await.unwrap();
        assert!(selection.progress_saved);
        assert_eq!(selection.location, ReaderLocation::new("b1", 3));

        let all = store.get_all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].book_name, "Foo");
        assert_eq!(all[0].chapter_number, 3);
    }

    #[tokio::test]
    async fn select_unknown_chapter_writes_nothing() {
        let store = ProgressStore::new(Arc::new(MemoryStorage::new()), DEFAULT_STORAGE_KEY);
        let toc = TableOfContents::new(&book(5).await);
        assert!(matches!(
            toc.select(&store, 6).await,
            Err(SelectError::UnknownChapter { chapter_number: 6, .. })
        ));
        assert!(store.get_all().await.is_empty());
    }
}
