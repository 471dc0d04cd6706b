// In-memory content service for tests

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
    time::Duration,
};

use super::{BookNotFound, ContentService};
use crate::domain::models::{BookAggregate, ChapterEntity};

#[derive(Default)]
pub struct MockContent {
    books: HashMap<String, BookAggregate>,
    delays: HashMap<u32, Duration>,
    failing: HashSet<u32>,
    unreachable_books: HashSet<String>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl MockContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a book whose chapters are titled "Chapter title {n}".
    pub fn with_book(mut self, id: &str, title: &str, chapters: u32) -> Self {
        let chapters: Vec<ChapterEntity> = (1..=chapters)
            .map(|n| ChapterEntity {
                book_id: id.to_string(),
                chapter_number: n,
                title: format!("Chapter title {}", n),
                content: format!("content of {} chapter {}", id, n),
            })
            .collect();
        let book = BookAggregate {
            id: id.to_string(),
            title: title.to_string(),
            total_chapters: chapters.len() as u32,
            chapters,
        };
        self.books.insert(id.to_string(), book);
        self
    }

    /// Delay chapter fetches for `chapter` (any book).
    pub fn with_delay(mut self, chapter: u32, delay: Duration) -> Self {
        self.delays.insert(chapter, delay);
        self
    }

    /// Make chapter fetches for `chapter` (any book) fail.
    pub fn with_failure(mut self, chapter: u32) -> Self {
        self.failing.insert(chapter);
        self
    }

    /// Make book lookups for `id` fail as if the service were down.
    pub fn with_unreachable_book(mut self, id: &str) -> Self {
        self.unreachable_books.insert(id.to_string());
        self
    }

    /// Chapter fetches in the order they were issued.
    pub fn chapter_calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ContentService for MockContent {
    async fn get_book(&self, book_id: &str) -> anyhow::Result<BookAggregate> {
        if self.unreachable_books.contains(book_id) {
            anyhow::bail!("upstream returned 503 for book {}", book_id);
        }
        self.books
            .get(book_id)
            .cloned()
            .ok_or_else(|| BookNotFound(book_id.to_string()).into())
    }

    async fn get_chapter(
        &self,
        book_id: &str,
        chapter_number: u32,
    ) -> anyhow::Result<ChapterEntity> {
        self.calls
            .lock()
            .unwrap()
            .push((book_id.to_string(), chapter_number));
        if let Some(delay) = self.delays.get(&chapter_number) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&chapter_number) {
            anyhow::bail!("upstream returned 500 for chapter {}", chapter_number);
        }
        self.books
            .get(book_id)
            .and_then(|b| b.chapter(chapter_number))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("chapter {} of {} not found", chapter_number, book_id))
    }
}
