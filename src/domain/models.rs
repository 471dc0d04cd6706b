// Domain models shared by the store, the navigator and the views

use serde::{Deserialize, Serialize};

/// Last chapter read for one book. The persisted blob is a JSON array of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingProgressRecord {
    pub book_id: String,
    pub book_name: String,
    pub chapter_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterEntity {
    pub book_id: String,
    /// 1-based, dense within a book
    pub chapter_number: u32,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookAggregate {
    pub id: String,
    pub title: String,
    pub chapters: Vec<ChapterEntity>,
    pub total_chapters: u32,
}

impl BookAggregate {
    pub fn chapter(&self, chapter_number: u32) -> Option<&ChapterEntity> {
        self.chapters
            .iter()
            .find(|c| c.chapter_number == chapter_number)
    }
}

/// Navigation context handed to the reader: which book, which chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderLocation {
    pub book_id: String,
    pub chapter_number: u32,
}

impl ReaderLocation {
    pub fn new(book_id: impl Into<String>, chapter_number: u32) -> Self {
        Self {
            book_id: book_id.into(),
            chapter_number,
        }
    }

    /// Link to the reader route, e.g. `/books/b1/3`
    pub fn href(&self) -> String {
        format!("/books/{}/{}", self.book_id, self.chapter_number)
    }
}
