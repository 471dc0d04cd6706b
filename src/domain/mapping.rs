// Mapping from content-service DTOs to domain models

use super::models::{BookAggregate, ChapterEntity};
use crate::content_client::{BookResponse, ChapterResponse};

pub fn map_book(resp: BookResponse) -> BookAggregate {
    let id = resp.id;
    let mut chapters: Vec<ChapterEntity> = resp
        .chapters
        .into_iter()
        .map(|c| ChapterEntity {
            book_id: id.clone(),
            chapter_number: c.chapter_number,
            title: c.title,
            content: c.content,
        })
        .collect();
    // The service sorts by chapter_number already; don't rely on it.
    chapters.sort_by_key(|c| c.chapter_number);
    let total_chapters = chapters.len() as u32;

    BookAggregate {
        id,
        title: resp.title.unwrap_or_else(|| "Untitled".into()),
        chapters,
        total_chapters,
    }
}

/// The chapter payload names its book as `novel_id`; fall back to the id we asked for.
pub fn map_chapter(requested_book_id: &str, resp: ChapterResponse) -> ChapterEntity {
    ChapterEntity {
        book_id: resp
            .novel_id
            .unwrap_or_else(|| requested_book_id.to_string()),
        chapter_number: resp.chapter_number,
        title: resp.title,
        content: resp.content,
    }
}
