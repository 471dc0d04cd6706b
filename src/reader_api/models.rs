use poem_openapi::{ApiResponse, Object, payload::Json};
use uuid::Uuid;

use crate::{
    reader::{Breadcrumb, ReaderView},
    views::{FeedEntry, Selection, TableOfContents, toc::TocEntry},
};

#[derive(Debug, Clone, Object)]
pub struct ErrorDto {
    /// Human-readable error message
    pub message: String,
}

impl From<String> for ErrorDto {
    fn from(message: String) -> Self {
        ErrorDto { message }
    }
}

// ===== Table of contents =====

#[derive(Debug, Clone, Object)]
pub struct TocEntryDto {
    pub chapter_number: u32,
    pub title: String,
    /// e.g. "Chapter 3: The Gate"
    pub label: String,
    /// Reader link for this chapter
    pub href: String,
}

impl From<&TocEntry> for TocEntryDto {
    fn from(e: &TocEntry) -> Self {
        TocEntryDto {
            chapter_number: e.chapter_number,
            title: e.title.clone(),
            label: e.label.clone(),
            href: e.href.clone(),
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct TocDto {
    pub book_id: String,
    pub book_title: String,
    pub total_chapters: u32,
    pub first_column: Vec<TocEntryDto>,
    pub second_column: Vec<TocEntryDto>,
}

impl From<&TableOfContents> for TocDto {
    fn from(toc: &TableOfContents) -> Self {
        TocDto {
            book_id: toc.book_id.clone(),
            book_title: toc.book_name.clone(),
            total_chapters: toc.total_chapters,
            first_column: toc.first_column.iter().map(TocEntryDto::from).collect(),
            second_column: toc.second_column.iter().map(TocEntryDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct SelectionDto {
    pub book_id: String,
    pub chapter_number: u32,
    /// Where the client should navigate next
    pub href: String,
    /// False when the progress write failed; navigation still proceeds
    pub progress_saved: bool,
}

impl From<Selection> for SelectionDto {
    fn from(s: Selection) -> Self {
        SelectionDto {
            href: s.location.href(),
            book_id: s.location.book_id,
            chapter_number: s.location.chapter_number,
            progress_saved: s.progress_saved,
        }
    }
}

#[derive(ApiResponse)]
pub enum TocResponseDto {
    /// Chapter index for the book
    #[oai(status = 200)]
    Ok(Json<TocDto>),

    /// Unknown book
    #[oai(status = 404)]
    NotFound(Json<ErrorDto>),

    /// Upstream content service error
    #[oai(status = 502)]
    BadGateway(Json<ErrorDto>),
}

#[derive(ApiResponse)]
pub enum SelectResponseDto {
    /// Progress recorded, navigate to `href`
    #[oai(status = 200)]
    Ok(Json<SelectionDto>),

    /// Chapter is not part of the book
    #[oai(status = 400)]
    BadRequest(Json<ErrorDto>),

    /// Unknown book
    #[oai(status = 404)]
    NotFound(Json<ErrorDto>),

    /// Upstream content service error
    #[oai(status = 502)]
    BadGateway(Json<ErrorDto>),
}

// ===== Continue reading =====

#[derive(Debug, Clone, Object)]
pub struct FeedEntryDto {
    pub book_id: String,
    pub book_name: String,
    pub chapter_number: u32,
    /// e.g. "Foo: Chapter 3"
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, Object)]
pub struct FeedDto {
    pub entries: Vec<FeedEntryDto>,
}

impl From<&[FeedEntry]> for FeedDto {
    fn from(entries: &[FeedEntry]) -> Self {
        FeedDto {
            entries: entries
                .iter()
                .map(|e| FeedEntryDto {
                    book_id: e.book_id.clone(),
                    book_name: e.book_name.clone(),
                    chapter_number: e.chapter_number,
                    label: e.label.clone(),
                    href: e.href.clone(),
                })
                .collect(),
        }
    }
}

#[derive(ApiResponse)]
pub enum FeedResponseDto {
    /// Current continue-reading shortcuts
    #[oai(status = 200)]
    Ok(Json<FeedDto>),
}

// ===== Reader sessions =====

#[derive(Debug, Clone, Object)]
pub struct OpenSessionRequestDto {
    pub book_id: String,
    /// Defaults to 1; clamped into the book's range
    pub chapter_number: Option<u32>,
}

#[derive(Debug, Clone, Object)]
pub struct ChapterDto {
    pub chapter_number: u32,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Object)]
pub struct BreadcrumbDto {
    pub label: String,
    pub href: String,
}

impl From<Breadcrumb> for BreadcrumbDto {
    fn from(b: Breadcrumb) -> Self {
        BreadcrumbDto {
            label: b.label,
            href: b.href,
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct ReaderViewDto {
    pub session_id: Uuid,
    pub book_id: String,
    pub book_title: String,
    pub current_chapter: u32,
    pub total_chapters: u32,
    /// Prev affordance enabled
    pub can_prev: bool,
    /// Next affordance enabled
    pub can_next: bool,
    /// A chapter fetch is in flight
    pub loading: bool,
    /// Last successfully loaded chapter; may differ from `current_chapter` after an error
    pub chapter: Option<ChapterDto>,
    /// Inline error from the latest fetch
    pub error: Option<String>,
    pub breadcrumbs: Vec<BreadcrumbDto>,
}

impl ReaderViewDto {
    pub fn new(session_id: Uuid, view: ReaderView) -> Self {
        ReaderViewDto {
            session_id,
            book_id: view.book_id,
            book_title: view.book_title,
            current_chapter: view.current_chapter,
            total_chapters: view.total_chapters,
            can_prev: view.can_prev,
            can_next: view.can_next,
            loading: view.loading,
            chapter: view.chapter.map(|c| ChapterDto {
                chapter_number: c.chapter_number,
                title: c.title,
                content: c.content,
            }),
            error: view.error,
            breadcrumbs: view.breadcrumbs.into_iter().map(BreadcrumbDto::from).collect(),
        }
    }
}

#[derive(ApiResponse)]
pub enum ReaderViewResponseDto {
    /// Reader state
    #[oai(status = 200)]
    Ok(Json<ReaderViewDto>),

    /// Session created
    #[oai(status = 201)]
    Created(Json<ReaderViewDto>),

    /// Unknown session or book
    #[oai(status = 404)]
    NotFound(Json<ErrorDto>),

    /// Book has no chapters
    #[oai(status = 422)]
    Unprocessable(Json<ErrorDto>),

    /// Upstream content service error
    #[oai(status = 502)]
    BadGateway(Json<ErrorDto>),
}

#[derive(ApiResponse)]
pub enum NoContentResponseDto {
    /// Empty 204 response
    #[oai(status = 204)]
    NoContent,

    /// Unknown session
    #[oai(status = 404)]
    NotFound(Json<ErrorDto>),
}
