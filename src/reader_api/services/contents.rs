use poem_openapi::payload::Json;

use crate::{
    content_client::{BookNotFound, ContentService},
    progress::ProgressStore,
    reader_api::models::{ErrorDto, SelectResponseDto, TocDto, TocResponseDto},
    views::{SelectError, TableOfContents},
};

enum LoadError {
    NotFound(ErrorDto),
    Upstream(ErrorDto),
}

pub struct ContentsService<'a> {
    pub content: &'a dyn ContentService,
    pub store: &'a ProgressStore,
}

impl<'a> ContentsService<'a> {
    pub fn new(content: &'a dyn ContentService, store: &'a ProgressStore) -> Self {
        Self { content, store }
    }

    async fn load(&self, book_id: &str) -> Result<TableOfContents, LoadError> {
        match self.content.get_book(book_id).await {
            Ok(book) => Ok(TableOfContents::new(&book)),
            Err(e) if e.is::<BookNotFound>() => {
                tracing::debug!(%book_id, "book not found");
                Err(LoadError::NotFound(e.to_string().into()))
            }
            Err(e) => {
                tracing::error!(error = %format!("{:?}", e), %book_id, "failed to load book");
                Err(LoadError::Upstream(ErrorDto {
                    message: format!("content service error: {}", e),
                }))
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn table_of_contents(&self, book_id: &str) -> TocResponseDto {
        match self.load(book_id).await {
            Ok(toc) => TocResponseDto::Ok(Json(TocDto::from(&toc))),
            Err(LoadError::NotFound(e)) => TocResponseDto::NotFound(Json(e)),
            Err(LoadError::Upstream(e)) => TocResponseDto::BadGateway(Json(e)),
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn select(&self, book_id: &str, chapter_number: u32) -> SelectResponseDto {
        let toc = match self.load(book_id).await {
            Ok(toc) => toc,
            Err(LoadError::NotFound(e)) => return SelectResponseDto::NotFound(Json(e)),
            Err(LoadError::Upstream(e)) => return SelectResponseDto::BadGateway(Json(e)),
        };
        match toc.select(self.store, chapter_number).await {
            Ok(selection) => SelectResponseDto::Ok(Json(selection.into())),
            Err(e @ SelectError::UnknownChapter { .. }) => {
                SelectResponseDto::BadRequest(Json(e.to_string().into()))
            }
        }
    }
}
