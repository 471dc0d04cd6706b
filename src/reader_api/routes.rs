use std::sync::Arc;

use futures::stream::BoxStream;
use poem_openapi::{
    OpenApi,
    param::{Path, Query},
    payload::{EventStream, Json, PlainText},
};
use uuid::Uuid;

use super::models::{
    FeedDto, FeedResponseDto, NoContentResponseDto, OpenSessionRequestDto, ReaderViewResponseDto,
    SelectResponseDto, TocResponseDto,
};
use super::services::{
    contents::ContentsService,
    feed::FeedService,
    health::HealthService,
    reader::{Move, ReaderService},
};
use crate::{content_client::ContentService, progress::ProgressStore, reader::ReaderSessions};

pub struct ReaderApi {
    pub content: Arc<dyn ContentService>,
    pub store: Arc<ProgressStore>,
    pub sessions: Arc<ReaderSessions>,
}

#[OpenApi]
impl ReaderApi {
    #[oai(path = "/status", method = "get")]
    #[tracing::instrument(level = "debug", skip(self))]
    async fn status(&self) -> PlainText<String> {
        tracing::debug!("handling /status");
        HealthService::new(&self.store, &self.sessions)
            .status_text()
            .await
    }

    // ===== Chapter index =====

    /// Two-column table of contents for a book
    #[oai(path = "/books/:book_id/contents", method = "get")]
    #[tracing::instrument(level = "debug", skip(self, book_id))]
    async fn table_of_contents(&self, book_id: Path<String>) -> TocResponseDto {
        ContentsService::new(self.content.as_ref(), &self.store)
            .table_of_contents(&book_id.0)
            .await
    }

    /// Select a chapter: records reading progress, then returns where to navigate
    #[oai(
        path = "/books/:book_id/contents/:chapter_number/select",
        method = "post"
    )]
    #[tracing::instrument(level = "debug", skip(self, book_id, chapter_number))]
    async fn select_chapter(
        &self,
        book_id: Path<String>,
        chapter_number: Path<u32>,
    ) -> SelectResponseDto {
        ContentsService::new(self.content.as_ref(), &self.store)
            .select(&book_id.0, chapter_number.0)
            .await
    }

    // ===== Continue reading =====

    /// Continue-reading shortcuts, in the order books were first opened
    #[oai(path = "/continue-reading", method = "get")]
    #[tracing::instrument(level = "debug", skip(self))]
    async fn continue_reading(&self) -> FeedResponseDto {
        FeedService::new(self.store.clone()).snapshot().await
    }

    /// Server-sent events: the current feed, then a fresh render after every change
    #[oai(path = "/continue-reading/events", method = "get")]
    #[tracing::instrument(level = "debug", skip(self))]
    async fn continue_reading_events(&self) -> EventStream<BoxStream<'static, FeedDto>> {
        FeedService::new(self.store.clone()).events().await
    }

    // ===== Reader =====

    /// Open a reader at a book/chapter
    #[oai(path = "/reader/sessions", method = "post")]
    #[tracing::instrument(level = "debug", skip(self, body))]
    async fn open_session(&self, body: Json<OpenSessionRequestDto>) -> ReaderViewResponseDto {
        ReaderService::new(&self.sessions).open(body.0).await
    }

    #[oai(path = "/reader/sessions/:session_id", method = "get")]
    #[tracing::instrument(level = "debug", skip(self, session_id))]
    async fn get_session(&self, session_id: Path<Uuid>) -> ReaderViewResponseDto {
        ReaderService::new(&self.sessions).view(session_id.0).await
    }

    /// Next chapter; a no-op on the last chapter
    #[oai(path = "/reader/sessions/:session_id/next", method = "post")]
    #[tracing::instrument(level = "debug", skip(self, session_id, wait))]
    async fn next_chapter(
        &self,
        session_id: Path<Uuid>,
        /// Hold the response until the chapter has loaded
        wait: Query<Option<bool>>,
    ) -> ReaderViewResponseDto {
        ReaderService::new(&self.sessions)
            .step(session_id.0, Move::Next, wait.0.unwrap_or(false))
            .await
    }

    /// Previous chapter; a no-op on chapter 1
    #[oai(path = "/reader/sessions/:session_id/prev", method = "post")]
    #[tracing::instrument(level = "debug", skip(self, session_id, wait))]
    async fn prev_chapter(
        &self,
        session_id: Path<Uuid>,
        /// Hold the response until the chapter has loaded
        wait: Query<Option<bool>>,
    ) -> ReaderViewResponseDto {
        ReaderService::new(&self.sessions)
            .step(session_id.0, Move::Prev, wait.0.unwrap_or(false))
            .await
    }

    #[oai(path = "/reader/sessions/:session_id", method = "delete")]
    #[tracing::instrument(level = "debug", skip(self, session_id))]
    async fn close_session(&self, session_id: Path<Uuid>) -> NoContentResponseDto {
        ReaderService::new(&self.sessions).close(session_id.0).await
    }
}
