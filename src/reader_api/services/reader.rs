use poem_openapi::payload::Json;
use uuid::Uuid;

use crate::{
    domain::models::ReaderLocation,
    reader::{NavigatorError, ReaderSessions},
    reader_api::models::{
        ErrorDto, NoContentResponseDto, OpenSessionRequestDto, ReaderViewDto,
        ReaderViewResponseDto,
    },
};

#[derive(Debug, Clone, Copy)]
pub enum Move {
    Next,
    Prev,
}

pub struct ReaderService<'a> {
    pub sessions: &'a ReaderSessions,
}

impl<'a> ReaderService<'a> {
    pub fn new(sessions: &'a ReaderSessions) -> Self {
        Self { sessions }
    }

    fn not_found(session_id: &Uuid) -> ErrorDto {
        ErrorDto {
            message: format!("reader session {} not found", session_id),
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn open(&self, req: OpenSessionRequestDto) -> ReaderViewResponseDto {
        let location = ReaderLocation::new(req.book_id, req.chapter_number.unwrap_or(1));
        match self.sessions.open(location).await {
            Ok((id, navigator)) => {
                ReaderViewResponseDto::Created(Json(ReaderViewDto::new(id, navigator.view())))
            }
            Err(e @ NavigatorError::UnknownBook(_)) => {
                ReaderViewResponseDto::NotFound(Json(e.to_string().into()))
            }
            Err(e @ NavigatorError::EmptyBook(_)) => {
                ReaderViewResponseDto::Unprocessable(Json(e.to_string().into()))
            }
            Err(NavigatorError::Fetch(e)) => {
                tracing::error!(error = %format!("{:?}", e), "failed to open reader session");
                ReaderViewResponseDto::BadGateway(Json(ErrorDto {
                    message: format!("content service error: {:#}", e),
                }))
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn view(&self, session_id: Uuid) -> ReaderViewResponseDto {
        match self.sessions.get(&session_id).await {
            Some(navigator) => {
                ReaderViewResponseDto::Ok(Json(ReaderViewDto::new(session_id, navigator.view())))
            }
            None => ReaderViewResponseDto::NotFound(Json(Self::not_found(&session_id))),
        }
    }

    /// Move one chapter. At a boundary nothing happens and the current view comes back.
    /// With `wait`, the response is held until the triggered fetch resolves.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn step(
        &self,
        session_id: Uuid,
        direction: Move,
        wait: bool,
    ) -> ReaderViewResponseDto {
        let Some(navigator) = self.sessions.get(&session_id).await else {
            return ReaderViewResponseDto::NotFound(Json(Self::not_found(&session_id)));
        };
        let fetch = match direction {
            Move::Next => navigator.next(),
            Move::Prev => navigator.prev(),
        };
        match fetch {
            Some(handle) if wait => {
                if let Err(e) = handle.await {
                    tracing::warn!(error = %e, %session_id, "chapter fetch task failed");
                }
            }
            Some(_) => {}
            None => tracing::debug!(%session_id, ?direction, "at boundary, ignoring move"),
        }
        ReaderViewResponseDto::Ok(Json(ReaderViewDto::new(session_id, navigator.view())))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn close(&self, session_id: Uuid) -> NoContentResponseDto {
        if self.sessions.close(&session_id).await {
            NoContentResponseDto::NoContent
        } else {
            NoContentResponseDto::NotFound(Json(Self::not_found(&session_id)))
        }
    }
}
