use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::{
    content_client::{BookNotFound, ContentService},
    domain::models::{ChapterEntity, ReaderLocation},
};

#[derive(Debug, Error)]
pub enum NavigatorError {
    #[error("book {0} not found")]
    UnknownBook(String),

    #[error("book {0} has no chapters")]
    EmptyBook(String),

    #[error(transparent)]
    Fetch(#[from] anyhow::Error),
}

#[derive(Debug)]
struct NavState {
    current_chapter: u32,
    // token of the most recently issued fetch; older results are dropped
    latest_token: u64,
    displayed: Option<ChapterEntity>,
    error: Option<String>,
    loading: bool,
}

impl NavState {
    fn issue_token(&mut self) -> u64 {
        self.latest_token += 1;
        self.loading = true;
        self.latest_token
    }
}

struct Shared {
    content: Arc<dyn ContentService>,
    book_id: String,
    state: Mutex<NavState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, NavState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn fetch(self: Arc<Self>, token: u64, chapter_number: u32) {
        let result = self.content.get_chapter(&self.book_id, chapter_number).await;

        let mut state = self.lock();
        if token != state.latest_token {
            tracing::debug!(
                book_id = %self.book_id,
                chapter_number,
                token,
                latest = state.latest_token,
                "discarding superseded chapter fetch"
            );
            return;
        }
        state.loading = false;
        match result {
            Ok(chapter) => {
                state.displayed = Some(chapter);
                state.error = None;
            }
            Err(e) => {
                // current_chapter stays where the user moved it
                tracing::warn!(
                    error = %format!("{:?}", e),
                    book_id = %self.book_id,
                    chapter_number,
                    "chapter fetch failed"
                );
                state.error = Some(format!("Could not load chapter {}: {}", chapter_number, e));
            }
        }
    }
}

/// Snapshot of what the reader shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderView {
    pub book_id: String,
    pub book_title: String,
    pub current_chapter: u32,
    pub total_chapters: u32,
    pub can_prev: bool,
    pub can_next: bool,
    pub loading: bool,
    /// Last successfully fetched chapter; may lag `current_chapter` after a failure.
    pub chapter: Option<ChapterEntity>,
    pub error: Option<String>,
    pub breadcrumbs: Vec<Breadcrumb>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    pub href: String,
}

/// Pages through one book, one chapter at a time, within `[1, total_chapters]`.
pub struct ChapterNavigator {
    shared: Arc<Shared>,
    book_title: String,
    total_chapters: u32,
}

impl ChapterNavigator {
    /// Load the book, clamp the requested chapter into range and show it.
    ///
    /// Fails only when the book itself is unknown, cannot be loaded or has no chapters;
    /// a failed first chapter fetch is reported through [`ReaderView::error`].
    #[tracing::instrument(level = "debug", skip(content))]
    pub async fn activate(
        content: Arc<dyn ContentService>,
        location: ReaderLocation,
    ) -> Result<Self, NavigatorError> {
        let book = match content.get_book(&location.book_id).await {
            Ok(book) => book,
            Err(e) if e.is::<BookNotFound>() => {
                return Err(NavigatorError::UnknownBook(location.book_id));
            }
            Err(e) => {
                let e = e.context(format!("failed to load book {}", location.book_id));
                return Err(NavigatorError::Fetch(e));
            }
        };
        if book.total_chapters == 0 {
            return Err(NavigatorError::EmptyBook(location.book_id));
        }

        let chapter = location.chapter_number.clamp(1, book.total_chapters);
        if chapter != location.chapter_number {
            tracing::debug!(
                requested = location.chapter_number,
                chapter,
                "requested chapter out of range, clamped"
            );
        }

        let navigator = ChapterNavigator {
            shared: Arc::new(Shared {
                content,
                book_id: location.book_id,
                state: Mutex::new(NavState {
                    current_chapter: chapter,
                    latest_token: 0,
                    displayed: None,
                    error: None,
                    loading: false,
                }),
            }),
            book_title: book.title,
            total_chapters: book.total_chapters,
        };

        let token = navigator.shared.lock().issue_token();
        navigator.shared.clone().fetch(token, chapter).await;
        Ok(navigator)
    }

    pub fn book_id(&self) -> &str {
        &self.shared.book_id
    }

    pub fn current_chapter(&self) -> u32 {
        self.shared.lock().current_chapter
    }

    /// Advance one chapter. `None` (and no state change) on the last chapter.
    pub fn next(&self) -> Option<JoinHandle<()>> {
        let (token, chapter) = {
            let mut state = self.shared.lock();
            if state.current_chapter >= self.total_chapters {
                return None;
            }
            state.current_chapter += 1;
            (state.issue_token(), state.current_chapter)
        };
        Some(self.spawn_fetch(token, chapter))
    }

    /// Go back one chapter. `None` (and no state change) on chapter 1.
    pub fn prev(&self) -> Option<JoinHandle<()>> {
        let (token, chapter) = {
            let mut state = self.shared.lock();
            if state.current_chapter <= 1 {
                return None;
            }
            state.current_chapter -= 1;
            (state.issue_token(), state.current_chapter)
        };
        Some(self.spawn_fetch(token, chapter))
    }

    fn spawn_fetch(&self, token: u64, chapter: u32) -> JoinHandle<()> {
        tracing::debug!(book_id = %self.shared.book_id, chapter, token, "fetching chapter");
        tokio::spawn(self.shared.clone().fetch(token, chapter))
    }

    pub fn view(&self) -> ReaderView {
        let state = self.shared.lock();
        let book_id = self.shared.book_id.clone();
        let location = ReaderLocation::new(book_id.clone(), state.current_chapter);
        let breadcrumbs = vec![
            Breadcrumb {
                label: "Home".into(),
                href: "/".into(),
            },
            Breadcrumb {
                label: self.book_title.clone(),
                href: format!("/books/{}", book_id),
            },
            Breadcrumb {
                label: format!("Chapter {}", state.current_chapter),
                href: location.href(),
            },
        ];
        ReaderView {
            book_id,
            book_title: self.book_title.clone(),
            current_chapter: state.current_chapter,
            total_chapters: self.total_chapters,
            can_prev: state.current_chapter > 1,
            can_next: state.current_chapter < self.total_chapters,
            loading: state.loading,
            chapter: state.displayed.clone(),
            error: state.error.clone(),
            breadcrumbs,
        }
    }
}
