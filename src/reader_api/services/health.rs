use poem_openapi::payload::PlainText;

use crate::{progress::ProgressStore, reader::ReaderSessions};

pub struct HealthService<'a> {
    pub store: &'a ProgressStore,
    pub sessions: &'a ReaderSessions,
}

impl<'a> HealthService<'a> {
    pub fn new(store: &'a ProgressStore, sessions: &'a ReaderSessions) -> Self {
        Self { store, sessions }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn status_text(&self) -> PlainText<String> {
        PlainText(format!(
            "{} version={} reader_sessions={} feed_subscribers={}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            self.sessions.len().await,
            self.store.subscriber_count()
        ))
    }
}
