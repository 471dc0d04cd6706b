use std::sync::Arc;

use futures::{StreamExt, stream::BoxStream};
use poem_openapi::payload::{EventStream, Json};

use crate::{
    progress::ProgressStore,
    reader_api::models::{FeedDto, FeedResponseDto},
    views::{ProgressFeed, feed::render},
};

pub struct FeedService {
    pub store: Arc<ProgressStore>,
}

impl FeedService {
    pub fn new(store: Arc<ProgressStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn snapshot(&self) -> FeedResponseDto {
        let entries = render(&self.store.get_all().await);
        FeedResponseDto::Ok(Json(FeedDto::from(entries.as_slice())))
    }

    /// Initial render, then one render per store change. The feed (and its
    /// subscription) lives exactly as long as the client keeps the stream open.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn events(&self) -> EventStream<BoxStream<'static, FeedDto>> {
        let feed = ProgressFeed::activate(self.store.clone()).await;
        let initial = FeedDto::from(feed.entries());
        let updates = futures::stream::unfold(feed, |mut feed| async move {
            let dto = FeedDto::from(feed.changed().await?);
            Some((dto, feed))
        });
        EventStream::new(futures::stream::once(async move { initial }).chain(updates).boxed())
    }
}
