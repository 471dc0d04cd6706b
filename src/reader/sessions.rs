use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ChapterNavigator, NavigatorError};
use crate::{content_client::ContentService, domain::models::ReaderLocation};

/// Open reader views, one navigator each. Closing a session drops its navigator; fetches
/// still in flight finish against the dropped state and go nowhere.
pub struct ReaderSessions {
    content: Arc<dyn ContentService>,
    sessions: RwLock<HashMap<Uuid, Arc<ChapterNavigator>>>,
}

impl ReaderSessions {
    pub fn new(content: Arc<dyn ContentService>) -> Self {
        Self {
            content,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn open(
        &self,
        location: ReaderLocation,
    ) -> Result<(Uuid, Arc<ChapterNavigator>), NavigatorError> {
        let navigator =
            Arc::new(ChapterNavigator::activate(self.content.clone(), location).await?);
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(id, navigator.clone());
        tracing::info!(session_id = %id, book_id = %navigator.book_id(), "reader session opened");
        Ok((id, navigator))
    }

    pub async fn get(&self, id: &Uuid) -> Option<Arc<ChapterNavigator>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Returns false when no such session exists.
    pub async fn close(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "reader session closed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
