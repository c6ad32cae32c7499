use std::sync::Arc;

use super::{CachedRepository, SaveOutcome};
use crate::db::ObjectStore;
use crate::domain::Highlight;
use crate::mapper::HighlightMapper;
use crate::register::KeyValueRegister;

pub struct HighlightRepository {
    inner: CachedRepository<HighlightMapper>,
}

impl HighlightRepository {
    pub fn new(store: ObjectStore, sessions: Arc<dyn KeyValueRegister>) -> Self {
        Self {
            inner: CachedRepository::new(store, sessions, HighlightMapper),
        }
    }

    pub async fn save(&self, highlight: Highlight) -> SaveOutcome {
        self.inner.save(highlight).await
    }

    pub async fn find_by_id(&self, id: &str) -> Option<Highlight> {
        self.inner.find_by_id(id).await
    }

    /// Zero or more highlights cut from `video_id`
    pub async fn find_by_owner(&self, video_id: &str) -> Vec<Highlight> {
        self.inner.find_all_by_owner(video_id).await
    }

    pub fn evict_all(&self) {
        self.inner.evict_all();
    }
}
