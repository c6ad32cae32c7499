use std::sync::Arc;

use super::{CachedRepository, SaveOutcome};
use crate::db::ObjectStore;
use crate::domain::Video;
use crate::mapper::VideoMapper;
use crate::register::KeyValueRegister;

pub struct VideoRepository {
    inner: CachedRepository<VideoMapper>,
}

impl VideoRepository {
    pub fn new(
        store: ObjectStore,
        sessions: Arc<dyn KeyValueRegister>,
        payload_threshold_bytes: u64,
    ) -> Self {
        Self {
            inner: CachedRepository::new(
                store,
                sessions,
                VideoMapper {
                    payload_threshold_bytes,
                },
            ),
        }
    }

    pub async fn save(&self, video: Video) -> SaveOutcome {
        self.inner.save(video).await
    }

    pub async fn find_by_id(&self, id: &str) -> Option<Video> {
        self.inner.find_by_id(id).await
    }

    /// Every video of the current session, without knowing any id up front
    pub async fn find_all(&self) -> Vec<Video> {
        self.inner.find_all_in_session().await
    }

    pub fn evict_all(&self) {
        self.inner.evict_all();
    }
}
