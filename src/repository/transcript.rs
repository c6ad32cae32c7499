use std::sync::Arc;

use super::{CachedRepository, SaveOutcome};
use crate::db::ObjectStore;
use crate::domain::Transcript;
use crate::mapper::TranscriptMapper;
use crate::register::KeyValueRegister;

pub struct TranscriptRepository {
    inner: CachedRepository<TranscriptMapper>,
}

impl TranscriptRepository {
    pub fn new(store: ObjectStore, sessions: Arc<dyn KeyValueRegister>) -> Self {
        Self {
            inner: CachedRepository::new(store, sessions, TranscriptMapper),
        }
    }

    pub async fn save(&self, transcript: Transcript) -> SaveOutcome {
        self.inner.save(transcript).await
    }

    pub async fn find_by_id(&self, id: &str) -> Option<Transcript> {
        self.inner.find_by_id(id).await
    }

    /// The transcript of `video_id`; a video has at most one
    pub async fn find_by_owner(&self, video_id: &str) -> Option<Transcript> {
        self.inner.find_one_by_owner(video_id).await
    }

    pub fn evict_all(&self) {
        self.inner.evict_all();
    }
}
