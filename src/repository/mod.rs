//! Repository façades
//!
//! One façade per aggregate. Each keeps an in-memory map that is the source of truth for
//! the running process and writes through to the object store on a best-effort basis.
//! Reads consult the map first and hydrate it from the store on a miss.
//!
//! Store reads are scoped to the session tag currently held by the ephemeral register:
//! records owned by another tab's session are never returned.

mod cached;
pub mod highlight;
pub mod transcript;
pub mod video;

use std::sync::Arc;

pub use cached::CachedRepository;
pub use highlight::HighlightRepository;
pub use transcript::TranscriptRepository;
pub use video::VideoRepository;

use crate::db::ObjectStore;
use crate::register::KeyValueRegister;

/// Outcome of a `save`: the in-memory write always happens, persistence may not
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub in_memory: bool,
    pub persisted: bool,
}

impl SaveOutcome {
    pub fn memory_only() -> Self {
        Self {
            in_memory: true,
            persisted: false,
        }
    }

    pub fn persisted() -> Self {
        Self {
            in_memory: true,
            persisted: true,
        }
    }
}

/// The three façades sharing one store and one ephemeral session register
pub struct Repositories {
    pub videos: VideoRepository,
    pub transcripts: TranscriptRepository,
    pub highlights: HighlightRepository,
}

impl Repositories {
    pub fn new(
        store: ObjectStore,
        sessions: Arc<dyn KeyValueRegister>,
        payload_threshold_bytes: u64,
    ) -> Self {
        Self {
            videos: VideoRepository::new(store.clone(), sessions.clone(), payload_threshold_bytes),
            transcripts: TranscriptRepository::new(store.clone(), sessions.clone()),
            highlights: HighlightRepository::new(store, sessions),
        }
    }

    /// Drop every cached aggregate, e.g. after the session's records were purged
    pub fn evict_all(&self) {
        self.videos.evict_all();
        self.transcripts.evict_all();
        self.highlights.evict_all();
    }
}
