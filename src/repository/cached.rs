use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use log::{debug, warn};

use super::SaveOutcome;
use crate::db::ObjectStore;
use crate::mapper::RecordMapper;
use crate::record::{IndexKey, StoredRecord};
use crate::register::KeyValueRegister;
use crate::session::{self, SessionTag};

/// A cached entity and the order in which it was last written to the cache
struct CacheEntry<E> {
    seq: u64,
    entity: E,
}

/// Read-through/write-through cache over one record collection
pub struct CachedRepository<M: RecordMapper> {
    store: ObjectStore,
    sessions: Arc<dyn KeyValueRegister>,
    mapper: M,
    cache: DashMap<String, CacheEntry<M::Entity>>,
    next_seq: AtomicU64,
}

impl<M: RecordMapper> CachedRepository<M> {
    pub fn new(store: ObjectStore, sessions: Arc<dyn KeyValueRegister>, mapper: M) -> Self {
        Self {
            store,
            sessions,
            mapper,
            cache: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Commit to memory, then persist under the current session tag (created if absent).
    /// A failed persist leaves the in-memory write in place.
    pub async fn save(&self, entity: M::Entity) -> SaveOutcome {
        let id = M::entity_id(&entity).to_string();
        self.remember(entity.clone());

        let session = match session::ensure_session(self.sessions.as_ref()) {
            Ok(session) => session,
            Err(e) => {
                warn!(
                    "No session tag for {} {}, keeping it in memory only: {}",
                    <M::Record as StoredRecord>::COLLECTION,
                    id,
                    e
                );
                return SaveOutcome::memory_only();
            }
        };

        let record = self.mapper.encode(&entity, session.tag.as_str(), Utc::now());
        if self.store.put(&record).await {
            SaveOutcome::persisted()
        } else {
            SaveOutcome::memory_only()
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Option<M::Entity> {
        if let Some(entity) = self.cached(id) {
            return Some(entity);
        }

        let tag = self.current_tag()?;
        let record: M::Record = self.store.get(id).await?;
        if record.session_tag() != tag.as_str() {
            debug!(
                "Ignoring {} {} owned by another session",
                <M::Record as StoredRecord>::COLLECTION,
                id
            );
            return None;
        }
        Some(self.hydrate(record))
    }

    /// Every entity of the current session, stored and in-memory, de-duplicated by id
    pub async fn find_all_in_session(&self) -> Vec<M::Entity> {
        let stored = match self.current_tag() {
            Some(tag) => {
                self.store
                    .get_all_by_index::<M::Record>(IndexKey::SessionTag(tag.as_str()))
                    .await
            }
            None => Vec::new(),
        };
        self.merge(stored, |_| true)
    }

    /// Every entity of the current session owned by `owner_id`
    pub async fn find_all_by_owner(&self, owner_id: &str) -> Vec<M::Entity> {
        let stored = self.stored_by_owner(owner_id).await;
        self.merge(stored, |entity| M::owner_id(entity) == owner_id)
    }

    /// The entity owned by `owner_id` that was written most recently: the last one cached,
    /// else the newest stored one
    pub async fn find_one_by_owner(&self, owner_id: &str) -> Option<M::Entity> {
        let cached = self
            .cache
            .iter()
            .filter(|entry| M::owner_id(&entry.value().entity) == owner_id)
            .max_by_key(|entry| entry.value().seq)
            .map(|entry| entry.value().entity.clone());
        if cached.is_some() {
            return cached;
        }

        let newest = self.stored_by_owner(owner_id).await.pop()?;
        Some(self.hydrate(newest))
    }

    pub fn evict_all(&self) {
        self.cache.clear();
    }

    fn remember(&self, entity: M::Entity) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.cache
            .insert(M::entity_id(&entity).to_string(), CacheEntry { seq, entity });
    }

    fn cached(&self, id: &str) -> Option<M::Entity> {
        self.cache.get(id).map(|entry| entry.value().entity.clone())
    }

    fn current_tag(&self) -> Option<SessionTag> {
        session::current_session(self.sessions.as_ref()).map(|session| session.tag)
    }

    /// Store records owned by `owner_id` in the current session, oldest first
    async fn stored_by_owner(&self, owner_id: &str) -> Vec<M::Record> {
        let Some(tag) = self.current_tag() else {
            return Vec::new();
        };
        self.store
            .get_all_by_index::<M::Record>(IndexKey::SubjectId(owner_id))
            .await
            .into_iter()
            .filter(|record| record.session_tag() == tag.as_str())
            .collect()
    }

    fn hydrate(&self, record: M::Record) -> M::Entity {
        let entity = self.mapper.decode(record);
        self.remember(entity.clone());
        entity
    }

    /// Store order first (in-memory copies win over stored ones), then entities that only
    /// exist in memory, in the order they were cached
    fn merge<F>(&self, stored: Vec<M::Record>, keep: F) -> Vec<M::Entity>
    where
        F: Fn(&M::Entity) -> bool,
    {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();

        for record in stored {
            let id = record.id().to_string();
            if seen.contains(&id) {
                continue;
            }
            let entity = match self.cached(&id) {
                Some(entity) => entity,
                None => self.hydrate(record),
            };
            seen.insert(id);
            if keep(&entity) {
                merged.push(entity);
            }
        }

        let mut memory_only: Vec<(u64, M::Entity)> = self
            .cache
            .iter()
            .filter(|entry| !seen.contains(entry.key()) && keep(&entry.value().entity))
            .map(|entry| (entry.value().seq, entry.value().entity.clone()))
            .collect();
        memory_only.sort_by_key(|(seq, _)| *seq);

        merged.extend(memory_only.into_iter().map(|(_, entity)| entity));
        merged
    }
}
