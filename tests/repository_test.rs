//! # Repository Façade Tests
//!
//! These tests cover the in-memory/persistent dual write, hydration from the store after a
//! reload, payload elision and the per-tab session isolation of reads.
//!
//! ## Running the Tests
//!
//! ```bash
//! cargo test --test repository_test
//! ```

mod common;

use std::sync::Arc;

use highlight_session::constants::{DEFAULT_PAYLOAD_THRESHOLD_BYTES, SESSION_TAG_KEY};
use highlight_session::db::{self, ObjectStore};
use highlight_session::domain::Transcript;
use highlight_session::record::{HighlightRecord, IndexKey, VideoRecord};
use highlight_session::register::{KeyValueRegister, MemoryRegister};
use highlight_session::repository::{Repositories, SaveOutcome};
use highlight_session::session;

const THRESHOLD: u64 = DEFAULT_PAYLOAD_THRESHOLD_BYTES;

#[tokio::test]
async fn test_save_reports_persisted() {
    let (store, _guard) = db::open_in_temporary_file().await.unwrap();
    let repositories = Repositories::new(store, Arc::new(MemoryRegister::new()), THRESHOLD);

    let outcome = repositories.videos.save(common::video(64)).await;
    assert_eq!(outcome, SaveOutcome::persisted());
}

#[tokio::test]
async fn test_save_without_store_stays_in_memory() {
    let repositories = Repositories::new(
        ObjectStore::unavailable(),
        Arc::new(MemoryRegister::new()),
        THRESHOLD,
    );
    let video = common::video(64);

    let outcome = repositories.videos.save(video.clone()).await;
    assert_eq!(outcome, SaveOutcome::memory_only());
    assert!(outcome.in_memory);

    assert_eq!(repositories.videos.find_by_id(&video.id).await, Some(video.clone()));
    assert_eq!(repositories.videos.find_all().await, vec![video]);
}

#[tokio::test]
async fn test_save_creates_session_tag_once() {
    let (store, _guard) = db::open_in_temporary_file().await.unwrap();
    let ephemeral: Arc<dyn KeyValueRegister> = Arc::new(MemoryRegister::new());
    let repositories = Repositories::new(store.clone(), ephemeral.clone(), THRESHOLD);
    assert_eq!(ephemeral.get(SESSION_TAG_KEY).unwrap(), None);

    let video = common::video(16);
    repositories.videos.save(video.clone()).await;
    let tag = session::current_session(ephemeral.as_ref()).unwrap().tag;

    repositories.transcripts.save(common::transcript(&video.id)).await;
    assert_eq!(session::current_session(ephemeral.as_ref()).unwrap().tag, tag);

    let stored = store
        .get_all_by_index::<VideoRecord>(IndexKey::SessionTag(tag.as_str()))
        .await;
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_repeated_save_upserts() {
    let (store, _guard) = db::open_in_temporary_file().await.unwrap();
    let repositories = Repositories::new(store.clone(), Arc::new(MemoryRegister::new()), THRESHOLD);

    let mut highlight = common::highlight("video-1");
    repositories.highlights.save(highlight.clone()).await;
    highlight.name = "Final cut".to_string();
    highlight.selection.remove("s1");
    repositories.highlights.save(highlight.clone()).await;

    let stored = store
        .get_all_by_index::<HighlightRecord>(IndexKey::SubjectId("video-1"))
        .await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Final cut");
    assert_eq!(stored[0].selected_ids, vec!["s3", "s2"]);
}

#[tokio::test]
async fn test_find_hydrates_from_store_after_reload() {
    let (store, _guard) = db::open_in_temporary_file().await.unwrap();
    let ephemeral: Arc<dyn KeyValueRegister> = Arc::new(MemoryRegister::new());

    let video = common::video(256);
    let transcript = common::transcript(&video.id);
    let highlight = common::highlight(&video.id);
    {
        let repositories = Repositories::new(store.clone(), ephemeral.clone(), THRESHOLD);
        repositories.videos.save(video.clone()).await;
        repositories.transcripts.save(transcript.clone()).await;
        repositories.highlights.save(highlight.clone()).await;
    }

    let reloaded = Repositories::new(store, ephemeral, THRESHOLD);
    assert_eq!(reloaded.videos.find_by_id(&video.id).await, Some(video.clone()));
    assert_eq!(reloaded.videos.find_all().await, vec![video.clone()]);
    assert_eq!(
        reloaded.transcripts.find_by_owner(&video.id).await,
        Some(transcript.clone())
    );
    assert_eq!(
        reloaded.transcripts.find_by_id(&transcript.id).await,
        Some(transcript)
    );

    let highlights = reloaded.highlights.find_by_owner(&video.id).await;
    assert_eq!(highlights, vec![highlight.clone()]);
    assert_eq!(
        highlights[0].selection.iter().collect::<Vec<_>>(),
        vec!["s3", "s1", "s2"]
    );

    assert!(reloaded.videos.find_by_id("missing").await.is_none());
    assert!(reloaded.transcripts.find_by_owner("missing").await.is_none());
    assert!(reloaded.highlights.find_by_owner("missing").await.is_empty());
}

#[tokio::test]
async fn test_find_by_owner_returns_latest_transcript() {
    let (store, _guard) = db::open_in_temporary_file().await.unwrap();
    let repositories = Repositories::new(store.clone(), Arc::new(MemoryRegister::new()), THRESHOLD);

    let mut latest = common::transcript("video-1");
    repositories.transcripts.save(latest.clone()).await;
    for pass in 2..=6 {
        latest = Transcript::new("video-1", format!("Pass {}.", pass), Vec::new());
        repositories.transcripts.save(latest.clone()).await;
        assert_eq!(
            repositories.transcripts.find_by_owner("video-1").await,
            Some(latest.clone()),
            "pass {} must win over earlier transcripts",
            pass
        );
    }

    // Re-saving an older transcript makes it the latest again
    let first = common::transcript("video-1");
    repositories.transcripts.save(first.clone()).await;
    assert_eq!(repositories.transcripts.find_by_owner("video-1").await, Some(first));
}

#[tokio::test]
async fn test_large_payload_is_elided_in_store_only() {
    let (store, _guard) = db::open_in_temporary_file().await.unwrap();
    let ephemeral: Arc<dyn KeyValueRegister> = Arc::new(MemoryRegister::new());
    let threshold = 1024;

    let repositories = Repositories::new(store.clone(), ephemeral.clone(), threshold);
    let video = common::video(4096);
    assert!(repositories.videos.save(video.clone()).await.persisted);

    // This process still holds the bytes
    let cached = repositories.videos.find_by_id(&video.id).await.unwrap();
    assert!(!cached.needs_reupload());

    let reloaded = Repositories::new(store, ephemeral, threshold);
    let restored = reloaded.videos.find_by_id(&video.id).await.unwrap();
    assert!(restored.needs_reupload());
    assert_eq!(restored.metadata, video.metadata);
    assert_eq!(restored.size(), 4096);
}

#[tokio::test]
async fn test_reads_are_isolated_per_session() {
    let (store, _guard) = db::open_in_temporary_file().await.unwrap();
    let tab_a: Arc<dyn KeyValueRegister> = Arc::new(MemoryRegister::new());
    let tab_b: Arc<dyn KeyValueRegister> = Arc::new(MemoryRegister::new());

    let video_a = common::video(32);
    let video_b = common::video(48);
    {
        let repositories_a = Repositories::new(store.clone(), tab_a.clone(), THRESHOLD);
        repositories_a.videos.save(video_a.clone()).await;
        repositories_a.transcripts.save(common::transcript(&video_a.id)).await;
        repositories_a.highlights.save(common::highlight(&video_a.id)).await;

        let repositories_b = Repositories::new(store.clone(), tab_b.clone(), THRESHOLD);
        repositories_b.videos.save(video_b.clone()).await;
        repositories_b.transcripts.save(common::transcript(&video_b.id)).await;
        repositories_b.highlights.save(common::highlight(&video_b.id)).await;
    }
    assert_eq!(store.get_all::<VideoRecord>().await.len(), 2);

    let reloaded_a = Repositories::new(store.clone(), tab_a, THRESHOLD);
    assert_eq!(reloaded_a.videos.find_all().await, vec![video_a.clone()]);
    assert!(reloaded_a.videos.find_by_id(&video_b.id).await.is_none());
    assert!(reloaded_a.transcripts.find_by_owner(&video_b.id).await.is_none());
    assert!(reloaded_a.highlights.find_by_owner(&video_b.id).await.is_empty());

    // A fresh tab has no session yet and sees nothing
    let fresh = Repositories::new(store, Arc::new(MemoryRegister::new()), THRESHOLD);
    assert!(fresh.videos.find_all().await.is_empty());
    assert!(fresh.videos.find_by_id(&video_a.id).await.is_none());
}

#[tokio::test]
async fn test_find_all_merges_memory_and_store() {
    let (store, _guard) = db::open_in_temporary_file().await.unwrap();
    let ephemeral: Arc<dyn KeyValueRegister> = Arc::new(MemoryRegister::new());

    let persisted = common::video(8);
    Repositories::new(store.clone(), ephemeral.clone(), THRESHOLD)
        .videos
        .save(persisted.clone())
        .await;

    // Same tab after a reload, saving while the store is gone
    let offline = Repositories::new(ObjectStore::unavailable(), ephemeral.clone(), THRESHOLD);
    let unsaved = common::video(8);
    assert!(!offline.videos.save(unsaved.clone()).await.persisted);
    assert_eq!(offline.videos.find_all().await, vec![unsaved.clone()]);

    let reloaded = Repositories::new(store, ephemeral, THRESHOLD);
    reloaded.videos.save(unsaved.clone()).await;
    reloaded.videos.save(persisted.clone()).await;
    let all = reloaded.videos.find_all().await;
    assert_eq!(all.len(), 2, "Videos are de-duplicated by id");
    assert!(all.contains(&persisted));
    assert!(all.contains(&unsaved));
}

#[tokio::test]
async fn test_evict_all_drops_cached_entities() {
    let repositories = Repositories::new(
        ObjectStore::unavailable(),
        Arc::new(MemoryRegister::new()),
        THRESHOLD,
    );
    let video = common::video(8);
    repositories.videos.save(video.clone()).await;
    repositories.highlights.save(common::highlight(&video.id)).await;

    repositories.evict_all();
    assert!(repositories.videos.find_by_id(&video.id).await.is_none());
    assert!(repositories.highlights.find_by_owner(&video.id).await.is_empty());
}
