//! # Object Store Tests
//!
//! These tests exercise the SQLite-backed object store directly: upserts, secondary-index
//! lookups, predicate deletes, the transactional session purge and the no-op fallback.
//!
//! ## Running the Tests
//!
//! ```bash
//! cargo test --test store_test
//! ```

use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;

use highlight_session::db::{self, ObjectStore, PurgeCounts};
use highlight_session::error::StoreError;
use highlight_session::record::{
    HighlightRecord, IndexKey, SectionRecord, SentenceRecord, TranscriptRecord,
    VideoMetadataRecord, VideoRecord,
};

const SESSION_A: &str = "session_1730000000000_aaaaaaaaaaaa";
const SESSION_B: &str = "session_1730000000000_bbbbbbbbbbbb";

fn at(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).unwrap()
}

fn video_record(id: &str, session_tag: &str, saved_at_ms: i64) -> VideoRecord {
    VideoRecord {
        id: id.to_string(),
        payload: Some(vec![1, 2, 3, 4]),
        metadata: VideoMetadataRecord {
            duration: 12.345,
            width: 1920,
            height: 1080,
            mime: "video/mp4".to_string(),
            name: format!("{}.mp4", id),
            size: 4,
        },
        saved_at: at(saved_at_ms),
        session_tag: session_tag.to_string(),
    }
}

fn transcript_record(
    id: &str,
    video_id: &str,
    session_tag: &str,
    saved_at_ms: i64,
) -> TranscriptRecord {
    TranscriptRecord {
        id: id.to_string(),
        subject_id: video_id.to_string(),
        full_text: "Hello there. General Kenobi.".to_string(),
        sections: vec![SectionRecord {
            id: "sec1".to_string(),
            title: "Intro".to_string(),
            sentences: vec![
                SentenceRecord {
                    id: "s1".to_string(),
                    text: "Hello there.".to_string(),
                    start_time: 0.0,
                    end_time: 1.25,
                    suggested: true,
                },
                SentenceRecord {
                    id: "s2".to_string(),
                    text: "General Kenobi.".to_string(),
                    start_time: 1.25,
                    end_time: 2.5,
                    suggested: false,
                },
            ],
        }],
        saved_at: at(saved_at_ms),
        session_tag: session_tag.to_string(),
    }
}

fn highlight_record(
    id: &str,
    video_id: &str,
    session_tag: &str,
    saved_at_ms: i64,
) -> HighlightRecord {
    HighlightRecord {
        id: id.to_string(),
        subject_id: video_id.to_string(),
        name: "Best bits".to_string(),
        selected_ids: vec!["s2".to_string(), "s1".to_string()],
        saved_at: at(saved_at_ms),
        session_tag: session_tag.to_string(),
    }
}

/// Store one video/transcript/highlight triple under `session_tag`
async fn put_triple(store: &ObjectStore, prefix: &str, session_tag: &str, saved_at_ms: i64) {
    let video_id = format!("{}-video", prefix);
    let transcript_id = format!("{}-transcript", prefix);
    let highlight_id = format!("{}-highlight", prefix);

    assert!(store.put(&video_record(&video_id, session_tag, saved_at_ms)).await);
    let transcript = transcript_record(&transcript_id, &video_id, session_tag, saved_at_ms);
    assert!(store.put(&transcript).await);
    let highlight = highlight_record(&highlight_id, &video_id, session_tag, saved_at_ms);
    assert!(store.put(&highlight).await);
}

#[tokio::test]
async fn test_put_twice_keeps_one_record_with_latest_fields() {
    let (store, _guard) = db::open_in_temporary_file().await.unwrap();

    let mut record = video_record("v1", SESSION_A, 1_730_000_000_000);
    assert!(store.put(&record).await);

    record.metadata.name = "renamed.mp4".to_string();
    record.payload = None;
    record.saved_at = at(1_730_000_005_000);
    assert!(store.put(&record).await);

    let all = store.get_all::<VideoRecord>().await;
    assert_eq!(all.len(), 1, "Upsert must not duplicate the record");
    assert_eq!(all[0], record);
}

#[tokio::test]
async fn test_get_round_trips_every_collection() {
    let (store, _guard) = db::open_in_temporary_file().await.unwrap();
    put_triple(&store, "a", SESSION_A, 1_730_000_000_000).await;

    let video: VideoRecord = store.get("a-video").await.unwrap();
    assert_eq!(video, video_record("a-video", SESSION_A, 1_730_000_000_000));

    let transcript: TranscriptRecord = store.get("a-transcript").await.unwrap();
    assert_eq!(
        transcript,
        transcript_record("a-transcript", "a-video", SESSION_A, 1_730_000_000_000)
    );

    let highlight: HighlightRecord = store.get("a-highlight").await.unwrap();
    assert_eq!(highlight.selected_ids, vec!["s2", "s1"]);

    assert!(store.get::<VideoRecord>("missing").await.is_none());
}

#[tokio::test]
async fn test_get_all_by_index() {
    let (store, _guard) = db::open_in_temporary_file().await.unwrap();
    put_triple(&store, "a", SESSION_A, 1_730_000_000_000).await;
    put_triple(&store, "b", SESSION_B, 1_730_000_001_000).await;
    assert!(
        store
            .put(&highlight_record("a-highlight-2", "a-video", SESSION_A, 1_730_000_002_000))
            .await
    );

    let highlights = store
        .get_all_by_index::<HighlightRecord>(IndexKey::SubjectId("a-video"))
        .await;
    let ids: Vec<&str> = highlights.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["a-highlight", "a-highlight-2"], "Ordered by saved_at");

    let videos = store
        .get_all_by_index::<VideoRecord>(IndexKey::SessionTag(SESSION_B))
        .await;
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].id, "b-video");

    let transcripts = store
        .get_all_by_index::<TranscriptRecord>(IndexKey::SavedAt(at(1_730_000_001_000)))
        .await;
    assert_eq!(transcripts.len(), 1);
    assert_eq!(transcripts[0].id, "b-transcript");

    let none = store
        .get_all_by_index::<TranscriptRecord>(IndexKey::SubjectId("unknown"))
        .await;
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_delete_where_removes_only_matching_records() {
    let (store, _guard) = db::open_in_temporary_file().await.unwrap();
    put_triple(&store, "a", SESSION_A, 1_730_000_000_000).await;
    put_triple(&store, "b", SESSION_B, 1_730_000_001_000).await;

    let deleted = store
        .delete_where::<VideoRecord, _>(|record| record.session_tag == SESSION_A)
        .await;
    assert_eq!(deleted, 1);

    let remaining = store.get_all::<VideoRecord>().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "b-video");
    assert_eq!(store.get_all::<TranscriptRecord>().await.len(), 2);

    let deleted = store
        .delete_where::<VideoRecord, _>(|record| record.id == "nothing")
        .await;
    assert_eq!(deleted, 0);
}

#[tokio::test]
async fn test_delete_all_for_session_leaves_other_sessions() {
    let (store, _guard) = db::open_in_temporary_file().await.unwrap();
    put_triple(&store, "a", SESSION_A, 1_730_000_000_000).await;
    put_triple(&store, "b", SESSION_B, 1_730_000_001_000).await;

    let counts = store.delete_all_for_session(SESSION_A).await.unwrap();
    assert_eq!(
        counts,
        PurgeCounts {
            videos: 1,
            transcripts: 1,
            highlights: 1,
        }
    );

    assert!(store.get::<VideoRecord>("a-video").await.is_none());
    assert!(store.get::<VideoRecord>("b-video").await.is_some());
    assert!(store.get::<TranscriptRecord>("b-transcript").await.is_some());
    assert!(store.get::<HighlightRecord>("b-highlight").await.is_some());

    let again = store.delete_all_for_session(SESSION_A).await.unwrap();
    assert_eq!(again.total(), 0);
}

#[tokio::test]
async fn test_failed_purge_rolls_back_every_collection() {
    let (store, _guard) = db::open_in_temporary_file().await.unwrap();
    put_triple(&store, "a", SESSION_A, 1_730_000_000_000).await;

    // Break the last collection the purge touches
    sqlx::query("DROP TABLE highlights")
        .execute(store.pool().unwrap())
        .await
        .unwrap();

    let err = store.delete_all_for_session(SESSION_A).await.unwrap_err();
    match err {
        StoreError::PurgeFailed { session_tag, .. } => assert_eq!(session_tag, SESSION_A),
        other => panic!("Expected PurgeFailed, got {:?}", other),
    }

    assert!(
        store.get::<VideoRecord>("a-video").await.is_some(),
        "Video delete must be rolled back"
    );
    assert!(
        store.get::<TranscriptRecord>("a-transcript").await.is_some(),
        "Transcript delete must be rolled back"
    );
}

#[tokio::test]
async fn test_corrupt_row_is_skipped() {
    let (store, _guard) = db::open_in_temporary_file().await.unwrap();
    assert!(store.put(&video_record("good", SESSION_A, 1_730_000_000_000)).await);
    assert!(store.put(&video_record("bad", SESSION_A, 1_730_000_000_000)).await);

    sqlx::query("UPDATE videos SET width = -1 WHERE id = 'bad'")
        .execute(store.pool().unwrap())
        .await
        .unwrap();

    assert!(store.get::<VideoRecord>("bad").await.is_none());
    let all = store.get_all::<VideoRecord>().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, "good");
}

#[tokio::test]
async fn test_video_size_beyond_integer_range_is_rejected() {
    let (store, _guard) = db::open_in_temporary_file().await.unwrap();

    let mut record = video_record("huge", SESSION_A, 1_730_000_000_000);
    record.metadata.size = u64::MAX;
    assert!(!store.put(&record).await);
    assert!(store.get::<VideoRecord>("huge").await.is_none());
    assert_eq!(store.count::<VideoRecord>().await, 0);

    record.metadata.size = i64::MAX as u64;
    assert!(store.put(&record).await);
    let stored = store.get::<VideoRecord>("huge").await.unwrap();
    assert_eq!(stored.metadata.size, i64::MAX as u64);
}

#[tokio::test]
async fn test_count_includes_rows_that_do_not_decode() {
    let (store, _guard) = db::open_in_temporary_file().await.unwrap();
    put_triple(&store, "a", SESSION_A, 1_730_000_000_000).await;
    put_triple(&store, "b", SESSION_B, 1_730_000_000_000).await;
    assert_eq!(store.count::<VideoRecord>().await, 2);
    assert_eq!(store.count::<TranscriptRecord>().await, 2);
    assert_eq!(store.count::<HighlightRecord>().await, 2);

    sqlx::query("UPDATE videos SET width = -1 WHERE id = 'a-video'")
        .execute(store.pool().unwrap())
        .await
        .unwrap();
    assert_eq!(store.get_all::<VideoRecord>().await.len(), 1);
    assert_eq!(store.count::<VideoRecord>().await, 2);
}

#[tokio::test]
async fn test_unavailable_store_is_a_no_op() {
    let store = ObjectStore::unavailable();
    assert!(!store.is_available());

    assert!(!store.put(&video_record("v1", SESSION_A, 1_730_000_000_000)).await);
    assert!(store.get::<VideoRecord>("v1").await.is_none());
    assert!(store.get_all::<VideoRecord>().await.is_empty());
    assert!(store
        .get_all_by_index::<HighlightRecord>(IndexKey::SessionTag(SESSION_A))
        .await
        .is_empty());
    assert_eq!(store.delete_where::<VideoRecord, _>(|_| true).await, 0);
    assert_eq!(store.count::<VideoRecord>().await, 0);
    assert!(matches!(
        store.delete_all_for_session(SESSION_A).await,
        Err(StoreError::Unavailable)
    ));
}

#[tokio::test]
async fn test_open_creates_database_and_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("session.sqlite");

    let store = ObjectStore::open(&db_path, Duration::from_secs(5)).await;
    assert!(store.is_available());
    assert!(store.put(&video_record("v1", SESSION_A, 1_730_000_000_000)).await);
    drop(store);

    let reopened = ObjectStore::open(&db_path, Duration::from_secs(5)).await;
    assert!(reopened.get::<VideoRecord>("v1").await.is_some());
}

#[tokio::test]
async fn test_version_mismatch_degrades_to_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("session.sqlite");

    let pool = db::open_database(&db_path).await.unwrap();
    sqlx::query("UPDATE metadata SET value = '999' WHERE key = 'version'")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    assert!(matches!(
        db::open_database(&db_path).await,
        Err(StoreError::VersionMismatch { .. })
    ));

    let store = ObjectStore::open(&db_path, Duration::from_secs(5)).await;
    assert!(!store.is_available());
}

#[tokio::test]
async fn test_unopenable_path_degrades_to_no_op() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be opened as a database file
    let store = ObjectStore::open(dir.path(), Duration::from_secs(5)).await;
    assert!(!store.is_available());
}
