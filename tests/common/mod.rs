//! Fixtures shared by the integration tests
#![allow(dead_code)]

use bytes::Bytes;
use std::sync::Arc;

use highlight_session::db::ObjectStore;
use highlight_session::domain::{Highlight, Section, Sentence, Transcript, Video, VideoMetadata};
use highlight_session::lifecycle::SessionContext;
use highlight_session::register::{FileRegister, KeyValueRegister, MemoryRegister};

pub const RETENTION_HOURS: i64 = 24;

pub fn video(payload_len: usize) -> Video {
    Video::from_upload(
        Bytes::from(vec![7u8; payload_len]),
        VideoMetadata {
            duration_ms: 90_500,
            width: 1280,
            height: 720,
            mime: "video/mp4".to_string(),
            name: "interview.mp4".to_string(),
            size: 0,
        },
    )
}

fn sentence(id: &str, start_ms: u64, end_ms: u64) -> Sentence {
    Sentence {
        id: id.to_string(),
        text: format!("Sentence {}.", id),
        start_ms,
        end_ms,
        suggested: id == "s1",
    }
}

/// Transcript with sentences s1..s3 in one section
pub fn transcript(video_id: &str) -> Transcript {
    Transcript::new(
        video_id,
        "Sentence s1. Sentence s2. Sentence s3.",
        vec![Section {
            id: "sec1".to_string(),
            title: "Opening".to_string(),
            sentences: vec![
                sentence("s1", 0, 1_500),
                sentence("s2", 1_500, 3_250),
                sentence("s3", 3_250, 5_001),
            ],
        }],
    )
}

/// Highlight selecting s3, s1, s2 in that order
pub fn highlight(video_id: &str) -> Highlight {
    let mut highlight = Highlight::new(video_id, "Teaser");
    highlight.selection.insert("s3");
    highlight.selection.insert("s1");
    highlight.selection.insert("s2");
    highlight
}

/// One tab: its own ephemeral register, plus the shared store and durable register
pub fn tab(
    store: &ObjectStore,
    durable: &Arc<dyn KeyValueRegister>,
    payload_threshold_bytes: u64,
) -> SessionContext {
    SessionContext::new(
        store.clone(),
        Arc::new(MemoryRegister::new()),
        durable.clone(),
        payload_threshold_bytes,
        RETENTION_HOURS,
    )
}

/// The same tab after a reload: registers survive, in-memory repositories do not
pub fn reload(context: &SessionContext, payload_threshold_bytes: u64) -> SessionContext {
    SessionContext::new(
        context.store.clone(),
        context.ephemeral.clone(),
        context.durable.clone(),
        payload_threshold_bytes,
        RETENTION_HOURS,
    )
}

pub fn durable_register(dir: &tempfile::TempDir) -> Arc<dyn KeyValueRegister> {
    Arc::new(FileRegister::new(dir.path().join("registers.json")))
}

/// Save a complete video/transcript/highlight triple through the repositories
pub async fn save_triple(context: &SessionContext, video: Video) -> (Video, Transcript, Highlight) {
    let transcript = transcript(&video.id);
    let highlight = highlight(&video.id);

    let repositories = &context.repositories;
    assert!(repositories.videos.save(video.clone()).await.persisted);
    assert!(repositories.transcripts.save(transcript.clone()).await.persisted);
    assert!(repositories.highlights.save(highlight.clone()).await.persisted);

    (video, transcript, highlight)
}
