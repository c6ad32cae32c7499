//! Record mapper
//!
//! Bidirectional transforms between the domain aggregates and their persisted records:
//! milliseconds inside the domain, float seconds at the record boundary; ordered selection
//! sets flattened to arrays; large video payloads elided to metadata-only records.

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::domain::{Highlight, Section, Sentence, Transcript, Video, VideoMetadata};
use crate::record::{
    HighlightRecord, SectionRecord, SentenceRecord, StoredRecord, TranscriptRecord,
    VideoMetadataRecord, VideoRecord,
};

/// Translates one aggregate type to and from its record shape
pub trait RecordMapper: Send + Sync + 'static {
    type Entity: Clone + Send + Sync + 'static;
    type Record: StoredRecord;

    fn entity_id(entity: &Self::Entity) -> &str;

    /// The video the entity belongs to (a video's own id for videos)
    fn owner_id(entity: &Self::Entity) -> &str;

    fn encode(
        &self,
        entity: &Self::Entity,
        session_tag: &str,
        saved_at: DateTime<Utc>,
    ) -> Self::Record;

    fn decode(&self, record: Self::Record) -> Self::Entity;
}

pub fn ms_to_seconds(ms: u64) -> f64 {
    ms as f64 / 1000.0
}

/// Negative and non-finite inputs clamp to zero
pub fn seconds_to_ms(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0).round() as u64
}

/// How a video payload is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadStrategy {
    /// Payload bytes stored alongside the metadata
    Full,
    /// Payload dropped; only metadata is stored
    MetadataOnly,
}

/// Payloads strictly larger than `threshold` bytes are elided
pub fn select_payload_strategy(size: u64, threshold: u64) -> PayloadStrategy {
    if size > threshold {
        PayloadStrategy::MetadataOnly
    } else {
        PayloadStrategy::Full
    }
}

/// An encoded video record, tagged with the strategy that produced it
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedVideo {
    Full(VideoRecord),
    MetadataOnly(VideoRecord),
}

impl EncodedVideo {
    pub fn strategy(&self) -> PayloadStrategy {
        match self {
            EncodedVideo::Full(_) => PayloadStrategy::Full,
            EncodedVideo::MetadataOnly(_) => PayloadStrategy::MetadataOnly,
        }
    }

    pub fn record(&self) -> &VideoRecord {
        match self {
            EncodedVideo::Full(record) | EncodedVideo::MetadataOnly(record) => record,
        }
    }

    pub fn into_record(self) -> VideoRecord {
        match self {
            EncodedVideo::Full(record) | EncodedVideo::MetadataOnly(record) => record,
        }
    }
}

/// Encode a video, eliding its payload when it exceeds `threshold` bytes.
///
/// The size checked is the larger of the payload length and the recorded metadata size.
/// A video without a payload is always encoded metadata-only.
pub fn encode_video(
    video: &Video,
    session_tag: &str,
    saved_at: DateTime<Utc>,
    threshold: u64,
) -> EncodedVideo {
    let metadata = VideoMetadataRecord {
        duration: ms_to_seconds(video.metadata.duration_ms),
        width: video.metadata.width,
        height: video.metadata.height,
        mime: video.metadata.mime.clone(),
        name: video.metadata.name.clone(),
        size: video.metadata.size,
    };

    let mut record = VideoRecord {
        id: video.id.clone(),
        payload: None,
        metadata,
        saved_at,
        session_tag: session_tag.to_string(),
    };

    let Some(payload) = video.payload.as_ref() else {
        return EncodedVideo::MetadataOnly(record);
    };

    let size = video.metadata.size.max(payload.len() as u64);
    match select_payload_strategy(size, threshold) {
        PayloadStrategy::Full => {
            record.payload = Some(payload.to_vec());
            EncodedVideo::Full(record)
        }
        PayloadStrategy::MetadataOnly => EncodedVideo::MetadataOnly(record),
    }
}

/// Decode a video record. A null payload yields a video that needs re-upload.
pub fn decode_video(record: VideoRecord) -> Video {
    let metadata = VideoMetadata {
        duration_ms: seconds_to_ms(record.metadata.duration),
        width: record.metadata.width,
        height: record.metadata.height,
        mime: record.metadata.mime,
        name: record.metadata.name,
        size: record.metadata.size,
    };

    match record.payload {
        Some(payload) => Video {
            id: record.id,
            payload: Some(Bytes::from(payload)),
            metadata,
        },
        None => Video::metadata_only(record.id, metadata),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VideoMapper {
    pub payload_threshold_bytes: u64,
}

impl RecordMapper for VideoMapper {
    type Entity = Video;
    type Record = VideoRecord;

    fn entity_id(entity: &Video) -> &str {
        &entity.id
    }

    fn owner_id(entity: &Video) -> &str {
        &entity.id
    }

    fn encode(&self, entity: &Video, session_tag: &str, saved_at: DateTime<Utc>) -> VideoRecord {
        encode_video(entity, session_tag, saved_at, self.payload_threshold_bytes).into_record()
    }

    fn decode(&self, record: VideoRecord) -> Video {
        decode_video(record)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TranscriptMapper;

impl RecordMapper for TranscriptMapper {
    type Entity = Transcript;
    type Record = TranscriptRecord;

    fn entity_id(entity: &Transcript) -> &str {
        &entity.id
    }

    fn owner_id(entity: &Transcript) -> &str {
        &entity.video_id
    }

    fn encode(
        &self,
        entity: &Transcript,
        session_tag: &str,
        saved_at: DateTime<Utc>,
    ) -> TranscriptRecord {
        let sections = entity
            .sections
            .iter()
            .map(|section| SectionRecord {
                id: section.id.clone(),
                title: section.title.clone(),
                sentences: section
                    .sentences
                    .iter()
                    .map(|sentence| SentenceRecord {
                        id: sentence.id.clone(),
                        text: sentence.text.clone(),
                        start_time: ms_to_seconds(sentence.start_ms),
                        end_time: ms_to_seconds(sentence.end_ms),
                        suggested: sentence.suggested,
                    })
                    .collect(),
            })
            .collect();

        TranscriptRecord {
            id: entity.id.clone(),
            subject_id: entity.video_id.clone(),
            full_text: entity.full_text.clone(),
            sections,
            saved_at,
            session_tag: session_tag.to_string(),
        }
    }

    fn decode(&self, record: TranscriptRecord) -> Transcript {
        let sections = record
            .sections
            .into_iter()
            .map(|section| Section {
                id: section.id,
                title: section.title,
                sentences: section
                    .sentences
                    .into_iter()
                    .map(|sentence| Sentence {
                        id: sentence.id,
                        text: sentence.text,
                        start_ms: seconds_to_ms(sentence.start_time),
                        end_ms: seconds_to_ms(sentence.end_time),
                        suggested: sentence.suggested,
                    })
                    .collect(),
            })
            .collect();

        Transcript {
            id: record.id,
            video_id: record.subject_id,
            full_text: record.full_text,
            sections,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HighlightMapper;

impl RecordMapper for HighlightMapper {
    type Entity = Highlight;
    type Record = HighlightRecord;

    fn entity_id(entity: &Highlight) -> &str {
        &entity.id
    }

    fn owner_id(entity: &Highlight) -> &str {
        &entity.video_id
    }

    fn encode(
        &self,
        entity: &Highlight,
        session_tag: &str,
        saved_at: DateTime<Utc>,
    ) -> HighlightRecord {
        HighlightRecord {
            id: entity.id.clone(),
            subject_id: entity.video_id.clone(),
            name: entity.name.clone(),
            selected_ids: entity.selection.iter().map(str::to_string).collect(),
            saved_at,
            session_tag: session_tag.to_string(),
        }
    }

    /// Rebuilds the selection by replaying insertions in persisted order
    fn decode(&self, record: HighlightRecord) -> Highlight {
        Highlight {
            id: record.id,
            video_id: record.subject_id,
            name: record.name,
            selection: record.selected_ids.into_iter().collect(),
        }
    }
}
