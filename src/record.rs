//! Persisted, storage-shaped records.
//!
//! Records are what the object store reads and writes. They carry the owning session tag
//! and the saved-at timestamp alongside the aggregate's fields; times inside a record are
//! float seconds.

use std::fmt;

use chrono::{DateTime, Utc};
use sea_query::Iden;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::StoreError;
use crate::queries;
use crate::schema::{Highlights, Transcripts, Videos};

/// The three record collections of the object store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Video,
    Transcript,
    Highlight,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Video => "video",
            Collection::Transcript => "transcript",
            Collection::Highlight => "highlight",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secondary-index lookup key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKey<'a> {
    /// Owning subject (video) id. For videos this is the record's own id.
    SubjectId(&'a str),
    /// Owning session tag
    SessionTag(&'a str),
    /// Exact saved-at timestamp
    SavedAt(DateTime<Utc>),
}

/// A record type persisted in one collection of the object store
pub trait StoredRecord: Sized + Send + Sync + Unpin + 'static {
    type Table: Iden + Copy + 'static;

    const COLLECTION: Collection;
    const TABLE: Self::Table;
    const ID: Self::Table;
    const SUBJECT_ID: Self::Table;
    const SAVED_AT: Self::Table;
    const SESSION_TAG: Self::Table;

    fn id(&self) -> &str;
    fn subject_id(&self) -> &str;
    fn session_tag(&self) -> &str;
    fn saved_at(&self) -> DateTime<Utc>;

    /// Build the upsert statement for this record
    fn upsert_sql(&self) -> Result<String, StoreError>;

    /// Decode a full table row
    fn from_row(row: &SqliteRow) -> Result<Self, StoreError>;
}

/// Descriptive video metadata, retained even when the payload is elided
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadataRecord {
    /// Duration in float seconds
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub mime: String,
    pub name: String,
    /// Payload size in bytes
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoRecord {
    pub id: String,
    /// `None` when the payload exceeded the elision threshold
    pub payload: Option<Vec<u8>>,
    pub metadata: VideoMetadataRecord,
    pub saved_at: DateTime<Utc>,
    pub session_tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceRecord {
    pub id: String,
    pub text: String,
    /// Float seconds
    pub start_time: f64,
    /// Float seconds
    pub end_time: f64,
    pub suggested: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRecord {
    pub id: String,
    pub title: String,
    pub sentences: Vec<SentenceRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptRecord {
    pub id: String,
    pub subject_id: String,
    pub full_text: String,
    pub sections: Vec<SectionRecord>,
    pub saved_at: DateTime<Utc>,
    pub session_tag: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightRecord {
    pub id: String,
    pub subject_id: String,
    pub name: String,
    /// Selection order, not temporal order
    pub selected_ids: Vec<String>,
    pub saved_at: DateTime<Utc>,
    pub session_tag: String,
}

fn decode_saved_at(
    collection: Collection,
    id: &str,
    saved_at_ms: i64,
) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(saved_at_ms).ok_or_else(|| StoreError::CorruptRecord {
        collection,
        id: id.to_string(),
        reason: format!("saved_at out of range: {}", saved_at_ms),
    })
}

fn decode_unsigned<T: TryFrom<i64>>(
    collection: Collection,
    id: &str,
    column: &str,
    value: i64,
) -> Result<T, StoreError> {
    T::try_from(value).map_err(|_| StoreError::CorruptRecord {
        collection,
        id: id.to_string(),
        reason: format!("{} out of range: {}", column, value),
    })
}

impl StoredRecord for VideoRecord {
    type Table = Videos;

    const COLLECTION: Collection = Collection::Video;
    const TABLE: Videos = Videos::Table;
    const ID: Videos = Videos::Id;
    const SUBJECT_ID: Videos = Videos::Id;
    const SAVED_AT: Videos = Videos::SavedAt;
    const SESSION_TAG: Videos = Videos::SessionTag;

    fn id(&self) -> &str {
        &self.id
    }

    fn subject_id(&self) -> &str {
        &self.id
    }

    fn session_tag(&self) -> &str {
        &self.session_tag
    }

    fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }

    fn upsert_sql(&self) -> Result<String, StoreError> {
        let size = i64::try_from(self.metadata.size).map_err(|_| StoreError::CorruptRecord {
            collection: Self::COLLECTION,
            id: self.id.clone(),
            reason: format!("size out of range: {}", self.metadata.size),
        })?;
        Ok(queries::videos::upsert(self, size))
    }

    fn from_row(row: &SqliteRow) -> Result<Self, StoreError> {
        let id: String = row.try_get("id")?;
        let saved_at = decode_saved_at(Self::COLLECTION, &id, row.try_get("saved_at")?)?;
        let width: u32 = decode_unsigned(Self::COLLECTION, &id, "width", row.try_get("width")?)?;
        let height: u32 =
            decode_unsigned(Self::COLLECTION, &id, "height", row.try_get("height")?)?;
        let size: u64 = decode_unsigned(Self::COLLECTION, &id, "size", row.try_get("size")?)?;

        Ok(VideoRecord {
            payload: row.try_get("payload")?,
            metadata: VideoMetadataRecord {
                duration: row.try_get("duration")?,
                width,
                height,
                mime: row.try_get("mime")?,
                name: row.try_get("name")?,
                size,
            },
            saved_at,
            session_tag: row.try_get("session_tag")?,
            id,
        })
    }
}

impl StoredRecord for TranscriptRecord {
    type Table = Transcripts;

    const COLLECTION: Collection = Collection::Transcript;
    const TABLE: Transcripts = Transcripts::Table;
    const ID: Transcripts = Transcripts::Id;
    const SUBJECT_ID: Transcripts = Transcripts::SubjectId;
    const SAVED_AT: Transcripts = Transcripts::SavedAt;
    const SESSION_TAG: Transcripts = Transcripts::SessionTag;

    fn id(&self) -> &str {
        &self.id
    }

    fn subject_id(&self) -> &str {
        &self.subject_id
    }

    fn session_tag(&self) -> &str {
        &self.session_tag
    }

    fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }

    fn upsert_sql(&self) -> Result<String, StoreError> {
        let sections_json = serde_json::to_string(&self.sections)?;
        Ok(queries::transcripts::upsert(self, &sections_json))
    }

    fn from_row(row: &SqliteRow) -> Result<Self, StoreError> {
        let id: String = row.try_get("id")?;
        let saved_at = decode_saved_at(Self::COLLECTION, &id, row.try_get("saved_at")?)?;
        let sections_json: String = row.try_get("sections")?;

        Ok(TranscriptRecord {
            subject_id: row.try_get("subject_id")?,
            full_text: row.try_get("full_text")?,
            sections: serde_json::from_str(&sections_json)?,
            saved_at,
            session_tag: row.try_get("session_tag")?,
            id,
        })
    }
}

impl StoredRecord for HighlightRecord {
    type Table = Highlights;

    const COLLECTION: Collection = Collection::Highlight;
    const TABLE: Highlights = Highlights::Table;
    const ID: Highlights = Highlights::Id;
    const SUBJECT_ID: Highlights = Highlights::SubjectId;
    const SAVED_AT: Highlights = Highlights::SavedAt;
    const SESSION_TAG: Highlights = Highlights::SessionTag;

    fn id(&self) -> &str {
        &self.id
    }

    fn subject_id(&self) -> &str {
        &self.subject_id
    }

    fn session_tag(&self) -> &str {
        &self.session_tag
    }

    fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }

    fn upsert_sql(&self) -> Result<String, StoreError> {
        let selected_ids_json = serde_json::to_string(&self.selected_ids)?;
        Ok(queries::highlights::upsert(self, &selected_ids_json))
    }

    fn from_row(row: &SqliteRow) -> Result<Self, StoreError> {
        let id: String = row.try_get("id")?;
        let saved_at = decode_saved_at(Self::COLLECTION, &id, row.try_get("saved_at")?)?;
        let selected_ids_json: String = row.try_get("selected_ids")?;

        Ok(HighlightRecord {
            subject_id: row.try_get("subject_id")?,
            name: row.try_get("name")?,
            selected_ids: serde_json::from_str(&selected_ids_json)?,
            saved_at,
            session_tag: row.try_get("session_tag")?,
            id,
        })
    }
}
