use sea_query::{OnConflict, Query, SqliteQueryBuilder};

use crate::record::TranscriptRecord;
use crate::schema::Transcripts;

/// INSERT INTO transcripts (id, subject_id, full_text, sections, saved_at, session_tag)
/// VALUES (?, ?, ?, ?, ?, ?)
/// ON CONFLICT (id) DO UPDATE SET every other column
///
/// `sections_json` is the already-serialized sections array.
pub fn upsert(record: &TranscriptRecord, sections_json: &str) -> String {
    Query::insert()
        .into_table(Transcripts::Table)
        .columns([
            Transcripts::Id,
            Transcripts::SubjectId,
            Transcripts::FullText,
            Transcripts::Sections,
            Transcripts::SavedAt,
            Transcripts::SessionTag,
        ])
        .values_panic([
            record.id.as_str().into(),
            record.subject_id.as_str().into(),
            record.full_text.as_str().into(),
            sections_json.into(),
            record.saved_at.timestamp_millis().into(),
            record.session_tag.as_str().into(),
        ])
        .on_conflict(
            OnConflict::column(Transcripts::Id)
                .update_columns([
                    Transcripts::SubjectId,
                    Transcripts::FullText,
                    Transcripts::Sections,
                    Transcripts::SavedAt,
                    Transcripts::SessionTag,
                ])
                .to_owned(),
        )
        .to_string(SqliteQueryBuilder)
}
