use sea_query::{OnConflict, Query, SqliteQueryBuilder};

use crate::record::HighlightRecord;
use crate::schema::Highlights;

/// INSERT INTO highlights (id, subject_id, name, selected_ids, saved_at, session_tag)
/// VALUES (?, ?, ?, ?, ?, ?)
/// ON CONFLICT (id) DO UPDATE SET every other column
///
/// `selected_ids_json` is the already-serialized selection array.
pub fn upsert(record: &HighlightRecord, selected_ids_json: &str) -> String {
    Query::insert()
        .into_table(Highlights::Table)
        .columns([
            Highlights::Id,
            Highlights::SubjectId,
            Highlights::Name,
            Highlights::SelectedIds,
            Highlights::SavedAt,
            Highlights::SessionTag,
        ])
        .values_panic([
            record.id.as_str().into(),
            record.subject_id.as_str().into(),
            record.name.as_str().into(),
            selected_ids_json.into(),
            record.saved_at.timestamp_millis().into(),
            record.session_tag.as_str().into(),
        ])
        .on_conflict(
            OnConflict::column(Highlights::Id)
                .update_columns([
                    Highlights::SubjectId,
                    Highlights::Name,
                    Highlights::SelectedIds,
                    Highlights::SavedAt,
                    Highlights::SessionTag,
                ])
                .to_owned(),
        )
        .to_string(SqliteQueryBuilder)
}
