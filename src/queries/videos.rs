use sea_query::{OnConflict, Query, SqliteQueryBuilder};

use crate::record::VideoRecord;
use crate::schema::Videos;

/// INSERT INTO videos (id, payload, duration, width, height, mime, name, size, saved_at, session_tag)
/// VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
/// ON CONFLICT (id) DO UPDATE SET every other column
/// `size` is the metadata size already checked to fit a SQLite integer
pub fn upsert(record: &VideoRecord, size: i64) -> String {
    Query::insert()
        .into_table(Videos::Table)
        .columns([
            Videos::Id,
            Videos::Payload,
            Videos::Duration,
            Videos::Width,
            Videos::Height,
            Videos::Mime,
            Videos::Name,
            Videos::Size,
            Videos::SavedAt,
            Videos::SessionTag,
        ])
        .values_panic([
            record.id.as_str().into(),
            record.payload.clone().into(),
            record.metadata.duration.into(),
            i64::from(record.metadata.width).into(),
            i64::from(record.metadata.height).into(),
            record.metadata.mime.as_str().into(),
            record.metadata.name.as_str().into(),
            size.into(),
            record.saved_at.timestamp_millis().into(),
            record.session_tag.as_str().into(),
        ])
        .on_conflict(
            OnConflict::column(Videos::Id)
                .update_columns([
                    Videos::Payload,
                    Videos::Duration,
                    Videos::Width,
                    Videos::Height,
                    Videos::Mime,
                    Videos::Name,
                    Videos::Size,
                    Videos::SavedAt,
                    Videos::SessionTag,
                ])
                .to_owned(),
        )
        .to_string(SqliteQueryBuilder)
}
