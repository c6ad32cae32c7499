use sea_query::{ColumnDef, Index, SqliteQueryBuilder, Table};

use crate::schema::{Highlights, Metadata, Transcripts, Videos};

/// CREATE TABLE IF NOT EXISTS metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL)
pub fn create_metadata_table() -> String {
    Table::create()
        .table(Metadata::Table)
        .if_not_exists()
        .col(ColumnDef::new(Metadata::Key).string().primary_key())
        .col(ColumnDef::new(Metadata::Value).string().not_null())
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS videos (
///     id TEXT PRIMARY KEY,
///     payload BLOB NULL,
///     duration REAL NOT NULL,
///     width INTEGER NOT NULL,
///     height INTEGER NOT NULL,
///     mime TEXT NOT NULL,
///     name TEXT NOT NULL,
///     size INTEGER NOT NULL,
///     saved_at INTEGER NOT NULL,
///     session_tag TEXT NOT NULL
/// )
pub fn create_videos_table() -> String {
    Table::create()
        .table(Videos::Table)
        .if_not_exists()
        .col(ColumnDef::new(Videos::Id).string().primary_key())
        .col(ColumnDef::new(Videos::Payload).blob().null())
        .col(ColumnDef::new(Videos::Duration).double().not_null())
        .col(ColumnDef::new(Videos::Width).big_integer().not_null())
        .col(ColumnDef::new(Videos::Height).big_integer().not_null())
        .col(ColumnDef::new(Videos::Mime).string().not_null())
        .col(ColumnDef::new(Videos::Name).string().not_null())
        .col(ColumnDef::new(Videos::Size).big_integer().not_null())
        .col(ColumnDef::new(Videos::SavedAt).big_integer().not_null())
        .col(ColumnDef::new(Videos::SessionTag).string().not_null())
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS transcripts (
///     id TEXT PRIMARY KEY,
///     subject_id TEXT NOT NULL,
///     full_text TEXT NOT NULL,
///     sections TEXT NOT NULL,
///     saved_at INTEGER NOT NULL,
///     session_tag TEXT NOT NULL
/// )
pub fn create_transcripts_table() -> String {
    Table::create()
        .table(Transcripts::Table)
        .if_not_exists()
        .col(ColumnDef::new(Transcripts::Id).string().primary_key())
        .col(ColumnDef::new(Transcripts::SubjectId).string().not_null())
        .col(ColumnDef::new(Transcripts::FullText).text().not_null())
        .col(ColumnDef::new(Transcripts::Sections).text().not_null())
        .col(ColumnDef::new(Transcripts::SavedAt).big_integer().not_null())
        .col(ColumnDef::new(Transcripts::SessionTag).string().not_null())
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS highlights (
///     id TEXT PRIMARY KEY,
///     subject_id TEXT NOT NULL,
///     name TEXT NOT NULL,
///     selected_ids TEXT NOT NULL,
///     saved_at INTEGER NOT NULL,
///     session_tag TEXT NOT NULL
/// )
pub fn create_highlights_table() -> String {
    Table::create()
        .table(Highlights::Table)
        .if_not_exists()
        .col(ColumnDef::new(Highlights::Id).string().primary_key())
        .col(ColumnDef::new(Highlights::SubjectId).string().not_null())
        .col(ColumnDef::new(Highlights::Name).string().not_null())
        .col(ColumnDef::new(Highlights::SelectedIds).text().not_null())
        .col(ColumnDef::new(Highlights::SavedAt).big_integer().not_null())
        .col(ColumnDef::new(Highlights::SessionTag).string().not_null())
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_videos_saved_at ON videos(saved_at)
pub fn create_videos_saved_at_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_videos_saved_at")
        .table(Videos::Table)
        .col(Videos::SavedAt)
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_videos_session_tag ON videos(session_tag)
pub fn create_videos_session_tag_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_videos_session_tag")
        .table(Videos::Table)
        .col(Videos::SessionTag)
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_transcripts_subject_id ON transcripts(subject_id)
pub fn create_transcripts_subject_id_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_transcripts_subject_id")
        .table(Transcripts::Table)
        .col(Transcripts::SubjectId)
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_transcripts_saved_at ON transcripts(saved_at)
pub fn create_transcripts_saved_at_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_transcripts_saved_at")
        .table(Transcripts::Table)
        .col(Transcripts::SavedAt)
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_transcripts_session_tag ON transcripts(session_tag)
pub fn create_transcripts_session_tag_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_transcripts_session_tag")
        .table(Transcripts::Table)
        .col(Transcripts::SessionTag)
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_highlights_subject_id ON highlights(subject_id)
pub fn create_highlights_subject_id_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_highlights_subject_id")
        .table(Highlights::Table)
        .col(Highlights::SubjectId)
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_highlights_saved_at ON highlights(saved_at)
pub fn create_highlights_saved_at_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_highlights_saved_at")
        .table(Highlights::Table)
        .col(Highlights::SavedAt)
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_highlights_session_tag ON highlights(session_tag)
pub fn create_highlights_session_tag_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_highlights_session_tag")
        .table(Highlights::Table)
        .col(Highlights::SessionTag)
        .to_string(SqliteQueryBuilder)
}

/// Every CREATE statement, in the order they must run
pub fn all_statements() -> Vec<String> {
    vec![
        create_metadata_table(),
        create_videos_table(),
        create_transcripts_table(),
        create_highlights_table(),
        create_videos_saved_at_index(),
        create_videos_session_tag_index(),
        create_transcripts_subject_id_index(),
        create_transcripts_saved_at_index(),
        create_transcripts_session_tag_index(),
        create_highlights_subject_id_index(),
        create_highlights_saved_at_index(),
        create_highlights_session_tag_index(),
    ]
}
