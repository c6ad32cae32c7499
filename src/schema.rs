use sea_query::Iden;

/// Metadata table - key-value store for database configuration
#[derive(Iden)]
pub enum Metadata {
    Table,
    Key,
    Value,
}

/// Videos table - one row per uploaded video, payload nullable when elided
#[derive(Iden, Clone, Copy)]
pub enum Videos {
    Table,
    Id,
    Payload,
    Duration,
    Width,
    Height,
    Mime,
    Name,
    Size,
    SavedAt,
    SessionTag,
}

/// Transcripts table - sections are stored as a JSON array
#[derive(Iden, Clone, Copy)]
pub enum Transcripts {
    Table,
    Id,
    SubjectId,
    FullText,
    Sections,
    SavedAt,
    SessionTag,
}

/// Highlights table - selected sentence ids are stored as a JSON array in selection order
#[derive(Iden, Clone, Copy)]
pub enum Highlights {
    Table,
    Id,
    SubjectId,
    Name,
    SelectedIds,
    SavedAt,
    SessionTag,
}
