//! SQL statement builders, one module per table plus the statements shared by all
//! record collections.

pub mod ddl;
pub mod highlights;
pub mod metadata;
pub mod records;
pub mod transcripts;
pub mod videos;
