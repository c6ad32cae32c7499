//! Domain aggregates consumed at the persistence boundary.
//!
//! Only what the record mapper and the lifecycle use cases need is modelled here;
//! selection toggling and time-range rules belong to the editor.

pub mod highlight;
pub mod transcript;
pub mod video;

pub use highlight::{Highlight, SelectionSet};
pub use transcript::{Section, Sentence, Transcript};
pub use video::{Video, VideoMetadata};

/// Generate a fresh aggregate id
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
