use bytes::Bytes;

use super::generate_id;

/// Descriptive metadata of an uploaded video
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub duration_ms: u64,
    pub width: u32,
    pub height: u32,
    pub mime: String,
    pub name: String,
    /// Payload size in bytes
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub id: String,
    /// Raw file contents; absent when only the metadata survived a restore
    pub payload: Option<Bytes>,
    pub metadata: VideoMetadata,
}

impl Video {
    /// A freshly uploaded video. `metadata.size` is taken from the payload.
    pub fn from_upload(payload: Bytes, mut metadata: VideoMetadata) -> Self {
        metadata.size = payload.len() as u64;
        Self {
            id: generate_id(),
            payload: Some(payload),
            metadata,
        }
    }

    /// A video whose payload must be uploaded again before playback
    pub fn metadata_only(id: String, metadata: VideoMetadata) -> Self {
        Self {
            id,
            payload: None,
            metadata,
        }
    }

    pub fn needs_reupload(&self) -> bool {
        self.payload.is_none()
    }

    /// Payload size as recorded in the metadata, whether or not the payload is present
    pub fn size(&self) -> u64 {
        self.metadata.size
    }
}
