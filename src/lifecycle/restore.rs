use std::sync::Arc;

use log::{debug, info};

use crate::domain::{Highlight, Transcript, Video};
use crate::error::RestoreError;
use crate::repository::Repositories;

/// A complete editing session read back from the store
#[derive(Debug, Clone)]
pub struct RestoredSession {
    pub video: Video,
    pub transcript: Transcript,
    pub highlights: Vec<Highlight>,
    /// The video payload was elided; the user must upload the file again
    pub needs_reupload: bool,
}

#[derive(Debug, Clone)]
pub enum RestoreOutcome {
    NoSession,
    Restored(RestoredSession),
}

pub struct RestoreSession {
    repositories: Arc<Repositories>,
}

impl RestoreSession {
    pub fn new(repositories: Arc<Repositories>) -> Self {
        Self { repositories }
    }

    /// Reassemble the video, transcript and highlights of the current session.
    ///
    /// One subject per session: the first video found is the one restored.
    pub async fn execute(&self) -> Result<RestoreOutcome, RestoreError> {
        let videos = self.repositories.videos.find_all().await;
        let Some(video) = videos.into_iter().next() else {
            debug!("No video in the current session");
            return Ok(RestoreOutcome::NoSession);
        };

        let transcript = self
            .repositories
            .transcripts
            .find_by_owner(&video.id)
            .await
            .ok_or_else(|| RestoreError::MissingTranscript {
                video_id: video.id.clone(),
            })?;

        let highlights = self.repositories.highlights.find_by_owner(&video.id).await;
        if highlights.is_empty() {
            return Err(RestoreError::MissingHighlight {
                video_id: video.id.clone(),
            });
        }
        check_selections(&transcript, &highlights)?;

        let needs_reupload = video.needs_reupload();
        info!(
            "Restored video {} with {} highlights (re-upload needed: {})",
            video.id,
            highlights.len(),
            needs_reupload
        );
        Ok(RestoreOutcome::Restored(RestoredSession {
            video,
            transcript,
            highlights,
            needs_reupload,
        }))
    }
}

/// Every selected sentence must exist in the transcript
fn check_selections(transcript: &Transcript, highlights: &[Highlight]) -> Result<(), RestoreError> {
    for highlight in highlights {
        if let Some(unknown) = highlight
            .selection
            .iter()
            .find(|id| !transcript.contains_sentence(id))
        {
            return Err(RestoreError::UnknownSelection {
                highlight_id: highlight.id.clone(),
                sentence_id: unknown.to_string(),
            });
        }
    }
    Ok(())
}
