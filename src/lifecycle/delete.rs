use std::sync::Arc;

use log::warn;

use super::CleanupSession;
use crate::db::PurgeCounts;
use crate::error::SessionTagError;
use crate::register::KeyValueRegister;
use crate::session;

/// Result of a user-initiated delete, ready to show as a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    pub success: bool,
    pub message: String,
    pub purged: Option<PurgeCounts>,
}

impl DeleteResult {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            purged: None,
        }
    }
}

/// Manual delete of the current session.
///
/// Never fails: every outcome is reported through [`DeleteResult`]. The session tag is
/// cleared but not replaced; the next save generates a new one.
pub struct DeleteSession {
    cleanup: CleanupSession,
    ephemeral: Arc<dyn KeyValueRegister>,
}

impl DeleteSession {
    pub fn new(cleanup: CleanupSession, ephemeral: Arc<dyn KeyValueRegister>) -> Self {
        Self { cleanup, ephemeral }
    }

    pub async fn execute(&self) -> DeleteResult {
        let tag = match session::read_session_tag(self.ephemeral.as_ref()) {
            Ok(tag) => tag,
            Err(SessionTagError::Missing) => {
                return DeleteResult::failure("No active session to delete");
            }
            Err(e) => {
                warn!("Delete rejected: {}", e);
                return DeleteResult::failure(format!("Invalid session: {}", e));
            }
        };

        match self.cleanup.execute(&tag).await {
            Ok(report) => DeleteResult {
                success: true,
                message: format!("Deleted {} saved records", report.counts.total()),
                purged: Some(report.counts),
            },
            Err(e) => {
                warn!("{}", e);
                DeleteResult::failure(format!("Failed to delete session data: {}", e.source))
            }
        }
    }
}
