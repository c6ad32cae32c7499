use log::info;

use super::cleanup::CleanupReport;
use super::{CleanupSession, RestoreOutcome, RestoreSession, RestoredSession};
use crate::db::ObjectStore;
use crate::error::StartupError;
use crate::lifecycle::sweep::sweep_expired_records;
use crate::session::SessionTag;

/// What an application start finds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupState {
    CleanStart,
    /// Closed tabs left these sessions to purge
    PendingPurge(Vec<SessionTag>),
    Restorable,
}

#[derive(Debug, Clone)]
pub enum StartupOutcome {
    CleanStart,
    /// Closed tabs' sessions were purged and this tab has nothing to restore
    Purged(Vec<CleanupReport>),
    Restored(RestoredSession),
}

/// Application start: purge what closed tabs left behind, sweep expired records, then
/// restore the current session.
pub struct SessionStartup {
    store: ObjectStore,
    cleanup: CleanupSession,
    restore: RestoreSession,
    retention_hours: i64,
}

impl SessionStartup {
    pub fn new(
        store: ObjectStore,
        cleanup: CleanupSession,
        restore: RestoreSession,
        retention_hours: i64,
    ) -> Self {
        Self {
            store,
            cleanup,
            restore,
            retention_hours,
        }
    }

    /// Classify the start without deleting anything
    pub async fn classify(&self) -> StartupState {
        let pending = self.cleanup.pending();
        if !pending.is_empty() {
            return StartupState::PendingPurge(pending);
        }
        match self.restore.execute().await {
            Ok(RestoreOutcome::Restored(_)) => StartupState::Restorable,
            Ok(RestoreOutcome::NoSession) | Err(_) => StartupState::CleanStart,
        }
    }

    pub async fn execute(&self) -> Result<StartupOutcome, StartupError> {
        let purged = self.cleanup.run_pending().await?;

        let sweep = sweep_expired_records(&self.store, self.retention_hours, None).await;
        if sweep.total() > 0 {
            info!("Startup sweep removed {} expired records", sweep.total());
        }

        match self.restore.execute().await? {
            RestoreOutcome::Restored(session) => Ok(StartupOutcome::Restored(session)),
            RestoreOutcome::NoSession if purged.is_empty() => Ok(StartupOutcome::CleanStart),
            RestoreOutcome::NoSession => Ok(StartupOutcome::Purged(purged)),
        }
    }
}
