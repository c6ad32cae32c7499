use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{info, warn};

use super::intent::{pending_purges, remove_pending_purge};
use crate::db::{ObjectStore, PurgeCounts};
use crate::error::CleanupError;
use crate::register::KeyValueRegister;
use crate::repository::Repositories;
use crate::session::{self, SessionTag};

#[derive(Debug, Clone)]
pub struct CleanupReport {
    pub session_tag: SessionTag,
    pub counts: PurgeCounts,
    pub elapsed: Duration,
}

/// Deletes every record of one session, then drops the registers that point at it.
///
/// A failed purge returns [`CleanupError`] and leaves its durable intent in place, so the
/// next startup retries.
pub struct CleanupSession {
    store: ObjectStore,
    repositories: Arc<Repositories>,
    ephemeral: Arc<dyn KeyValueRegister>,
    durable: Arc<dyn KeyValueRegister>,
}

impl CleanupSession {
    pub fn new(
        store: ObjectStore,
        repositories: Arc<Repositories>,
        ephemeral: Arc<dyn KeyValueRegister>,
        durable: Arc<dyn KeyValueRegister>,
    ) -> Self {
        Self {
            store,
            repositories,
            ephemeral,
            durable,
        }
    }

    pub async fn execute(&self, session_tag: &SessionTag) -> Result<CleanupReport, CleanupError> {
        let started = Instant::now();

        let counts = self
            .store
            .delete_all_for_session(session_tag.as_str())
            .await
            .map_err(|source| CleanupError {
                session_tag: session_tag.to_string(),
                source,
            })?;

        if self.live_tag().as_ref() == Some(session_tag) {
            self.repositories.evict_all();
            if let Err(e) = session::clear_session(self.ephemeral.as_ref()) {
                warn!("Failed to clear session tag {}: {}", session_tag, e);
            }
        }
        self.clear_intent_for(session_tag);

        let report = CleanupReport {
            session_tag: session_tag.clone(),
            counts,
            elapsed: started.elapsed(),
        };
        info!(
            "Cleanup of {} removed {} records in {:?}",
            report.session_tag,
            report.counts.total(),
            report.elapsed
        );
        Ok(report)
    }

    /// Intents naming other sessions than the live one. An intent for the live session is
    /// left over from a reload, not a close.
    pub fn pending(&self) -> Vec<SessionTag> {
        let live = self.live_tag();
        pending_purges(self.durable.as_ref())
            .into_iter()
            .filter(|tag| Some(tag) != live.as_ref())
            .collect()
    }

    /// Run every purge that previous closes scheduled.
    ///
    /// Each intent is attempted even when an earlier one fails; the failed ones stay
    /// recorded and the first failure is returned.
    pub async fn run_pending(&self) -> Result<Vec<CleanupReport>, CleanupError> {
        let live = self.live_tag();
        let mut reports = Vec::new();
        let mut first_error = None;

        for tag in pending_purges(self.durable.as_ref()) {
            if Some(&tag) == live.as_ref() {
                info!("Purge intent names the live session {}, keeping it", tag);
                self.clear_intent_for(&tag);
                continue;
            }
            match self.execute(&tag).await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!("{}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(reports),
        }
    }

    fn live_tag(&self) -> Option<SessionTag> {
        session::current_session(self.ephemeral.as_ref()).map(|live| live.tag)
    }

    fn clear_intent_for(&self, session_tag: &SessionTag) {
        if let Err(e) = remove_pending_purge(self.durable.as_ref(), session_tag) {
            warn!("Failed to clear purge intent for {}: {}", session_tag, e);
        }
    }
}
