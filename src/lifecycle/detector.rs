//! Reload vs close disambiguation
//!
//! The three handlers run inside termination-time windows, so they are synchronous and
//! touch nothing but the registers. They never delete anything themselves: a confirmed
//! close adds a durable purge intent that [`CleanupSession`](super::CleanupSession)
//! consumes at the next startup.

use std::sync::Arc;

use log::{debug, error, info, warn};

use super::intent::{add_pending_purge, remove_pending_purge};
use crate::constants::CLOSING_FLAG_KEY;
use crate::register::KeyValueRegister;
use crate::session::{self, SessionTag};

const CLOSING_FLAG_VALUE: &str = "1";

/// What a page-hide signal did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageHideOutcome {
    /// The page is kept in the back/forward cache, so it is not going away
    PreservedInCache,
    /// No pre-unload signal preceded the hide
    NotClosing,
    /// The tab is closing but never created a session
    NoSession,
    /// The durable purge intents now include this tag
    PurgeScheduled(SessionTag),
    /// The durable intent could not be written
    IntentNotRecorded,
}

pub struct LifecycleDetector {
    ephemeral: Arc<dyn KeyValueRegister>,
    durable: Arc<dyn KeyValueRegister>,
}

impl LifecycleDetector {
    pub fn new(ephemeral: Arc<dyn KeyValueRegister>, durable: Arc<dyn KeyValueRegister>) -> Self {
        Self { ephemeral, durable }
    }

    pub fn on_before_unload(&self) {
        if let Err(e) = self.ephemeral.set(CLOSING_FLAG_KEY, CLOSING_FLAG_VALUE) {
            warn!("Failed to set closing flag: {}", e);
        }
    }

    /// Fired on a fresh page parse (not a back/forward cache restore): this was a reload.
    ///
    /// Returns true when a purge intent for the live session was retracted. Intents left by
    /// other tabs are untouched.
    pub fn on_page_load(&self) -> bool {
        if let Err(e) = self.ephemeral.remove(CLOSING_FLAG_KEY) {
            warn!("Failed to clear closing flag: {}", e);
        }

        let Some(live) = session::current_session(self.ephemeral.as_ref()) else {
            return false;
        };
        match remove_pending_purge(self.durable.as_ref(), &live.tag) {
            Ok(true) => {
                info!("Reload detected, retracted purge intent for {}", live.tag);
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!("Failed to retract purge intent for {}: {}", live.tag, e);
                false
            }
        }
    }

    /// `persisted` is true when the page enters the back/forward cache
    pub fn on_page_hide(&self, persisted: bool) -> PageHideOutcome {
        if persisted {
            return PageHideOutcome::PreservedInCache;
        }

        match self.ephemeral.get(CLOSING_FLAG_KEY) {
            Ok(Some(_)) => {}
            Ok(None) => return PageHideOutcome::NotClosing,
            Err(e) => {
                warn!("Failed to read closing flag: {}", e);
                return PageHideOutcome::NotClosing;
            }
        }

        let outcome = match session::current_session(self.ephemeral.as_ref()) {
            None => {
                debug!("Tab closing without a session, nothing to purge");
                PageHideOutcome::NoSession
            }
            Some(live) => match add_pending_purge(self.durable.as_ref(), &live.tag) {
                Ok(()) => {
                    info!("Tab closing, scheduled purge of {}", live.tag);
                    PageHideOutcome::PurgeScheduled(live.tag)
                }
                Err(e) => {
                    error!("Failed to record purge intent for {}: {}", live.tag, e);
                    PageHideOutcome::IntentNotRecorded
                }
            },
        };

        if let Err(e) = self.ephemeral.remove(CLOSING_FLAG_KEY) {
            warn!("Failed to clear closing flag: {}", e);
        }
        outcome
    }
}
