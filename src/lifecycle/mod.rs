//! Session lifecycle
//!
//! The use cases are the only layer that reports failures to callers: integrity and purge
//! failures come back as typed errors, a user-initiated delete as a result object.

mod cleanup;
mod delete;
pub mod detector;
mod intent;
mod restore;
mod startup;
pub mod sweep;

use std::sync::Arc;

pub use cleanup::{CleanupReport, CleanupSession};
pub use delete::{DeleteResult, DeleteSession};
pub use detector::{LifecycleDetector, PageHideOutcome};
pub use intent::{add_pending_purge, pending_purges, remove_pending_purge};
pub use restore::{RestoreOutcome, RestoreSession, RestoredSession};
pub use startup::{SessionStartup, StartupOutcome, StartupState};
pub use sweep::{sweep_expired_records, SweepReport};

use crate::config::StoreConfig;
use crate::db::ObjectStore;
use crate::register::{FileRegister, KeyValueRegister};
use crate::repository::Repositories;

/// Everything one tab needs: the shared store, its repositories and both registers
#[derive(Clone)]
pub struct SessionContext {
    pub store: ObjectStore,
    pub repositories: Arc<Repositories>,
    pub ephemeral: Arc<dyn KeyValueRegister>,
    pub durable: Arc<dyn KeyValueRegister>,
    pub retention_hours: i64,
}

impl SessionContext {
    pub fn new(
        store: ObjectStore,
        ephemeral: Arc<dyn KeyValueRegister>,
        durable: Arc<dyn KeyValueRegister>,
        payload_threshold_bytes: u64,
        retention_hours: i64,
    ) -> Self {
        let repositories = Arc::new(Repositories::new(
            store.clone(),
            ephemeral.clone(),
            payload_threshold_bytes,
        ));
        Self {
            store,
            repositories,
            ephemeral,
            durable,
            retention_hours,
        }
    }

    /// Open the store and the file-backed durable register named by `config`
    pub async fn open(config: &StoreConfig, ephemeral: Arc<dyn KeyValueRegister>) -> Self {
        let store = ObjectStore::open(&config.database_path, config.open_timeout()).await;
        let durable: Arc<dyn KeyValueRegister> = Arc::new(FileRegister::new(config.register_path()));
        Self::new(
            store,
            ephemeral,
            durable,
            config.payload_threshold_bytes,
            config.retention_hours,
        )
    }

    pub fn detector(&self) -> LifecycleDetector {
        LifecycleDetector::new(self.ephemeral.clone(), self.durable.clone())
    }

    pub fn cleanup(&self) -> CleanupSession {
        CleanupSession::new(
            self.store.clone(),
            self.repositories.clone(),
            self.ephemeral.clone(),
            self.durable.clone(),
        )
    }

    pub fn restore(&self) -> RestoreSession {
        RestoreSession::new(self.repositories.clone())
    }

    pub fn delete(&self) -> DeleteSession {
        DeleteSession::new(self.cleanup(), self.ephemeral.clone())
    }

    pub fn startup(&self) -> SessionStartup {
        SessionStartup::new(
            self.store.clone(),
            self.cleanup(),
            self.restore(),
            self.retention_hours,
        )
    }
}
