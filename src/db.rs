//! Persistent object store
//!
//! Durable CRUD over the video, transcript and highlight collections, backed by a SQLite
//! file. Persistence is best-effort: apart from the session purge, every operation absorbs
//! and logs its failures, and a store that fails to open runs as a no-op.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};

use crate::constants::EXPECTED_DB_VERSION;
use crate::error::StoreError;
use crate::queries::{ddl, metadata, records};
use crate::record::{HighlightRecord, IndexKey, StoredRecord, TranscriptRecord, VideoRecord};

/// Rows removed by a session purge, per collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeCounts {
    pub videos: u64,
    pub transcripts: u64,
    pub highlights: u64,
}

impl PurgeCounts {
    pub fn total(&self) -> u64 {
        self.videos + self.transcripts + self.highlights
    }
}

/// Handle to the object store. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    pool: Option<SqlitePool>,
}

impl ObjectStore {
    /// Open the store at `db_path`, creating the file and schema if needed.
    ///
    /// Never fails: an open error, a schema version mismatch or exceeding `open_timeout`
    /// yields a store whose operations are logged no-ops.
    pub async fn open(db_path: &Path, open_timeout: Duration) -> Self {
        match tokio::time::timeout(open_timeout, open_database(db_path)).await {
            Ok(Ok(pool)) => {
                info!("Object store opened: {}", db_path.display());
                Self { pool: Some(pool) }
            }
            Ok(Err(e)) => {
                warn!(
                    "Object store at '{}' unavailable, persistence disabled: {}",
                    db_path.display(),
                    e
                );
                Self::unavailable()
            }
            Err(_) => {
                warn!(
                    "Object store at '{}' unavailable, persistence disabled: {}",
                    db_path.display(),
                    StoreError::OpenTimeout(open_timeout)
                );
                Self::unavailable()
            }
        }
    }

    /// A store with no backing database
    pub fn unavailable() -> Self {
        Self { pool: None }
    }

    pub fn is_available(&self) -> bool {
        self.pool.is_some()
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> Option<&SqlitePool> {
        self.pool.as_ref()
    }

    /// Upsert a record by primary key. Returns whether the write took effect.
    pub async fn put<R: StoredRecord>(&self, record: &R) -> bool {
        match self.try_put(record).await {
            Ok(()) => {
                debug!("Stored {} record {}", R::COLLECTION, record.id());
                true
            }
            Err(e) => {
                warn!("Failed to store {} record {}: {}", R::COLLECTION, record.id(), e);
                false
            }
        }
    }

    /// Fetch a record by primary key
    pub async fn get<R: StoredRecord>(&self, id: &str) -> Option<R> {
        match self.try_get(id).await {
            Ok(record) => record,
            Err(e) => {
                warn!("Failed to read {} record {}: {}", R::COLLECTION, id, e);
                None
            }
        }
    }

    /// Fetch every record matching a secondary-index key, ordered by saved-at then id
    pub async fn get_all_by_index<R: StoredRecord>(&self, key: IndexKey<'_>) -> Vec<R> {
        let sql = match key {
            IndexKey::SubjectId(subject_id) => records::select_by_text_column(
                R::TABLE,
                R::SUBJECT_ID,
                subject_id,
                R::SAVED_AT,
                R::ID,
            ),
            IndexKey::SessionTag(session_tag) => records::select_by_text_column(
                R::TABLE,
                R::SESSION_TAG,
                session_tag,
                R::SAVED_AT,
                R::ID,
            ),
            IndexKey::SavedAt(saved_at) => records::select_by_saved_at(
                R::TABLE,
                R::SAVED_AT,
                saved_at.timestamp_millis(),
                R::ID,
            ),
        };

        match self.fetch_records(&sql).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to query {} records by {:?}: {}", R::COLLECTION, key, e);
                Vec::new()
            }
        }
    }

    /// Full collection scan, ordered by saved-at then id
    pub async fn get_all<R: StoredRecord>(&self) -> Vec<R> {
        let sql = records::select_all(R::TABLE, R::SAVED_AT, R::ID);
        match self.fetch_records(&sql).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to scan {} records: {}", R::COLLECTION, e);
                Vec::new()
            }
        }
    }

    /// Delete every record of one collection matching `predicate`, inside one transaction.
    /// Returns the number of rows removed.
    pub async fn delete_where<R, F>(&self, predicate: F) -> u64
    where
        R: StoredRecord,
        F: Fn(&R) -> bool,
    {
        match self.try_delete_where(predicate).await {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!("Failed to delete {} records: {}", R::COLLECTION, e);
                0
            }
        }
    }

    /// Delete every record of one collection saved before `cutoff`.
    ///
    /// Works on the `saved_at` column alone, so rows that no longer decode are removed too.
    pub async fn delete_saved_before<R: StoredRecord>(&self, cutoff: DateTime<Utc>) -> u64 {
        match self.try_delete_saved_before::<R>(cutoff).await {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!("Failed to delete expired {} records: {}", R::COLLECTION, e);
                0
            }
        }
    }

    /// Number of rows in one collection, without decoding them
    pub async fn count<R: StoredRecord>(&self) -> u64 {
        match self.try_count::<R>().await {
            Ok(count) => count,
            Err(e) => {
                warn!("Failed to count {} records: {}", R::COLLECTION, e);
                0
            }
        }
    }

    /// Delete every record owned by `session_tag` across all three collections.
    ///
    /// Either all three collections are cleared or nothing is: any failure rolls the
    /// transaction back and is reported to the caller, who may retry.
    pub async fn delete_all_for_session(
        &self,
        session_tag: &str,
    ) -> Result<PurgeCounts, StoreError> {
        let pool = self.pool.as_ref().ok_or(StoreError::Unavailable)?;
        let purge_failed = |source| StoreError::PurgeFailed {
            session_tag: session_tag.to_string(),
            source,
        };

        let mut tx = pool.begin().await.map_err(purge_failed)?;
        let counts = async {
            Ok::<_, sqlx::Error>(PurgeCounts {
                videos: delete_session_rows::<VideoRecord>(&mut tx, session_tag).await?,
                transcripts: delete_session_rows::<TranscriptRecord>(&mut tx, session_tag).await?,
                highlights: delete_session_rows::<HighlightRecord>(&mut tx, session_tag).await?,
            })
        }
        .await;

        match counts {
            Ok(counts) => {
                tx.commit().await.map_err(purge_failed)?;
                info!(
                    "Purged session {}: {} videos, {} transcripts, {} highlights",
                    session_tag, counts.videos, counts.transcripts, counts.highlights
                );
                Ok(counts)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback of session {} purge failed: {}", session_tag, rollback_err);
                }
                Err(purge_failed(e))
            }
        }
    }

    fn require_pool(&self) -> Result<&SqlitePool, StoreError> {
        self.pool.as_ref().ok_or(StoreError::Unavailable)
    }

    async fn try_put<R: StoredRecord>(&self, record: &R) -> Result<(), StoreError> {
        let pool = self.require_pool()?;
        let sql = record.upsert_sql()?;
        sqlx::query(&sql).execute(pool).await?;
        Ok(())
    }

    async fn try_get<R: StoredRecord>(&self, id: &str) -> Result<Option<R>, StoreError> {
        let pool = self.require_pool()?;
        let sql = records::select_by_id(R::TABLE, R::ID, id);
        let row = sqlx::query(&sql).fetch_optional(pool).await?;
        row.as_ref().map(R::from_row).transpose()
    }

    async fn fetch_records<R: StoredRecord>(&self, sql: &str) -> Result<Vec<R>, StoreError> {
        let pool = self.require_pool()?;
        let rows = sqlx::query(sql).fetch_all(pool).await?;
        Ok(decode_rows(&rows))
    }

    async fn try_delete_where<R, F>(&self, predicate: F) -> Result<u64, StoreError>
    where
        R: StoredRecord,
        F: Fn(&R) -> bool,
    {
        let pool = self.require_pool()?;
        let mut tx = pool.begin().await?;

        let sql = records::select_all(R::TABLE, R::SAVED_AT, R::ID);
        let rows = sqlx::query(&sql).fetch_all(&mut *tx).await?;
        let doomed: Vec<String> = decode_rows::<R>(&rows)
            .into_iter()
            .filter(|record| predicate(record))
            .map(|record| record.id().to_string())
            .collect();

        if doomed.is_empty() {
            tx.commit().await?;
            return Ok(0);
        }

        let sql = records::delete_by_ids(R::TABLE, R::ID, &doomed);
        let result = sqlx::query(&sql).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn try_delete_saved_before<R: StoredRecord>(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let pool = self.require_pool()?;
        let sql = records::delete_saved_before(R::TABLE, R::SAVED_AT, cutoff.timestamp_millis());
        let result = sqlx::query(&sql).execute(pool).await?;
        Ok(result.rows_affected())
    }

    async fn try_count<R: StoredRecord>(&self) -> Result<u64, StoreError> {
        let pool = self.require_pool()?;
        let sql = records::count_all(R::TABLE);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

/// Decode rows, skipping (and logging) any that are corrupt
fn decode_rows<R: StoredRecord>(rows: &[sqlx::sqlite::SqliteRow]) -> Vec<R> {
    rows.iter()
        .filter_map(|row| match R::from_row(row) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping unreadable {} record: {}", R::COLLECTION, e);
                None
            }
        })
        .collect()
}

async fn delete_session_rows<R: StoredRecord>(
    tx: &mut Transaction<'_, Sqlite>,
    session_tag: &str,
) -> Result<u64, sqlx::Error> {
    let sql = records::delete_by_session(R::TABLE, R::SESSION_TAG, session_tag);
    let result = sqlx::query(&sql).execute(&mut **tx).await?;
    Ok(result.rows_affected())
}

/// Open a file-based database pool and initialize its schema
/// Enables WAL mode; creates the parent directory and file if missing
pub async fn open_database(db_path: &Path) -> Result<SqlitePool, StoreError> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(sqlx::Error::Io)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    init_database_schema(&pool).await?;
    Ok(pool)
}

/// Create tables and indexes, then stamp or verify the schema version
pub async fn init_database_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    for sql in ddl::all_statements() {
        sqlx::query(&sql).execute(pool).await?;
    }

    let sql = metadata::select_by_key("version");
    let version: Option<String> = sqlx::query_scalar(&sql).fetch_optional(pool).await?;
    match version {
        None => {
            let sql = metadata::insert("version", EXPECTED_DB_VERSION);
            sqlx::query(&sql).execute(pool).await?;
            Ok(())
        }
        Some(found) if found == EXPECTED_DB_VERSION => Ok(()),
        Some(found) => Err(StoreError::VersionMismatch {
            expected: EXPECTED_DB_VERSION.to_string(),
            found,
        }),
    }
}

/// Create a store on a file inside a fresh temporary directory (for testing)
/// Keep the returned guard alive to prevent the directory from being deleted
pub async fn open_in_temporary_file() -> Result<(ObjectStore, tempfile::TempDir), StoreError> {
    let guard = tempfile::tempdir().map_err(sqlx::Error::Io)?;
    let db_path = guard.path().join("test.sqlite");
    let pool = open_database(&db_path).await?;
    Ok((ObjectStore { pool: Some(pool) }, guard))
}
