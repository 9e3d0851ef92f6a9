//! Async record store capability over the extraction repository.
//!
//! The upload pipeline only needs `insert`; the read and transition
//! operations serve the API and the external extraction engine.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rusqlite::Connection;
use uuid::Uuid;

use super::repository;
use super::sqlite::{open_database, open_memory_database};
use super::DatabaseError;
use crate::models::{ExtractionRecord, ExtractionStatus, NewExtraction};

/// Write window used by `insert` when the caller sets no deadline.
const DEFAULT_WRITE_WINDOW: Duration = Duration::from_secs(60);

/// Durable table of extraction records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a record unless `deadline` has passed by the time the store
    /// is ready to write. A late call writes nothing and fails with
    /// `DatabaseError::DeadlineExceeded`, so a caller that gave up at the
    /// deadline never has a record appear behind its back.
    async fn insert_before(
        &self,
        record: NewExtraction,
        deadline: Instant,
    ) -> Result<ExtractionRecord, DatabaseError>;

    async fn insert(&self, record: NewExtraction) -> Result<ExtractionRecord, DatabaseError> {
        self.insert_before(record, Instant::now() + DEFAULT_WRITE_WINDOW)
            .await
    }

    async fn get(&self, id: Uuid) -> Result<Option<ExtractionRecord>, DatabaseError>;

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ExtractionRecord>, DatabaseError>;

    async fn update_status(
        &self,
        id: Uuid,
        status: ExtractionStatus,
    ) -> Result<ExtractionRecord, DatabaseError>;
}

/// SQLite-backed record store. Queries run on the blocking pool.
#[derive(Clone)]
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(open_database(path)?))
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(open_memory_database()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, DatabaseError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, DatabaseError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
            f(&guard)
        })
        .await
        .map_err(|e| DatabaseError::TaskFailed(e.to_string()))?
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn insert_before(
        &self,
        record: NewExtraction,
        deadline: Instant,
    ) -> Result<ExtractionRecord, DatabaseError> {
        // Checked under the connection lock, so nothing else writes between
        // the check and the insert.
        self.with_conn(move |conn| {
            if Instant::now() >= deadline {
                return Err(DatabaseError::DeadlineExceeded);
            }
            repository::insert_extraction(conn, &record)
        })
        .await
    }

    async fn get(&self, id: Uuid) -> Result<Option<ExtractionRecord>, DatabaseError> {
        self.with_conn(move |conn| repository::get_extraction(conn, &id))
            .await
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ExtractionRecord>, DatabaseError> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| repository::get_extractions_by_user(conn, &user_id))
            .await
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ExtractionStatus,
    ) -> Result<ExtractionRecord, DatabaseError> {
        let updated = self
            .with_conn(move |conn| repository::update_extraction_status(conn, &id, status))
            .await?;
        tracing::info!(extraction_id = %id, status = %status, "Extraction status updated");
        Ok(updated)
    }
}
