use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::{timeout, timeout_at};

use super::format::validate_upload;
use super::path::{storage_path, Clock, SystemClock};
use super::{IncomingFile, UploadError};
use crate::auth::{Credentials, IdentityProvider};
use crate::config::IntakeConfig;
use crate::db::RecordStore;
use crate::models::{ExtractionRecord, NewExtraction};
use crate::storage::BlobStore;

/// Upper bounds on each external call made during an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTimeouts {
    pub storage: Duration,
    pub record: Duration,
}

impl Default for UploadTimeouts {
    fn default() -> Self {
        let config = IntakeConfig::default();
        Self::from_config(&config)
    }
}

impl UploadTimeouts {
    pub fn from_config(config: &IntakeConfig) -> Self {
        Self {
            storage: config.storage_timeout,
            record: config.record_timeout,
        }
    }
}

/// Turns an authenticated upload into a stored blob plus a `pending`
/// extraction record.
///
/// Outcomes are all-or-nothing: on success both the blob and the record
/// exist; on any failure no record exists, and a blob that was written is
/// removed on a best-effort basis. After a timeout that removal happens
/// once the abandoned store call settles, possibly after `upload` returns.
pub struct UploadOrchestrator {
    auth: Arc<dyn IdentityProvider>,
    blobs: Arc<dyn BlobStore>,
    records: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    timeouts: UploadTimeouts,
}

impl UploadOrchestrator {
    pub fn new(
        auth: Arc<dyn IdentityProvider>,
        blobs: Arc<dyn BlobStore>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            auth,
            blobs,
            records,
            clock: Arc::new(SystemClock),
            timeouts: UploadTimeouts::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_timeouts(mut self, timeouts: UploadTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Run an upload on its own task.
    ///
    /// The caller going away (e.g. a dropped HTTP connection) does not
    /// interrupt the pipeline half-way, so compensation always completes.
    pub async fn upload(
        self: &Arc<Self>,
        credentials: Credentials,
        file: Option<IncomingFile>,
    ) -> Result<ExtractionRecord, UploadError> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.process(&credentials, file).await })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Upload task aborted");
                UploadError::RecordFailure(format!("upload task aborted: {e}"))
            })?
    }

    /// Run an upload on the current task.
    pub async fn process(
        &self,
        credentials: &Credentials,
        file: Option<IncomingFile>,
    ) -> Result<ExtractionRecord, UploadError> {
        // Step 1: Identity
        let identity = self.auth.current_user(credentials).await.map_err(|e| {
            tracing::debug!(reason = %e, "Upload rejected: unauthenticated");
            UploadError::Unauthorized
        })?;

        // Step 2: Input checks, before any side effect
        let file = file.ok_or_else(|| UploadError::InvalidInput("No file provided".into()))?;
        validate_upload(&file)?;

        let path = storage_path(&identity.user_id, self.clock.now_millis(), &file.filename);
        tracing::info!(
            user = %identity.user_id,
            path = %path,
            size = file.size_bytes(),
            "Starting upload"
        );

        // Step 3: Blob, never overwriting an existing object. The write runs
        // on its own task so a timeout abandons the wait, not the write.
        let mut put = {
            let blobs = Arc::clone(&self.blobs);
            let path = path.clone();
            let bytes = file.bytes.clone();
            let content_type = file.content_type.clone();
            tokio::spawn(async move { blobs.put(&path, &bytes, &content_type, false).await })
        };
        let written = timeout(self.timeouts.storage, &mut put).await;
        match written {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => {
                tracing::warn!(path = %path, error = %e, "Blob write failed");
                return Err(UploadError::StorageFailure(e.to_string()));
            }
            Ok(Err(e)) => {
                tracing::error!(path = %path, error = %e, "Blob write task failed");
                return Err(UploadError::StorageFailure(format!("blob write task failed: {e}")));
            }
            Err(_) => {
                tracing::warn!(path = %path, "Blob write timed out, removing it once it settles");
                let blobs = Arc::clone(&self.blobs);
                let limit = self.timeouts.storage;
                let late_path = path.clone();
                tokio::spawn(async move {
                    if let Ok(Ok(())) = put.await {
                        remove_orphan(blobs.as_ref(), &late_path, limit).await;
                    }
                });
                return Err(UploadError::StorageFailure(format!(
                    "blob write timed out after {:?}",
                    self.timeouts.storage
                )));
            }
        }

        // Step 4: Record. The store refuses to commit past the deadline,
        // which is what makes removing the blob after a timeout safe.
        let deadline = Instant::now() + self.timeouts.record;
        let mut insert = {
            let records = Arc::clone(&self.records);
            let new = NewExtraction::pending(&identity.user_id, &file.filename, &path);
            tokio::spawn(async move { records.insert_before(new, deadline).await })
        };
        let inserted = timeout_at(deadline.into(), &mut insert).await;
        let failure = match inserted {
            Ok(Ok(Ok(record))) => {
                tracing::info!(
                    id = %record.id,
                    user = %record.user_id,
                    path = %record.storage_path,
                    "Upload recorded"
                );
                return Ok(record);
            }
            Ok(Ok(Err(e))) => e.to_string(),
            Ok(Err(e)) => format!("record insert task failed: {e}"),
            Err(_) => {
                let failure = format!("record insert timed out after {:?}", self.timeouts.record);
                tracing::warn!(path = %path, error = %failure, "Removing blob once the insert settles");
                let blobs = Arc::clone(&self.blobs);
                let limit = self.timeouts.storage;
                tokio::spawn(async move {
                    match insert.await {
                        // Committed right at the deadline: the record keeps its blob.
                        Ok(Ok(record)) => tracing::warn!(
                            id = %record.id,
                            path = %record.storage_path,
                            "Record committed after its upload timed out"
                        ),
                        _ => remove_orphan(blobs.as_ref(), &path, limit).await,
                    }
                });
                return Err(UploadError::RecordFailure(failure));
            }
        };

        // Step 5: Compensate. Its own failure is logged, never surfaced.
        tracing::warn!(path = %path, error = %failure, "Record insert failed, removing blob");
        remove_orphan(self.blobs.as_ref(), &path, self.timeouts.storage).await;
        Err(UploadError::RecordFailure(failure))
    }
}

/// Best-effort removal of a blob no record refers to.
async fn remove_orphan(blobs: &dyn BlobStore, path: &str, limit: Duration) {
    match timeout(limit, blobs.remove(path)).await {
        Ok(Ok(())) => tracing::info!(path = %path, "Orphan blob removed"),
        Ok(Err(e)) => {
            tracing::error!(path = %path, error = %e, "Failed to remove orphan blob")
        }
        Err(_) => tracing::error!(path = %path, "Timed out removing orphan blob"),
    }
}
