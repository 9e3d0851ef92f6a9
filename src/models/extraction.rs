use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ExtractionStatus;

/// One uploaded document and its processing lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRecord {
    pub id: Uuid,
    pub user_id: String,
    /// Original client-supplied name. Untrusted, never used as a path.
    pub filename: String,
    pub storage_path: String,
    pub status: ExtractionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Record as handed to the record store, before it assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExtraction {
    pub user_id: String,
    pub filename: String,
    pub storage_path: String,
    pub status: ExtractionStatus,
}

impl NewExtraction {
    pub fn pending(user_id: &str, filename: &str, storage_path: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            filename: filename.to_string(),
            storage_path: storage_path.to_string(),
            status: ExtractionStatus::Pending,
        }
    }
}
