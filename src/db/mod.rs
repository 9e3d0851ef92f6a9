pub mod record_store;
pub mod repository;
pub mod sqlite;

pub use record_store::{RecordStore, SqliteRecordStore};
pub use sqlite::*;

use thiserror::Error;

use crate::models::{ExtractionStatus, InvalidEnumValue};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error(transparent)]
    InvalidEnum(#[from] InvalidEnumValue),

    #[error("Invalid timestamp in column {column}: {value}")]
    InvalidTimestamp { column: &'static str, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Illegal status transition {from} -> {to}")]
    InvalidTransition {
        from: ExtractionStatus,
        to: ExtractionStatus,
    },

    #[error("Write deadline passed before the database was available")]
    DeadlineExceeded,

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Database task failed: {0}")]
    TaskFailed(String),
}
