pub mod format;
pub mod importer;
pub mod path;

pub use format::*;
pub use importer::*;
pub use path::*;

use bytes::Bytes;
use thiserror::Error;

/// Every way an upload can fail, as reported to the caller.
///
/// Infrastructure detail stays in the message for server-side logs; the
/// API layer maps each variant to a fixed client-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage failure: {0}")]
    StorageFailure(String),

    #[error("Record failure: {0}")]
    RecordFailure(String),
}

/// A file as received from the client. Every field is client-declared.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl IncomingFile {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}
