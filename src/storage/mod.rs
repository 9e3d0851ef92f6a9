//! Blob store capability for raw uploaded documents.

pub mod filesystem;

pub use filesystem::FilesystemBlobStore;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object path: {0}")]
    InvalidPath(String),
}

/// Path-addressed storage for raw document bytes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path`. With `overwrite == false` an existing object
    /// is never replaced and the call fails with `AlreadyExists`.
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        overwrite: bool,
    ) -> Result<(), BlobError>;

    async fn remove(&self, path: &str) -> Result<(), BlobError>;
}

/// Reject anything that could escape the store root: absolute paths,
/// backslashes, empty segments and `.`/`..` segments.
pub fn validate_object_path(path: &str) -> Result<(), BlobError> {
    let invalid = || BlobError::InvalidPath(path.to_string());

    if path.is_empty() || path.starts_with('/') || path.contains('\\') || path.contains('\0') {
        return Err(invalid());
    }
    for segment in path.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(invalid());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_nested_relative_paths() {
        assert!(validate_object_path("u123/1700000000000-quote.pdf").is_ok());
        assert!(validate_object_path("a/b/c.pdf").is_ok());
        assert!(validate_object_path("u1/1-..pdf").is_ok());
    }

    #[test]
    fn rejects_escaping_paths() {
        for path in ["", "/etc/passwd", "../x.pdf", "u1/../x", "u1//x", "u1/./x", "u1\\x", "u1/"] {
            assert!(
                matches!(validate_object_path(path), Err(BlobError::InvalidPath(_))),
                "{path:?} should be rejected"
            );
        }
    }

    #[test]
    fn blob_store_is_object_safe() {
        fn _assert_store(_: &dyn BlobStore) {}
    }
}
