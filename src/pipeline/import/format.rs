//! Pure pre-storage checks on an incoming file.
//!
//! Nothing here touches storage. Every check runs regardless of the
//! others so one rejection lists every problem with the file.

use super::{IncomingFile, UploadError};
use crate::config::{ACCEPTED_CONTENT_TYPE, MAX_UPLOAD_BYTES};

/// Leading bytes of every PDF file.
const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Whether the first bytes look like a PDF (magic bytes, not extension).
pub fn has_pdf_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_SIGNATURE)
}

/// Validate declared content type, size and signature of an upload.
pub fn validate_upload(file: &IncomingFile) -> Result<(), UploadError> {
    let mut problems = Vec::new();

    if file.content_type != ACCEPTED_CONTENT_TYPE {
        problems.push(format!(
            "content type must be {ACCEPTED_CONTENT_TYPE}, got '{}'",
            file.content_type
        ));
    } else if !has_pdf_signature(&file.bytes) {
        problems.push("file content is not a PDF document".to_string());
    }

    if file.size_bytes() > MAX_UPLOAD_BYTES {
        problems.push(format!(
            "file too large: {} bytes exceeds {} MiB limit",
            file.size_bytes(),
            MAX_UPLOAD_BYTES / (1024 * 1024)
        ));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(UploadError::InvalidInput(problems.join("; ")))
    }
}
