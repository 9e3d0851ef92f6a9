//! Storage path derivation: `{userId}/{unixMillis}-{sanitizedFilename}`.

use chrono::Utc;

/// Longest sanitized filename kept in a storage path.
const MAX_FILENAME_CHARS: usize = 180;

/// Fallback when the client sent no usable filename.
const FALLBACK_FILENAME: &str = "document";

/// Replace every character outside `[A-Za-z0-9.-]` with `_`.
///
/// Total and idempotent: any input yields a safe name, and a safe name
/// comes back unchanged.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .take(MAX_FILENAME_CHARS)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Derive the blob path for an upload.
pub fn storage_path(user_id: &str, unix_millis: i64, filename: &str) -> String {
    format!("{user_id}/{unix_millis}-{}", sanitize_filename(filename))
}

/// Source of upload timestamps.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
