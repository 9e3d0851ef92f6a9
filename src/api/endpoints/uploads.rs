//! `POST /api/uploads`: multipart PDF upload into the extraction pipeline.

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::Credentials;
use crate::config::MAX_UPLOAD_BYTES;
use crate::models::ExtractionRecord;
use crate::pipeline::import::IncomingFile;

/// Multipart field carrying the document.
const FILE_FIELD: &str = "file";

/// Accept one document and return its `pending` extraction record.
///
/// The orchestrator authenticates the caller itself, so this route sits
/// outside the auth middleware.
pub async fn upload(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ExtractionRecord>), ApiError> {
    let credentials = Credentials::from_headers(&headers);

    let file = match multipart {
        Ok(multipart) => read_file_field(multipart).await,
        Err(rejection) => Err(rejection.body_text()),
    };

    let file = match file {
        Ok(file) => file,
        Err(detail) => {
            // An unauthenticated caller learns nothing about its body.
            ctx.auth
                .current_user(&credentials)
                .await
                .map_err(|_| ApiError::Unauthorized)?;
            return Err(ApiError::InvalidInput(detail));
        }
    };

    let record = ctx.uploads.upload(credentials, file).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Pull the first `file` field; other fields are drained and ignored.
async fn read_file_field(mut multipart: Multipart) -> Result<Option<IncomingFile>, String> {
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(describe)? {
        if field.name() != Some(FILE_FIELD) || file.is_some() {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(describe)?;
        file = Some(IncomingFile::new(filename, content_type, bytes));
    }

    Ok(file)
}

fn describe(err: MultipartError) -> String {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        format!(
            "file too large: exceeds {} MiB limit",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )
    } else {
        tracing::warn!(error = %err, "Malformed multipart upload");
        format!("malformed multipart body: {}", err.body_text())
    }
}
