//! Extraction record read endpoints, scoped to the caller.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::Identity;
use crate::models::ExtractionRecord;

/// `GET /api/extractions`: caller's records, newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<ExtractionRecord>>, ApiError> {
    let records = ctx.records.list_for_user(&identity.user_id).await?;
    Ok(Json(records))
}

/// `GET /api/extractions/:id`: one record; other users' records are 404.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<ExtractionRecord>, ApiError> {
    let not_found = || ApiError::NotFound("Extraction not found".into());
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;

    match ctx.records.get(id).await? {
        Some(record) if record.user_id == identity.user_id => Ok(Json(record)),
        _ => Err(not_found()),
    }
}
