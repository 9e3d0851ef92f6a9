//! Payload validation and RPA submission endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SubmitResponse, ValidationReport};
use crate::auth::Identity;
use crate::webhook::{validate, PayloadDraft, WebhookPayload};

fn parse_body(body: Result<Json<PayloadDraft>, JsonRejection>) -> Result<PayloadDraft, Vec<String>> {
    body.map(|Json(draft)| draft)
        .map_err(|rejection| vec![format!("body: {}", rejection.body_text())])
}

/// `POST /api/payloads/validate`: dry run, always 200 with every problem.
pub async fn validate_draft(
    body: Result<Json<PayloadDraft>, JsonRejection>,
) -> Json<ValidationReport> {
    let errors = match parse_body(body) {
        Ok(draft) => validate(&draft).err().unwrap_or_default(),
        Err(errors) => errors,
    };
    Json(ValidationReport {
        valid: errors.is_empty(),
        errors,
    })
}

/// The payload may only speak for the caller and the caller's own upload.
async fn check_ownership(
    ctx: &ApiContext,
    identity: &Identity,
    payload: &WebhookPayload,
) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if payload.metadata.user_id != identity.user_id {
        errors.push("metadata.userId: must be the authenticated user".to_string());
    }
    let owned = ctx
        .records
        .get(payload.metadata.extraction_id)
        .await?
        .is_some_and(|record| record.user_id == identity.user_id);
    if !owned {
        errors.push(format!(
            "metadata.extractionId: no extraction {} belongs to this user",
            payload.metadata.extraction_id
        ));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::InvalidPayload(errors))
    }
}

/// `POST /api/payloads/submit`: validate, check ownership, deliver.
pub async fn submit(
    State(ctx): State<ApiContext>,
    Extension(identity): Extension<Identity>,
    body: Result<Json<PayloadDraft>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let webhook = ctx.webhook.as_ref().ok_or(ApiError::WebhookDisabled)?;

    let draft = parse_body(body).map_err(ApiError::InvalidPayload)?;
    let payload = validate(&draft).map_err(ApiError::InvalidPayload)?;
    check_ownership(&ctx, &identity, &payload).await?;

    let receipt = webhook.submit(&payload).await?;
    tracing::info!(
        user = %identity.user_id,
        extraction_id = %payload.metadata.extraction_id,
        job_id = receipt.job_id.as_deref().unwrap_or("-"),
        "Quote submitted"
    );

    Ok(Json(SubmitResponse {
        job_id: receipt.job_id,
        message: receipt.message,
    }))
}
