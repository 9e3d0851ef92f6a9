use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::draft::PayloadDraft;
use super::types::WebhookPayload;
use super::validation::{validate, validate_payload};
use super::{DeliveryFailure, WebhookError};

/// Longest slice of a non-2xx response body kept for diagnostics.
const MAX_ERROR_BODY_CHARS: usize = 1024;

/// Receiver acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// Accepted submission, correlated by `job_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub job_id: Option<String>,
    pub message: Option<String>,
}

/// POSTs validated payloads to the configured RPA endpoint.
///
/// One attempt per call. Resubmitting the same payload may create a
/// duplicate downstream job, so retry policy stays with the caller.
#[derive(Clone)]
pub struct WebhookClient {
    url: String,
    secret: Option<String>,
    client: reqwest::Client,
    timeout: Duration,
}

impl WebhookClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WebhookError::Client(e.to_string()))?;

        Ok(Self {
            url: url.trim().to_string(),
            secret: None,
            client,
            timeout,
        })
    }

    /// Send `Authorization: Bearer <secret>` with every submission.
    pub fn with_secret(mut self, secret: Option<String>) -> Self {
        self.secret = secret.filter(|s| !s.is_empty());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Validate a draft and submit it. Invalid drafts never reach the network.
    pub async fn submit_draft(&self, draft: &PayloadDraft) -> Result<SubmissionReceipt, WebhookError> {
        let payload = validate(draft).map_err(WebhookError::InvalidPayload)?;
        self.submit(&payload).await
    }

    /// Re-check `payload` and submit its normalized form. A payload that
    /// fails the check never reaches the network.
    pub async fn submit(&self, payload: &WebhookPayload) -> Result<SubmissionReceipt, WebhookError> {
        let normalized = validate_payload(payload).map_err(WebhookError::InvalidPayload)?;
        let payload = &normalized;

        let quote_id = payload.metadata.quote_id.as_str();
        let extraction_id = payload.metadata.extraction_id;

        let mut request = self.client.post(&self.url).json(payload);
        if let Some(secret) = &self.secret {
            request = request.bearer_auth(secret);
        }

        let response = request.send().await.map_err(|e| {
            let failure = if e.is_timeout() {
                DeliveryFailure::Transport(format!("request timed out after {:?}", self.timeout))
            } else {
                DeliveryFailure::Transport(e.to_string())
            };
            tracing::warn!(quote_id, %extraction_id, error = %failure, "Webhook delivery failed");
            failure
        })?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            tracing::warn!(quote_id, %extraction_id, status = status.as_u16(), "Webhook receiver returned error status");
            return Err(DeliveryFailure::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let reply: WebhookResponse = response
            .json()
            .await
            .map_err(|e| DeliveryFailure::MalformedResponse(e.to_string()))?;

        if reply.success {
            tracing::info!(
                quote_id,
                %extraction_id,
                job_id = reply.job_id.as_deref().unwrap_or("-"),
                "Webhook payload accepted"
            );
            Ok(SubmissionReceipt {
                job_id: reply.job_id,
                message: reply.message,
            })
        } else {
            let errors = reply.errors.unwrap_or_default();
            tracing::warn!(quote_id, %extraction_id, errors = errors.len(), "Webhook payload rejected");
            Err(WebhookError::RejectedByReceiver {
                message: reply.message,
                errors,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{payload_json, spawn_receiver};
    use axum::http::StatusCode;
    use serde_json::json;
    use uuid::Uuid;

    fn client(url: &str) -> WebhookClient {
        WebhookClient::new(url, Duration::from_secs(5)).unwrap()
    }

    fn draft(quote_type: &str) -> PayloadDraft {
        serde_json::from_value(payload_json(quote_type, Uuid::new_v4(), "u123")).unwrap()
    }

    #[tokio::test]
    async fn accepted_both_payload_returns_job_id() {
        let (url, received) =
            spawn_receiver(StatusCode::OK, r#"{"success":true,"jobId":"J1"}"#).await;

        let receipt = client(&url).submit_draft(&draft("both")).await.unwrap();

        assert_eq!(receipt.job_id.as_deref(), Some("J1"));
        assert_eq!(received.count(), 1);
        let (auth, body) = received.call(0);
        assert!(auth.is_none());
        assert_eq!(body["metadata"]["quoteType"], "both");
        assert!(body["home"].is_object());
        assert!(body["auto"]["drivers"].is_array());
    }

    #[tokio::test]
    async fn secret_is_sent_as_bearer() {
        let (url, received) = spawn_receiver(StatusCode::OK, r#"{"success":true}"#).await;
        client(&url)
            .with_secret(Some("hook-secret".into()))
            .submit_draft(&draft("home"))
            .await
            .unwrap();
        let (auth, _) = received.call(0);
        assert_eq!(auth.as_deref(), Some("Bearer hook-secret"));
    }

    #[tokio::test]
    async fn invalid_payload_is_never_sent() {
        let (url, received) = spawn_receiver(StatusCode::OK, r#"{"success":true}"#).await;

        let mut value = payload_json("home", Uuid::new_v4(), "u123");
        value["auto"] = json!({ "drivers": [] });
        let mismatched: PayloadDraft = serde_json::from_value(value).unwrap();

        match client(&url).submit_draft(&mismatched).await {
            Err(WebhookError::InvalidPayload(errors)) => assert!(!errors.is_empty()),
            other => panic!("expected InvalidPayload, got {other:?}"),
        }
        assert_eq!(received.count(), 0);
    }

    #[tokio::test]
    async fn edited_typed_payload_is_rechecked_before_sending() {
        let (url, received) =
            spawn_receiver(StatusCode::OK, r#"{"success":true,"jobId":"J1"}"#).await;

        let mut payload = validate(&draft("home")).unwrap();
        payload.personal.phone = "call me".into();
        payload.personal.address.state = "Texas".into();
        payload.personal.address.zip = "??".into();
        payload.personal.ssn = Some("nope".into());

        match client(&url).submit(&payload).await {
            Err(WebhookError::InvalidPayload(errors)) => assert_eq!(errors.len(), 4, "{errors:?}"),
            other => panic!("expected InvalidPayload, got {other:?}"),
        }
        assert_eq!(received.count(), 0);
    }

    #[tokio::test]
    async fn negative_ack_is_rejected_by_receiver() {
        let (url, _) = spawn_receiver(
            StatusCode::OK,
            r#"{"success":false,"message":"bad VIN","errors":["auto.vehicles[0].vin unknown"]}"#,
        )
        .await;

        match client(&url).submit_draft(&draft("auto")).await {
            Err(WebhookError::RejectedByReceiver { message, errors }) => {
                assert_eq!(message.as_deref(), Some("bad VIN"));
                assert_eq!(errors, vec!["auto.vehicles[0].vin unknown"]);
            }
            other => panic!("expected RejectedByReceiver, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_2xx_is_delivery_failure_with_status() {
        let (url, _) =
            spawn_receiver(StatusCode::SERVICE_UNAVAILABLE, r#"{"success":false}"#).await;

        match client(&url).submit_draft(&draft("home")).await {
            Err(WebhookError::DeliveryFailure(DeliveryFailure::Status { status, .. })) => {
                assert_eq!(status, 503)
            }
            other => panic!("expected status failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_reply_is_malformed() {
        let (url, _) = spawn_receiver(StatusCode::OK, "ok").await;
        assert!(matches!(
            client(&url).submit_draft(&draft("home")).await,
            Err(WebhookError::DeliveryFailure(DeliveryFailure::MalformedResponse(_)))
        ));
    }

    #[tokio::test]
    async fn unreachable_receiver_is_transport_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        assert!(matches!(
            client(&format!("http://{addr}/hook"))
                .submit_draft(&draft("home"))
                .await,
            Err(WebhookError::DeliveryFailure(DeliveryFailure::Transport(_)))
        ));
    }

    #[test]
    fn response_uses_camel_case() {
        let reply: WebhookResponse =
            serde_json::from_str(r#"{"success":true,"jobId":"J9"}"#).unwrap();
        assert_eq!(reply.job_id.as_deref(), Some("J9"));
        assert!(reply.errors.is_none());
    }
}
