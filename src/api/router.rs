//! API router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.
//!
//! - `/health` is public.
//! - `/uploads` authenticates inside the upload orchestrator and carries
//!   its own body limit.
//! - Everything else sits behind the bearer-token middleware.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::config::MAX_UPLOAD_BYTES;

/// Upload request ceiling: the document limit plus multipart overhead.
/// Bodies past this fail while streaming; documents between the two
/// limits are rejected by upload validation.
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES as usize + 1024 * 1024;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(ctx: ApiContext) -> Router {
    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Auth → Handler
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/extractions", get(endpoints::extractions::list))
        .route("/extractions/:id", get(endpoints::extractions::detail))
        .route(
            "/payloads/validate",
            post(endpoints::payloads::validate_draft),
        )
        .route("/payloads/submit", post(endpoints::payloads::submit))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    let uploads = Router::new()
        .route("/uploads", post(endpoints::uploads::upload))
        .with_state(ctx.clone())
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx);

    Router::new()
        .nest("/api", protected)
        .nest("/api", uploads)
        .nest("/api", public)
        // Responses carry personal data.
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::auth::TokenIdentityProvider;
    use crate::db::{RecordStore, SqliteRecordStore};
    use crate::models::NewExtraction;
    use crate::pipeline::import::UploadOrchestrator;
    use crate::testing::{
        minimal_pdf, payload_json, spawn_receiver, FailingRecordStore, FixedClock,
        MemoryBlobStore,
    };
    use crate::webhook::WebhookClient;

    const TOKEN: &str = "tok-u123";
    const OTHER_TOKEN: &str = "tok-u456";
    const NOW: i64 = 1_700_000_000_000;

    struct TestApp {
        app: Router,
        blobs: Arc<MemoryBlobStore>,
    }

    fn test_app(records: Arc<dyn RecordStore>, webhook: Option<WebhookClient>) -> TestApp {
        let auth = Arc::new(TokenIdentityProvider::from_pairs([
            ("u123", TOKEN),
            ("u456", OTHER_TOKEN),
        ]));
        let blobs = Arc::new(MemoryBlobStore::new());
        let uploads = Arc::new(
            UploadOrchestrator::new(auth.clone(), blobs.clone(), records.clone())
                .with_clock(Arc::new(FixedClock(NOW))),
        );
        let ctx = ApiContext::new(uploads, records, auth).with_webhook(webhook);
        TestApp {
            app: api_router(ctx),
            blobs,
        }
    }

    fn sqlite() -> Arc<SqliteRecordStore> {
        Arc::new(SqliteRecordStore::open_in_memory().unwrap())
    }

    fn make_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_request(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn upload_request(
        token: Option<&str>,
        field: &str,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Request<Body> {
        let boundary = "quote-intake-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/uploads")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            );
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ── Health ───────────────────────────────────────────────

    #[tokio::test]
    async fn health_is_public() {
        let t = test_app(sqlite(), None);
        let response = t
            .app
            .oneshot(make_request("GET", "/api/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["webhook_configured"], false);
    }

    // ── Uploads ──────────────────────────────────────────────

    #[tokio::test]
    async fn upload_creates_pending_record() {
        let records = sqlite();
        let t = test_app(records.clone(), None);
        let pdf = minimal_pdf(2 * 1024 * 1024);

        let response = t
            .app
            .oneshot(upload_request(
                Some(TOKEN),
                "file",
                "My Quote (final).pdf",
                "application/pdf",
                &pdf,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["storagePath"], "u123/1700000000000-My_Quote__final_.pdf");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["userId"], "u123");
        assert_eq!(json["filename"], "My Quote (final).pdf");

        assert!(t.blobs.contains("u123/1700000000000-My_Quote__final_.pdf"));
        assert_eq!(records.list_for_user("u123").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upload_record_failure_leaves_no_blob() {
        let t = test_app(Arc::new(FailingRecordStore::new()), None);

        let response = t
            .app
            .oneshot(upload_request(
                Some(TOKEN),
                "file",
                "My Quote (final).pdf",
                "application/pdf",
                &minimal_pdf(2 * 1024 * 1024),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"]["code"], "RECORD_FAILURE");
        assert!(!t.blobs.contains("u123/1700000000000-My_Quote__final_.pdf"));
        assert_eq!(t.blobs.remove_count(), 1);
    }

    #[tokio::test]
    async fn upload_without_token_is_401() {
        let t = test_app(sqlite(), None);
        let response = t
            .app
            .oneshot(upload_request(None, "file", "a.pdf", "application/pdf", &minimal_pdf(64)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(t.blobs.put_count(), 0);
    }

    #[tokio::test]
    async fn upload_of_wrong_type_is_400_without_side_effects() {
        let records = sqlite();
        let t = test_app(records.clone(), None);
        let response = t
            .app
            .oneshot(upload_request(Some(TOKEN), "file", "a.png", "image/png", b"\x89PNG"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "INVALID_INPUT");
        assert_eq!(t.blobs.put_count(), 0);
        assert!(records.list_for_user("u123").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_without_file_field_is_400() {
        let t = test_app(sqlite(), None);
        let response = t
            .app
            .oneshot(upload_request(
                Some(TOKEN),
                "attachment",
                "a.pdf",
                "application/pdf",
                &minimal_pdf(64),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(t.blobs.put_count(), 0);
    }

    #[tokio::test]
    async fn oversized_body_is_invalid_input() {
        let t = test_app(sqlite(), None);
        let huge = minimal_pdf(UPLOAD_BODY_LIMIT + 1024);
        let response = t
            .app
            .oneshot(upload_request(Some(TOKEN), "file", "big.pdf", "application/pdf", &huge))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INVALID_INPUT");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("too large"));
        assert_eq!(t.blobs.put_count(), 0);
    }

    #[tokio::test]
    async fn non_multipart_body_needs_auth_first() {
        let t = test_app(sqlite(), None);
        let unauthenticated = t
            .app
            .clone()
            .oneshot(json_request("/api/uploads", None, &serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

        let authenticated = t
            .app
            .oneshot(json_request("/api/uploads", Some(TOKEN), &serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(authenticated.status(), StatusCode::BAD_REQUEST);
    }

    // ── Extractions ──────────────────────────────────────────

    #[tokio::test]
    async fn extractions_require_auth() {
        let t = test_app(sqlite(), None);
        let response = t
            .app
            .oneshot(make_request("GET", "/api/extractions", Some("nope")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn extraction_detail_is_owner_only() {
        let records = sqlite();
        let record = records
            .insert(NewExtraction::pending("u123", "a.pdf", "u123/1-a.pdf"))
            .await
            .unwrap();
        let t = test_app(records, None);
        let uri = format!("/api/extractions/{}", record.id);

        let mine = t
            .app
            .clone()
            .oneshot(make_request("GET", &uri, Some(TOKEN)))
            .await
            .unwrap();
        assert_eq!(mine.status(), StatusCode::OK);
        assert_eq!(body_json(mine).await["id"], record.id.to_string());

        let theirs = t
            .app
            .clone()
            .oneshot(make_request("GET", &uri, Some(OTHER_TOKEN)))
            .await
            .unwrap();
        assert_eq!(theirs.status(), StatusCode::NOT_FOUND);

        let garbage = t
            .app
            .clone()
            .oneshot(make_request("GET", "/api/extractions/not-a-uuid", Some(TOKEN)))
            .await
            .unwrap();
        assert_eq!(garbage.status(), StatusCode::NOT_FOUND);

        let list = t
            .app
            .oneshot(make_request("GET", "/api/extractions", Some(OTHER_TOKEN)))
            .await
            .unwrap();
        assert_eq!(body_json(list).await, serde_json::json!([]));
    }

    // ── Payloads ─────────────────────────────────────────────

    #[tokio::test]
    async fn validate_reports_all_errors() {
        let t = test_app(sqlite(), None);

        let ok = t
            .app
            .clone()
            .oneshot(json_request(
                "/api/payloads/validate",
                Some(TOKEN),
                &payload_json("both", Uuid::new_v4(), "u123"),
            ))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(body_json(ok).await["valid"], true);

        let mut bad = payload_json("auto", Uuid::new_v4(), "u123");
        bad["auto"]["drivers"] = serde_json::json!([]);
        bad["personal"]["email"] = "nope".into();
        let response = t
            .app
            .oneshot(json_request("/api/payloads/validate", Some(TOKEN), &bad))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn submit_without_webhook_is_503() {
        let t = test_app(sqlite(), None);
        let response = t
            .app
            .oneshot(json_request(
                "/api/payloads/submit",
                Some(TOKEN),
                &payload_json("home", Uuid::new_v4(), "u123"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn submit_delivers_owned_extraction() {
        let (url, received) =
            spawn_receiver(StatusCode::OK, r#"{"success":true,"jobId":"J1"}"#).await;
        let webhook = WebhookClient::new(&url, std::time::Duration::from_secs(5)).unwrap();

        let records = sqlite();
        let record = records
            .insert(NewExtraction::pending("u123", "q.pdf", "u123/1-q.pdf"))
            .await
            .unwrap();
        let t = test_app(records, Some(webhook));

        let response = t
            .app
            .oneshot(json_request(
                "/api/payloads/submit",
                Some(TOKEN),
                &payload_json("both", record.id, "u123"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["jobId"], "J1");
        assert_eq!(received.count(), 1);
    }

    #[tokio::test]
    async fn submit_refuses_foreign_extraction_before_sending() {
        let (url, received) = spawn_receiver(StatusCode::OK, r#"{"success":true}"#).await;
        let webhook = WebhookClient::new(&url, std::time::Duration::from_secs(5)).unwrap();

        let records = sqlite();
        let foreign = records
            .insert(NewExtraction::pending("u456", "q.pdf", "u456/1-q.pdf"))
            .await
            .unwrap();
        let t = test_app(records, Some(webhook));

        let response = t
            .app
            .oneshot(json_request(
                "/api/payloads/submit",
                Some(TOKEN),
                &payload_json("home", foreign.id, "u456"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INVALID_PAYLOAD");
        assert_eq!(json["error"]["details"].as_array().unwrap().len(), 2);
        assert_eq!(received.count(), 0);
    }

    #[tokio::test]
    async fn submit_surfaces_receiver_rejection() {
        let (url, _) = spawn_receiver(
            StatusCode::OK,
            r#"{"success":false,"message":"duplicate quote","errors":["quoteId seen"]}"#,
        )
        .await;
        let webhook = WebhookClient::new(&url, std::time::Duration::from_secs(5)).unwrap();
        let records = sqlite();
        let record = records
            .insert(NewExtraction::pending("u123", "q.pdf", "u123/1-q.pdf"))
            .await
            .unwrap();
        let t = test_app(records, Some(webhook));

        let response = t
            .app
            .oneshot(json_request(
                "/api/payloads/submit",
                Some(TOKEN),
                &payload_json("auto", record.id, "u123"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "REJECTED_BY_RECEIVER");
        assert_eq!(json["error"]["message"], "duplicate quote");
        assert_eq!(json["error"]["details"][0], "quoteId seen");
    }
}
