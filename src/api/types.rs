//! Shared types for the HTTP API layer.

use std::sync::Arc;

use serde::Serialize;

use crate::auth::IdentityProvider;
use crate::db::RecordStore;
use crate::pipeline::import::UploadOrchestrator;
use crate::webhook::WebhookClient;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub uploads: Arc<UploadOrchestrator>,
    pub records: Arc<dyn RecordStore>,
    pub auth: Arc<dyn IdentityProvider>,
    /// `None` when no RPA endpoint is configured.
    pub webhook: Option<WebhookClient>,
}

impl ApiContext {
    pub fn new(
        uploads: Arc<UploadOrchestrator>,
        records: Arc<dyn RecordStore>,
        auth: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            uploads,
            records,
            auth,
            webhook: None,
        }
    }

    pub fn with_webhook(mut self, webhook: Option<WebhookClient>) -> Self {
        self.webhook = webhook;
        self
    }
}

// ═══════════════════════════════════════════════════════════
// Response bodies
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub job_id: Option<String>,
    pub message: Option<String>,
}
