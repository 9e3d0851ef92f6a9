//! RPA webhook: payload model, validation and submission.

pub mod client;
pub mod draft;
pub mod types;
pub mod validation;

pub use client::{SubmissionReceipt, WebhookClient, WebhookResponse};
pub use draft::PayloadDraft;
pub use types::{Coverage, Currency, NonEmpty, WebhookPayload};
pub use validation::{validate, validate_payload};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Payload failed validation with {} problem(s)", .0.len())]
    InvalidPayload(Vec<String>),

    #[error("Webhook delivery failed: {0}")]
    DeliveryFailure(#[from] DeliveryFailure),

    #[error("Receiver rejected the payload: {}", .message.as_deref().unwrap_or("no message"))]
    RejectedByReceiver {
        message: Option<String>,
        errors: Vec<String>,
    },

    #[error("Webhook client could not be built: {0}")]
    Client(String),
}

/// The payload never produced a well-formed answer from the receiver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryFailure {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("receiver returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("malformed receiver response: {0}")]
    MalformedResponse(String),
}
