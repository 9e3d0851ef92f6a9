pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod webhook;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::ApiContext;
use crate::auth::TokenIdentityProvider;
use crate::config::{ConfigError, IntakeConfig};
use crate::db::{DatabaseError, SqliteRecordStore};
use crate::pipeline::import::{UploadOrchestrator, UploadTimeouts};
use crate::storage::FilesystemBlobStore;
use crate::webhook::{WebhookClient, WebhookError};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Webhook client error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wire the production capabilities described by `config`.
pub fn build_context(config: &IntakeConfig) -> Result<ApiContext, StartupError> {
    let auth = Arc::new(TokenIdentityProvider::from_pairs(
        config
            .api_tokens
            .iter()
            .map(|(user, token)| (user.as_str(), token.as_str())),
    ));
    if auth.is_empty() {
        tracing::warn!("No API tokens configured; every authenticated request will be rejected");
    }

    let records = Arc::new(SqliteRecordStore::open(&config.database_path())?);
    let blobs = Arc::new(FilesystemBlobStore::new(config.blobs_dir()));
    let uploads = Arc::new(
        UploadOrchestrator::new(auth.clone(), blobs, records.clone())
            .with_timeouts(UploadTimeouts::from_config(config)),
    );

    let webhook = match &config.webhook_url {
        Some(url) => {
            tracing::info!(url = %url, "Webhook submission enabled");
            Some(
                WebhookClient::new(url, config.webhook_timeout)?
                    .with_secret(config.webhook_secret.clone()),
            )
        }
        None => {
            tracing::info!("No webhook URL configured; submission disabled");
            None
        }
    };

    Ok(ApiContext::new(uploads, records, auth).with_webhook(webhook))
}

/// Start the service and serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = IntakeConfig::from_env()?;
    tracing::info!(data_dir = %config.data_dir.display(), "Configuration loaded");

    let ctx = build_context(&config)?;
    let mut server = api::start_server(ctx, config.bind_addr).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
    }

    server.shutdown();
    server.wait().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_in(dir: &std::path::Path, extra: &[(&str, &str)]) -> IntakeConfig {
        let mut vars: HashMap<String, String> = extra
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        vars.insert(
            "QUOTE_INTAKE_DATA_DIR".into(),
            dir.to_string_lossy().into_owned(),
        );
        IntakeConfig::from_lookup(move |key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn build_context_creates_database_under_data_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_in(tmp.path(), &[("QUOTE_INTAKE_API_TOKENS", "u1:t1")]);

        let ctx = build_context(&config).unwrap();

        assert!(ctx.webhook.is_none());
        assert!(config.database_path().exists());
    }

    #[test]
    fn webhook_client_follows_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_in(
            tmp.path(),
            &[
                ("QUOTE_INTAKE_WEBHOOK_URL", "https://rpa.example.com/hook"),
                ("QUOTE_INTAKE_WEBHOOK_SECRET", "s"),
            ],
        );

        let ctx = build_context(&config).unwrap();
        assert_eq!(
            ctx.webhook.as_ref().map(|w| w.url()),
            Some("https://rpa.example.com/hook")
        );
    }
}
