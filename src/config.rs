use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "QuoteIntake";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The only document type the intake endpoint accepts.
pub const ACCEPTED_CONTENT_TYPE: &str = "application/pdf";

/// Upload ceiling: 20 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// Schema version stamped into `metadata.version` of outgoing payloads.
pub const PAYLOAD_SCHEMA_VERSION: &str = "1.0";

const DEFAULT_BIND: &str = "127.0.0.1:8787";
const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RECORD_TIMEOUT_SECS: u64 = 10;
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 30;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "quote_intake=info,tower_http=info"
}

/// Get the application data directory
/// ~/QuoteIntake/ unless overridden by `QUOTE_INTAKE_DATA_DIR`.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid {expected}: {value}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    /// `(user_id, token)` pairs accepted by the bearer-token provider.
    pub api_tokens: Vec<(String, String)>,
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub storage_timeout: Duration,
    pub record_timeout: Duration,
    pub webhook_timeout: Duration,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.parse().unwrap_or_else(|_| {
                SocketAddr::from(([127, 0, 0, 1], 8787))
            }),
            data_dir: app_data_dir(),
            api_tokens: Vec::new(),
            webhook_url: None,
            webhook_secret: None,
            storage_timeout: Duration::from_secs(DEFAULT_STORAGE_TIMEOUT_SECS),
            record_timeout: Duration::from_secs(DEFAULT_RECORD_TIMEOUT_SECS),
            webhook_timeout: Duration::from_secs(DEFAULT_WEBHOOK_TIMEOUT_SECS),
        }
    }
}

impl IntakeConfig {
    /// Build from `QUOTE_INTAKE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match get("QUOTE_INTAKE_BIND") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "QUOTE_INTAKE_BIND",
                expected: "socket address",
                value: raw.clone(),
            })?,
            None => defaults.bind_addr,
        };

        let data_dir = get("QUOTE_INTAKE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let api_tokens = match get("QUOTE_INTAKE_API_TOKENS") {
            Some(raw) => parse_token_pairs(&raw)?,
            None => Vec::new(),
        };

        let webhook_url = get("QUOTE_INTAKE_WEBHOOK_URL")
            .map(|raw| parse_webhook_url(raw.trim()))
            .transpose()?;

        Ok(Self {
            bind_addr,
            data_dir,
            api_tokens,
            webhook_url,
            webhook_secret: get("QUOTE_INTAKE_WEBHOOK_SECRET"),
            storage_timeout: secs(
                get("QUOTE_INTAKE_STORAGE_TIMEOUT_SECS"),
                "QUOTE_INTAKE_STORAGE_TIMEOUT_SECS",
                defaults.storage_timeout,
            )?,
            record_timeout: secs(
                get("QUOTE_INTAKE_RECORD_TIMEOUT_SECS"),
                "QUOTE_INTAKE_RECORD_TIMEOUT_SECS",
                defaults.record_timeout,
            )?,
            webhook_timeout: secs(
                get("QUOTE_INTAKE_WEBHOOK_TIMEOUT_SECS"),
                "QUOTE_INTAKE_WEBHOOK_TIMEOUT_SECS",
                defaults.webhook_timeout,
            )?,
        })
    }

    /// Directory holding raw uploaded documents.
    pub fn blobs_dir(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }

    /// SQLite file holding extraction records.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("database").join("intake.db")
    }
}

fn secs(
    raw: Option<String>,
    var: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => match value.trim().parse::<u64>() {
            Ok(n) if n > 0 => Ok(Duration::from_secs(n)),
            _ => Err(ConfigError::Invalid {
                var,
                expected: "positive number of seconds",
                value,
            }),
        },
    }
}

/// Parse `user_id:token,user_id:token`.
/// Absolute http(s) URL with a host; checked here so a typo fails startup
/// rather than the first submission.
fn parse_webhook_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::Invalid {
        var: "QUOTE_INTAKE_WEBHOOK_URL",
        expected: "http(s) URL",
        value: raw.to_string(),
    };
    let url = reqwest::Url::parse(raw).map_err(|_| invalid())?;
    let web = matches!(url.scheme(), "http" | "https");
    if !web || url.host_str().map_or(true, str::is_empty) {
        return Err(invalid());
    }
    Ok(raw.to_string())
}

fn parse_token_pairs(raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((user, token)) if !user.trim().is_empty() && !token.trim().is_empty() => {
                Ok((user.trim().to_string(), token.trim().to_string()))
            }
            _ => Err(ConfigError::Invalid {
                var: "QUOTE_INTAKE_API_TOKENS",
                expected: "user_id:token list",
                // Never echo the token itself.
                value: entry.split(':').next().unwrap_or_default().to_string(),
            }),
        })
        .collect()
}
