//! Authentication capability.
//!
//! Callers present `Credentials` (a bearer token today); an
//! `IdentityProvider` turns them into a verified `Identity` or fails.
//! Tokens are never held in memory in plain form; only their SHA-256
//! digests, compared in constant time.

use async_trait::async_trait;
use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
}

/// Whatever the transport carried as proof of identity.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub bearer_token: Option<String>,
}

impl Credentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(token.into()),
        }
    }

    /// Extract `Authorization: Bearer <token>` from request headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let bearer_token = headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Self { bearer_token }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No credentials supplied")]
    MissingCredentials,

    #[error("Credentials not recognised")]
    InvalidCredentials,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self, credentials: &Credentials) -> Result<Identity, AuthError>;
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Static bearer-token provider configured from `user_id:token` pairs.
#[derive(Default)]
pub struct TokenIdentityProvider {
    tokens: Vec<([u8; 32], String)>,
}

impl TokenIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, user_id: &str, token: &str) -> Self {
        self.insert(user_id, token);
        self
    }

    pub fn insert(&mut self, user_id: &str, token: &str) {
        let digest = hash_token(token);
        self.tokens.retain(|(existing, _)| existing != &digest);
        self.tokens.push((digest, user_id.to_string()));
    }

    /// Build from `(user_id, token)` pairs; a user may hold several tokens.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut provider = Self::new();
        for (user_id, token) in pairs {
            provider.insert(user_id, token);
        }
        provider
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn lookup(&self, token: &str) -> Option<&str> {
        let digest = hash_token(token);
        // Scan every entry so timing does not depend on which one matched.
        let mut found = None;
        for (candidate, user_id) in &self.tokens {
            if bool::from(candidate.ct_eq(&digest)) {
                found = Some(user_id.as_str());
            }
        }
        found
    }
}

#[async_trait]
impl IdentityProvider for TokenIdentityProvider {
    async fn current_user(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let token = credentials
            .bearer_token
            .as_deref()
            .ok_or(AuthError::MissingCredentials)?;

        match self.lookup(token) {
            Some(user_id) => Ok(Identity {
                user_id: user_id.to_string(),
            }),
            None => {
                tracing::warn!("Rejected unknown bearer token");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
