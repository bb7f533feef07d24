//! Stored user token (`token.json`) and its on-disk store.
//!
//! The layout matches Google's "authorized user" JSON so a token written by
//! other Google tooling can be reused.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::secrets::ClientSecrets;
use crate::FeedError;

/// Tokens this close to expiry are treated as expired.
pub const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// Usable right now: non-empty and not within the expiry skew.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.token.is_empty() && !self.is_expired(now)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry - now <= TimeDelta::seconds(EXPIRY_SKEW_SECS),
            None => false,
        }
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// True if every scope in `required` was granted.
    pub fn covers(&self, required: &[String]) -> bool {
        required.iter().all(|s| self.scopes.contains(s))
    }
}

/// Body of a successful token-endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Build a fresh stored token after a code exchange.
    pub fn into_stored(
        self,
        secrets: &ClientSecrets,
        requested: &[String],
        now: DateTime<Utc>,
    ) -> StoredToken {
        let scopes = self.granted_scopes(requested);
        StoredToken {
            token: self.access_token,
            refresh_token: self.refresh_token,
            token_uri: secrets.token_uri.clone(),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            scopes,
            expiry: self.expires_in.map(|s| now + TimeDelta::seconds(s)),
        }
    }

    /// Apply a refresh response on top of the previous token. Google usually
    /// omits the refresh token here, so the old one is kept.
    pub fn refreshed(self, previous: &StoredToken, now: DateTime<Utc>) -> StoredToken {
        let scopes = self.granted_scopes(&previous.scopes);
        StoredToken {
            token: self.access_token,
            refresh_token: self.refresh_token.or_else(|| previous.refresh_token.clone()),
            token_uri: previous.token_uri.clone(),
            client_id: previous.client_id.clone(),
            client_secret: previous.client_secret.clone(),
            scopes,
            expiry: self.expires_in.map(|s| now + TimeDelta::seconds(s)),
        }
    }

    fn granted_scopes(&self, fallback: &[String]) -> Vec<String> {
        match &self.scope {
            Some(s) if !s.trim().is_empty() => s.split_whitespace().map(str::to_string).collect(),
            _ => fallback.to_vec(),
        }
    }
}

/// Reads and writes the token file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file is absent. A corrupt file is also treated as
    /// absent so the consent flow can replace it.
    pub async fn load(&self) -> Result<Option<StoredToken>, FeedError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(FeedError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match serde_json::from_str::<StoredToken>(&raw) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable token file {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    pub async fn save(&self, token: &StoredToken) -> Result<(), FeedError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| FeedError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }

        let json = serde_json::to_string_pretty(token)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| FeedError::Io {
                path: self.path.clone(),
                source,
            })?;

        tracing::info!("Saved calendar token to {}", self.path.display());
        Ok(())
    }
}
