//! OAuth client secrets (`credentials.json`).

use std::path::Path;

use serde::Deserialize;

use crate::FeedError;

pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The client half of the Google "installed" (or "web") secrets layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn parse(raw: &str) -> Result<Self, FeedError> {
        let file: SecretsFile = serde_json::from_str(raw)?;
        file.installed.or(file.web).ok_or_else(|| {
            FeedError::Parse("client secrets have neither an \"installed\" nor a \"web\" section".into())
        })
    }

    pub async fn load(path: &Path) -> Result<Self, FeedError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FeedError::MissingSecrets(path.to_path_buf()));
            }
            Err(source) => {
                return Err(FeedError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::parse(&raw)
    }
}
