use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Http(reqwest::Error),

    #[error("{service} returned {status}: {message}")]
    Status {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("unexpected response: {0}")]
    Parse(String),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("authorization failed: {0}")]
    Auth(String),

    #[error(
        "client secrets not found at {0} (download a Desktop OAuth client JSON from the Google Cloud console)"
    )]
    MissingSecrets(PathBuf),
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        // The URL carries the weather API key in its query string.
        FeedError::Http(e.without_url())
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::Parse(e.to_string())
    }
}

impl From<url::ParseError> for FeedError {
    fn from(e: url::ParseError) -> Self {
        FeedError::Parse(format!("bad url: {}", e))
    }
}
