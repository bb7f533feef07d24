//! Google OAuth for the calendar feed.
//!
//! [`Authenticator::authorized`] returns a usable access token, in order of
//! preference: the stored token if still valid, a refreshed token, or a new
//! one from the interactive consent flow. Every new token is written back to
//! the token file.

pub mod callback;
pub mod flow;
pub mod secrets;
pub mod token;

use std::path::PathBuf;

use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

pub use callback::{CALLBACK_TIMEOUT, CallbackListener, CallbackResult};
pub use flow::Pkce;
pub use secrets::ClientSecrets;
pub use token::{StoredToken, TokenStore};

use crate::FeedError;

pub struct Authenticator {
    http: Client,
    secrets_path: PathBuf,
    store: TokenStore,
    scopes: Vec<String>,
    /// Serializes callers so only one consent flow can be open at a time.
    lock: Mutex<()>,
}

impl Authenticator {
    pub fn new(secrets_path: impl Into<PathBuf>, store: TokenStore, scopes: Vec<String>) -> Self {
        Self::with_client(Client::new(), secrets_path, store, scopes)
    }

    pub fn with_client(
        http: Client,
        secrets_path: impl Into<PathBuf>,
        store: TokenStore,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            http,
            secrets_path: secrets_path.into(),
            store,
            scopes,
            lock: Mutex::new(()),
        }
    }

    pub async fn authorized(&self) -> Result<StoredToken, FeedError> {
        let _guard = self.lock.lock().await;

        if let Some(token) = self.store.load().await? {
            if token.covers(&self.scopes) {
                if token.is_valid(Utc::now()) {
                    return Ok(token);
                }

                if token.can_refresh() {
                    tracing::info!("Calendar token expired, refreshing");
                    match flow::refresh(&self.http, &token).await {
                        Ok(fresh) => {
                            self.store.save(&fresh).await?;
                            return Ok(fresh);
                        }
                        Err(e) => tracing::warn!("Token refresh failed, re-authorizing: {}", e),
                    }
                }
            } else {
                tracing::info!("Stored token lacks required scopes, re-authorizing");
            }
        }

        let secrets = ClientSecrets::load(&self.secrets_path).await?;
        let token = flow::run_local_server(&self.http, &secrets, &self.scopes).await?;
        self.store.save(&token).await?;
        Ok(token)
    }
}
