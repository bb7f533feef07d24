//! Installed-app authorization code flow with PKCE.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use reqwest::Client;
use sha2::{Digest, Sha256};
use url::Url;
use uuid::Uuid;

use super::callback::{CallbackListener, CallbackResult};
use super::secrets::ClientSecrets;
use super::token::{StoredToken, TokenResponse};
use crate::FeedError;

/// RFC 7636 code verifier and its S256 challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

impl Pkce {
    pub fn generate() -> Self {
        // 64 hex chars, inside the 43..=128 unreserved-character range.
        let verifier = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        Self::from_verifier(verifier)
    }

    pub fn from_verifier(verifier: impl Into<String>) -> Self {
        let verifier = verifier.into();
        let digest = Sha256::digest(verifier.as_bytes());
        let challenge = URL_SAFE_NO_PAD.encode(digest);
        Self {
            verifier,
            challenge,
        }
    }
}

/// Consent page URL the user opens in a browser.
pub fn consent_url(
    secrets: &ClientSecrets,
    redirect_uri: &str,
    scopes: &[String],
    state: &str,
    pkce: &Pkce,
) -> Result<Url, FeedError> {
    let scope = scopes.join(" ");
    let url = Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("response_type", "code"),
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", scope.as_str()),
            ("state", state),
            ("code_challenge", pkce.challenge.as_str()),
            ("code_challenge_method", "S256"),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )?;
    Ok(url)
}

/// Turn a non-2xx token endpoint reply into an error.
async fn token_reply(resp: reqwest::Response) -> Result<TokenResponse, FeedError> {
    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        return Err(FeedError::Status {
            service: "token endpoint",
            status: status.as_u16(),
            message: text.chars().take(200).collect(),
        });
    }
    Ok(serde_json::from_str(&text)?)
}

/// Exchange an authorization code for tokens.
pub async fn exchange_code(
    http: &Client,
    secrets: &ClientSecrets,
    code: &str,
    redirect_uri: &str,
    pkce: &Pkce,
    scopes: &[String],
) -> Result<StoredToken, FeedError> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", secrets.client_id.as_str()),
        ("client_secret", secrets.client_secret.as_str()),
        ("redirect_uri", redirect_uri),
        ("code_verifier", pkce.verifier.as_str()),
    ];
    let resp = http.post(&secrets.token_uri).form(&params).send().await?;
    let reply = token_reply(resp).await?;
    Ok(reply.into_stored(secrets, scopes, Utc::now()))
}

/// Refresh an expired access token.
pub async fn refresh(http: &Client, token: &StoredToken) -> Result<StoredToken, FeedError> {
    let refresh_token = token
        .refresh_token
        .as_deref()
        .ok_or_else(|| FeedError::Auth("token has no refresh token".into()))?;

    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", token.client_id.as_str()),
        ("client_secret", token.client_secret.as_str()),
    ];
    let resp = http.post(&token.token_uri).form(&params).send().await?;
    let reply = token_reply(resp).await?;
    Ok(reply.refreshed(token, Utc::now()))
}

/// Run the interactive flow: open a loopback listener, send the user to the
/// consent page, and exchange the returned code.
pub async fn run_local_server(
    http: &Client,
    secrets: &ClientSecrets,
    scopes: &[String],
) -> Result<StoredToken, FeedError> {
    let listener = CallbackListener::bind().await?;
    let redirect_uri = listener.redirect_uri();
    let state = Uuid::new_v4().simple().to_string();
    let pkce = Pkce::generate();

    let url = consent_url(secrets, &redirect_uri, scopes, &state, &pkce)?;
    tracing::info!("Please visit this URL to authorize Code HUD: {}", url);
    if let Err(e) = open::that_detached(url.as_str()) {
        tracing::warn!("Could not open a browser ({}); open the URL above manually", e);
    }

    let code = accept_callback(listener.wait().await?, &state)?;
    tracing::info!("Authorization code received, exchanging for tokens");
    exchange_code(http, secrets, &code, &redirect_uri, &pkce, scopes).await
}

/// The authorization code from a redirect, if it answers the request that
/// carried `expected_state`. A denial becomes an error carrying Google's
/// reason.
pub fn accept_callback(result: CallbackResult, expected_state: &str) -> Result<String, FeedError> {
    match result {
        CallbackResult::Code { code, state } => {
            if state.as_deref() != Some(expected_state) {
                return Err(FeedError::Auth("state mismatch in OAuth callback".into()));
            }
            Ok(code)
        }
        CallbackResult::Denied { error, description } => Err(FeedError::Auth(match description {
            Some(d) => format!("{}: {}", error, d),
            None => error,
        })),
    }
}
