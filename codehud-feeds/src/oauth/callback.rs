//! Loopback listener that receives the OAuth redirect.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};

use crate::FeedError;

/// What the browser brought back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackResult {
    Code { code: String, state: Option<String> },
    Denied { error: String, description: Option<String> },
}

/// Query string on the redirect: `?code=...&state=...` or `?error=...`.
#[derive(Debug, Deserialize)]
struct AuthQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Clone)]
struct CallbackState {
    /// Taken by the first request that carries a code or an error.
    done_tx: Arc<Mutex<Option<oneshot::Sender<CallbackResult>>>>,
}

const SUCCESS_PAGE: &str = r#"
<h2>Code HUD is authorized</h2>
<p>You can close this window now.</p>
<script>
  window.onload = function() {
      window.open('about:blank', '_self');
      window.close();
  };
</script>
"#;

/// How long the consent page may stay unanswered.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

pub struct CallbackListener {
    addr: SocketAddr,
    result_rx: oneshot::Receiver<CallbackResult>,
    shutdown_tx: oneshot::Sender<()>,
}

impl CallbackListener {
    /// Listen on an ephemeral loopback port.
    pub async fn bind() -> Result<Self, FeedError> {
        Self::bind_addr(SocketAddr::from(([127, 0, 0, 1], 0))).await
    }

    pub async fn bind_addr(addr: SocketAddr) -> Result<Self, FeedError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| FeedError::Auth(format!("could not open callback listener on {}: {}", addr, e)))?;
        let addr = listener
            .local_addr()
            .map_err(|e| FeedError::Auth(format!("callback listener has no address: {}", e)))?;

        let (done_tx, result_rx) = oneshot::channel::<CallbackResult>();
        let state = CallbackState {
            done_tx: Arc::new(Mutex::new(Some(done_tx))),
        };

        let app = Router::new()
            .route("/", get(handle_callback))
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tracing::info!("OAuth callback listener on http://{}", addr);

        tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!("Callback listener error: {}", e);
            }
            tracing::debug!("Callback listener shut down.");
        });

        Ok(Self {
            addr,
            result_rx,
            shutdown_tx,
        })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Redirect URI registered in the consent request.
    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}/", self.port())
    }

    /// Wait up to [`CALLBACK_TIMEOUT`] for the redirect, then stop listening.
    pub async fn wait(self) -> Result<CallbackResult, FeedError> {
        self.wait_for(CALLBACK_TIMEOUT).await
    }

    pub async fn wait_for(self, limit: Duration) -> Result<CallbackResult, FeedError> {
        let result = match tokio::time::timeout(limit, self.result_rx).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(_)) => Err(FeedError::Auth(
                "callback listener closed before a response arrived".into(),
            )),
            Err(_) => Err(FeedError::Auth(format!(
                "no response from the consent page within {}s",
                limit.as_secs()
            ))),
        };
        let _ = self.shutdown_tx.send(());
        result
    }
}

async fn handle_callback(
    State(state): State<CallbackState>,
    Query(query): Query<AuthQuery>,
) -> (StatusCode, Html<String>) {
    let result = match (query.code, query.error) {
        (_, Some(error)) => CallbackResult::Denied {
            error,
            description: query.error_description,
        },
        (Some(code), None) => CallbackResult::Code {
            code,
            state: query.state,
        },
        (None, None) => {
            return (
                StatusCode::BAD_REQUEST,
                Html("<h2>Missing 'code' query parameter</h2>".to_string()),
            );
        }
    };

    let page = match &result {
        CallbackResult::Code { .. } => SUCCESS_PAGE.to_string(),
        CallbackResult::Denied { error, .. } => {
            format!("<h2>Authorization failed</h2><p>{}</p>", html_escape(error))
        }
    };

    if let Some(tx) = state.done_tx.lock().await.take() {
        let _ = tx.send(result);
    }

    (StatusCode::OK, Html(page))
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
