use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Form, Query};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{TimeDelta, TimeZone, Utc};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use codehud_core::{CalendarEvent, FeedDispatcher, FeedKind, FeedUpdate, WeatherReport};
use codehud_feeds::calendar::{CALENDAR_READONLY_SCOPE, UNTITLED, parse_events};
use codehud_feeds::oauth::flow::{accept_callback, consent_url};
use codehud_feeds::oauth::token::TokenResponse;
use codehud_feeds::oauth::{
    Authenticator, CallbackListener, CallbackResult, ClientSecrets, Pkce, StoredToken, TokenStore,
};
use codehud_feeds::redact::Redactor;
use codehud_feeds::weather::{error_message, parse_observation};
use codehud_feeds::{
    CalendarSource, FeedError, FeedHub, GoogleCalendarClient, OpenWeatherClient, WeatherSource,
};

// ============================================================================
// Helpers
// ============================================================================

/// Serve `app` on an ephemeral loopback port and return its base URL.
async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn scopes() -> Vec<String> {
    vec![CALENDAR_READONLY_SCOPE.to_string()]
}

fn token(access: &str, expires_in_secs: i64, token_uri: &str) -> StoredToken {
    StoredToken {
        token: access.to_string(),
        refresh_token: Some("1//refresh-token-value".to_string()),
        token_uri: token_uri.to_string(),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        scopes: scopes(),
        expiry: Some(Utc::now() + TimeDelta::seconds(expires_in_secs)),
    }
}

fn secrets() -> ClientSecrets {
    ClientSecrets::parse(
        r#"{"installed":{"client_id":"abc.apps.googleusercontent.com","client_secret":"shh",
            "auth_uri":"https://accounts.google.com/o/oauth2/auth",
            "token_uri":"https://oauth2.googleapis.com/token",
            "redirect_uris":["http://localhost"]}}"#,
    )
    .unwrap()
}

const OBSERVATION: &str = r#"{
    "coord": {"lon": -86.16, "lat": 39.77},
    "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
    "main": {"temp": 54.3, "feels_like": 52.1, "humidity": 81},
    "name": "Indianapolis",
    "cod": 200
}"#;

const EVENTS_PAGE: &str = r#"{
    "kind": "calendar#events",
    "items": [
        {"summary": "Standup", "start": {"dateTime": "2026-10-16T09:00:00-04:00"}},
        {"summary": "Holiday", "start": {"date": "2026-10-17"}},
        {"start": {"dateTime": "2026-10-18T13:30:00-04:00"}},
        {"summary": "Cancelled instance", "status": "cancelled"}
    ]
}"#;

// ============================================================================
// Redactor Tests
// ============================================================================

#[test]
fn test_scrub_appid_in_url() {
    let input = "error sending request for url (http://x/data/2.5/weather?q=Indy&appid=abc123&units=imperial)";
    let scrubbed = Redactor::scrub(input);
    assert!(scrubbed.contains("appid=[REDACTED]"));
    assert!(!scrubbed.contains("abc123"));
    assert!(scrubbed.contains("units=imperial"));
}

#[test]
fn test_scrub_bearer_header() {
    let scrubbed = Redactor::scrub("sent Authorization: Bearer abc.def-ghi");
    assert!(scrubbed.contains("Bearer [REDACTED]"));
    assert!(!scrubbed.contains("abc.def-ghi"));
}

#[test]
fn test_scrub_google_tokens() {
    let scrubbed = Redactor::scrub("tokens ya29.a0AfH6SMBxyz123456 and 1//0gAbCdEfGhIjKlMn");
    assert!(!scrubbed.contains("ya29.a0AfH6SMBxyz123456"));
    assert!(!scrubbed.contains("1//0gAbCdEfGhIjKlMn"));
    assert_eq!(scrubbed.matches("[REDACTED_TOKEN]").count(), 2);
}

#[test]
fn test_scrub_clean_text_untouched() {
    let input = "weather service returned 404: city not found";
    assert_eq!(Redactor::scrub(input), input);
}

// ============================================================================
// Weather Tests
// ============================================================================

#[test]
fn test_parse_observation() {
    let report = parse_observation("Indianapolis, US", OBSERVATION).unwrap();
    assert_eq!(
        report,
        WeatherReport {
            location: "Indianapolis, US".to_string(),
            description: "light rain".to_string(),
            temperature_f: 54.3,
        }
    );
}

#[test]
fn test_parse_observation_without_conditions() {
    let body = r#"{"weather": [], "main": {"temp": 10.0}}"#;
    assert!(matches!(
        parse_observation("X", body),
        Err(FeedError::Parse(_))
    ));
}

#[test]
fn test_parse_observation_garbage() {
    assert!(matches!(
        parse_observation("X", "<html>"),
        Err(FeedError::Parse(_))
    ));
}

#[test]
fn test_weather_error_message() {
    assert_eq!(
        error_message(r#"{"cod":401,"message":"Invalid API key."}"#),
        "Invalid API key."
    );
    assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
}

#[test]
fn test_weather_request_url() {
    let client = OpenWeatherClient::new("https://api.example.com/", "KEY", "Indianapolis, US");
    let url = client.request_url().unwrap();
    assert_eq!(url.path(), "/data/2.5/weather");
    let q: HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert_eq!(q["q"], "Indianapolis, US");
    assert_eq!(q["appid"], "KEY");
    assert_eq!(q["units"], "imperial");
}

#[tokio::test]
async fn test_weather_client_end_to_end() {
    let app = Router::new().route(
        "/data/2.5/weather",
        get(|Query(q): Query<HashMap<String, String>>| async move {
            if q.get("appid").map(String::as_str) != Some("KEY") {
                return (StatusCode::UNAUTHORIZED, OBSERVATION.to_string());
            }
            (StatusCode::OK, OBSERVATION.to_string())
        }),
    );
    let base = serve(app).await;

    let client = OpenWeatherClient::new(&base, "KEY", "Indianapolis, US");
    let report = client.current().await.unwrap();
    assert_eq!(report.description, "light rain");
    assert_eq!(report.temperature_f, 54.3);
}

#[tokio::test]
async fn test_weather_client_reports_api_error() {
    let app = Router::new().route(
        "/data/2.5/weather",
        get(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"cod": 401, "message": "Invalid API key."})),
            )
        }),
    );
    let base = serve(app).await;

    let client = OpenWeatherClient::new(&base, "WRONG", "Indianapolis, US");
    let err = client.current().await.unwrap_err();
    assert!(matches!(err, FeedError::Status { status: 401, .. }));
    assert_eq!(err.to_string(), "weather service returned 401: Invalid API key.");
}

#[tokio::test]
async fn test_weather_connection_error_hides_key() {
    // Nothing listens on port 9 (discard) on loopback in CI.
    let client = OpenWeatherClient::new("http://127.0.0.1:9", "SECRETKEY", "X");
    let err = client.current().await.unwrap_err();
    assert!(matches!(err, FeedError::Http(_)));
    assert!(!err.to_string().contains("SECRETKEY"));
}

// ============================================================================
// Calendar Tests
// ============================================================================

#[test]
fn test_parse_events() {
    let events = parse_events(EVENTS_PAGE, 5).unwrap();
    assert_eq!(
        events,
        vec![
            CalendarEvent {
                start: "2026-10-16T09:00:00-04:00".to_string(),
                title: "Standup".to_string(),
            },
            CalendarEvent {
                start: "2026-10-17".to_string(),
                title: "Holiday".to_string(),
            },
            CalendarEvent {
                start: "2026-10-18T13:30:00-04:00".to_string(),
                title: UNTITLED.to_string(),
            },
        ]
    );
}

#[test]
fn test_parse_events_caps_results() {
    let events = parse_events(EVENTS_PAGE, 2).unwrap();
    assert_eq!(events.len(), 2);
}

#[test]
fn test_parse_events_without_items() {
    let events = parse_events(r#"{"kind": "calendar#events"}"#, 5).unwrap();
    assert!(events.is_empty());
}

#[test]
fn test_events_url() {
    let dir = tempfile::tempdir().unwrap();
    let auth = Authenticator::new(
        dir.path().join("credentials.json"),
        TokenStore::new(dir.path().join("token.json")),
        scopes(),
    );
    let client = GoogleCalendarClient::new("https://www.googleapis.com", auth);
    let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();

    let url = client.events_url(now, 5).unwrap();
    assert_eq!(url.path(), "/calendar/v3/calendars/primary/events");
    let q: HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert_eq!(q["timeMin"], "2026-10-16T12:00:00.000Z");
    assert_eq!(q["maxResults"], "5");
    assert_eq!(q["singleEvents"], "true");
    assert_eq!(q["orderBy"], "startTime");
}

fn events_route(expected_bearer: &'static str) -> Router {
    Router::new().route(
        "/calendar/v3/calendars/primary/events",
        get(move |headers: HeaderMap| async move {
            let auth = headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            if auth != format!("Bearer {}", expected_bearer) {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": {"code": 401, "message": "Invalid Credentials"}})),
                );
            }
            let page: Value = serde_json::from_str(EVENTS_PAGE).unwrap();
            (StatusCode::OK, Json(page))
        }),
    )
}

#[tokio::test]
async fn test_calendar_uses_stored_token() {
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));
    store
        .save(&token("ya29.stored", 3600, "http://unused.invalid/token"))
        .await
        .unwrap();

    let base = serve(events_route("ya29.stored")).await;
    let auth = Authenticator::new(dir.path().join("credentials.json"), store, scopes());
    let client = GoogleCalendarClient::new(&base, auth);

    let events = client.upcoming(5).await.unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].title, "Standup");
}

#[tokio::test]
async fn test_calendar_refreshes_expired_token() {
    let dir = tempfile::tempdir().unwrap();
    let token_path = dir.path().join("token.json");

    let app = events_route("ya29.fresh").route(
        "/token",
        post(|Form(form): Form<HashMap<String, String>>| async move {
            if form.get("grant_type").map(String::as_str) != Some("refresh_token")
                || form.get("refresh_token").map(String::as_str) != Some("1//refresh-token-value")
            {
                return (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_grant"})));
            }
            (
                StatusCode::OK,
                Json(json!({
                    "access_token": "ya29.fresh",
                    "expires_in": 3599,
                    "scope": CALENDAR_READONLY_SCOPE,
                    "token_type": "Bearer"
                })),
            )
        }),
    );
    let base = serve(app).await;

    let store = TokenStore::new(&token_path);
    store
        .save(&token("ya29.old", -10, &format!("{}/token", base)))
        .await
        .unwrap();

    let auth = Authenticator::new(dir.path().join("credentials.json"), store.clone(), scopes());
    let client = GoogleCalendarClient::new(&base, auth);
    let events = client.upcoming(5).await.unwrap();
    assert_eq!(events.len(), 3);

    let saved = store.load().await.unwrap().unwrap();
    assert_eq!(saved.token, "ya29.fresh");
    assert_eq!(saved.refresh_token.as_deref(), Some("1//refresh-token-value"));
    assert!(saved.is_valid(Utc::now()));
}

#[tokio::test]
async fn test_calendar_without_token_or_secrets_fails() {
    let dir = tempfile::tempdir().unwrap();
    let auth = Authenticator::new(
        dir.path().join("credentials.json"),
        TokenStore::new(dir.path().join("token.json")),
        scopes(),
    );
    let client = GoogleCalendarClient::new("http://unused.invalid", auth);
    let err = client.upcoming(5).await.unwrap_err();
    assert!(matches!(err, FeedError::MissingSecrets(_)));
}

#[tokio::test]
async fn test_calendar_api_error_message() {
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));
    store
        .save(&token("ya29.revoked", 3600, "http://unused.invalid/token"))
        .await
        .unwrap();

    let base = serve(events_route("ya29.other")).await;
    let auth = Authenticator::new(dir.path().join("credentials.json"), store, scopes());
    let client = GoogleCalendarClient::new(&base, auth);

    let err = client.upcoming(5).await.unwrap_err();
    assert_eq!(err.to_string(), "calendar service returned 401: Invalid Credentials");
}

// ============================================================================
// Token Tests
// ============================================================================

#[test]
fn test_token_validity_window() {
    let uri = "https://oauth2.googleapis.com/token";
    assert!(token("a", 7200, uri).is_valid(Utc::now()));
    // Inside the 60s skew counts as expired.
    assert!(!token("a", 30, uri).is_valid(Utc::now()));
    assert!(!token("a", -100, uri).is_valid(Utc::now()));
    assert!(!token("", 7200, uri).is_valid(Utc::now()));

    let mut no_expiry = token("a", 0, uri);
    no_expiry.expiry = None;
    assert!(no_expiry.is_valid(Utc::now()));
}

#[test]
fn test_token_scope_coverage() {
    let t = token("a", 3600, "u");
    assert!(t.covers(&scopes()));
    assert!(!t.covers(&["https://www.googleapis.com/auth/calendar".to_string()]));
}

#[test]
fn test_token_can_refresh() {
    let mut t = token("a", 3600, "u");
    assert!(t.can_refresh());
    t.refresh_token = Some(String::new());
    assert!(!t.can_refresh());
    t.refresh_token = None;
    assert!(!t.can_refresh());
}

#[test]
fn test_token_reads_authorized_user_layout() {
    let raw = r#"{
        "token": "ya29.abc",
        "refresh_token": "1//xyz",
        "token_uri": "https://oauth2.googleapis.com/token",
        "client_id": "id.apps.googleusercontent.com",
        "client_secret": "secret",
        "scopes": ["https://www.googleapis.com/auth/calendar.readonly"],
        "universe_domain": "googleapis.com",
        "account": "",
        "expiry": "2026-10-16T12:00:00.123456Z"
    }"#;
    let t: StoredToken = serde_json::from_str(raw).unwrap();
    assert_eq!(t.token, "ya29.abc");
    assert!(t.covers(&scopes()));
    assert_eq!(
        t.expiry.unwrap().timestamp(),
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap().timestamp()
    );
}

#[test]
fn test_token_response_into_stored() {
    let now = Utc::now();
    let reply: TokenResponse = serde_json::from_value(json!({
        "access_token": "ya29.new",
        "expires_in": 3599,
        "refresh_token": "1//new",
        "scope": CALENDAR_READONLY_SCOPE,
        "token_type": "Bearer"
    }))
    .unwrap();

    let stored = reply.into_stored(&secrets(), &scopes(), now);
    assert_eq!(stored.token, "ya29.new");
    assert_eq!(stored.refresh_token.as_deref(), Some("1//new"));
    assert_eq!(stored.client_id, "abc.apps.googleusercontent.com");
    assert_eq!(stored.token_uri, "https://oauth2.googleapis.com/token");
    assert_eq!(stored.expiry, Some(now + TimeDelta::seconds(3599)));
    assert_eq!(stored.scopes, scopes());
}

#[test]
fn test_token_response_refresh_keeps_refresh_token() {
    let previous = token("ya29.old", -5, "https://oauth2.googleapis.com/token");
    let reply: TokenResponse =
        serde_json::from_value(json!({"access_token": "ya29.next", "expires_in": 100})).unwrap();

    let next = reply.refreshed(&previous, Utc::now());
    assert_eq!(next.token, "ya29.next");
    assert_eq!(next.refresh_token, previous.refresh_token);
    assert_eq!(next.scopes, previous.scopes);
    assert_eq!(next.client_secret, "client-secret");
}

#[tokio::test]
async fn test_token_store_roundtrip_creates_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("nested").join("token.json"));
    assert_eq!(store.load().await.unwrap(), None);

    let t = token("ya29.x", 3600, "u");
    store.save(&t).await.unwrap();
    assert_eq!(store.load().await.unwrap(), Some(t));
}

#[tokio::test]
async fn test_token_store_ignores_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.json");
    std::fs::write(&path, "not json").unwrap();
    assert_eq!(TokenStore::new(&path).load().await.unwrap(), None);
}

// ============================================================================
// Client Secrets Tests
// ============================================================================

#[test]
fn test_secrets_installed() {
    let s = secrets();
    assert_eq!(s.client_id, "abc.apps.googleusercontent.com");
    assert_eq!(s.client_secret, "shh");
}

#[test]
fn test_secrets_web_with_defaults() {
    let s = ClientSecrets::parse(r#"{"web":{"client_id":"w"}}"#).unwrap();
    assert_eq!(s.client_id, "w");
    assert_eq!(s.auth_uri, "https://accounts.google.com/o/oauth2/auth");
    assert_eq!(s.token_uri, "https://oauth2.googleapis.com/token");
}

#[test]
fn test_secrets_missing_section() {
    assert!(matches!(
        ClientSecrets::parse(r#"{"other":{}}"#),
        Err(FeedError::Parse(_))
    ));
}

#[tokio::test]
async fn test_secrets_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ClientSecrets::load(&dir.path().join("credentials.json"))
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::MissingSecrets(_)));
}

// ============================================================================
// PKCE / Consent URL Tests
// ============================================================================

#[test]
fn test_pkce_rfc7636_vector() {
    let pkce = Pkce::from_verifier("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
    assert_eq!(pkce.challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
}

#[test]
fn test_pkce_generate_shape() {
    let a = Pkce::generate();
    let b = Pkce::generate();
    assert_eq!(a.verifier.len(), 64);
    assert_eq!(a.challenge.len(), 43);
    assert_ne!(a.verifier, b.verifier);
}

#[test]
fn test_consent_url() {
    let pkce = Pkce::from_verifier("v".repeat(43));
    let url = consent_url(&secrets(), "http://127.0.0.1:5555/", &scopes(), "st4te", &pkce).unwrap();
    assert!(url.as_str().starts_with("https://accounts.google.com/o/oauth2/auth?"));

    let q: HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert_eq!(q["response_type"], "code");
    assert_eq!(q["client_id"], "abc.apps.googleusercontent.com");
    assert_eq!(q["redirect_uri"], "http://127.0.0.1:5555/");
    assert_eq!(q["scope"], CALENDAR_READONLY_SCOPE);
    assert_eq!(q["state"], "st4te");
    assert_eq!(q["code_challenge"], pkce.challenge);
    assert_eq!(q["code_challenge_method"], "S256");
    assert_eq!(q["access_type"], "offline");
}

// ============================================================================
// Callback Listener Tests
// ============================================================================

#[tokio::test]
async fn test_callback_receives_code() {
    let listener = CallbackListener::bind().await.unwrap();
    let uri = listener.redirect_uri();
    assert!(uri.starts_with("http://127.0.0.1:"));

    let resp = reqwest::get(format!("{}?code=4%2F0abc&state=xyz", uri))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    assert_eq!(
        listener.wait().await.unwrap(),
        CallbackResult::Code {
            code: "4/0abc".to_string(),
            state: Some("xyz".to_string()),
        }
    );
}

#[tokio::test]
async fn test_callback_reports_denial() {
    let listener = CallbackListener::bind().await.unwrap();
    let uri = listener.redirect_uri();

    reqwest::get(format!("{}?error=access_denied&state=xyz", uri))
        .await
        .unwrap();

    assert_eq!(
        listener.wait().await.unwrap(),
        CallbackResult::Denied {
            error: "access_denied".to_string(),
            description: None,
        }
    );
}

#[tokio::test]
async fn test_callback_ignores_requests_without_code() {
    let listener = CallbackListener::bind().await.unwrap();
    let uri = listener.redirect_uri();

    let resp = reqwest::get(uri.clone()).await.unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    reqwest::get(format!("{}?code=later", uri)).await.unwrap();
    assert!(matches!(
        listener.wait().await.unwrap(),
        CallbackResult::Code { code, state: None } if code == "later"
    ));
}

#[tokio::test]
async fn test_callback_times_out_when_abandoned() {
    let listener = CallbackListener::bind().await.unwrap();
    let uri = listener.redirect_uri();

    let err = listener.wait_for(Duration::from_millis(50)).await.unwrap_err();
    assert!(matches!(err, FeedError::Auth(ref m) if m.contains("no response")));

    // The listener stops serving once the wait gives up.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(reqwest::get(format!("{}?code=late", uri)).await.is_err());
}

#[test]
fn test_accept_callback_matching_state() {
    let result = CallbackResult::Code {
        code: "4/0abc".to_string(),
        state: Some("st4te".to_string()),
    };
    assert_eq!(accept_callback(result, "st4te").unwrap(), "4/0abc");
}

#[test]
fn test_accept_callback_rejects_mismatched_state() {
    let result = CallbackResult::Code {
        code: "4/0abc".to_string(),
        state: Some("forged".to_string()),
    };
    assert!(matches!(
        accept_callback(result, "st4te"),
        Err(FeedError::Auth(ref m)) if m.contains("state mismatch")
    ));
}

#[test]
fn test_accept_callback_rejects_missing_state() {
    let result = CallbackResult::Code {
        code: "4/0abc".to_string(),
        state: None,
    };
    assert!(matches!(accept_callback(result, "st4te"), Err(FeedError::Auth(_))));
}

#[test]
fn test_accept_callback_reports_denial_reason() {
    let result = CallbackResult::Denied {
        error: "access_denied".to_string(),
        description: Some("The user denied access".to_string()),
    };
    match accept_callback(result, "st4te") {
        Err(FeedError::Auth(msg)) => assert_eq!(msg, "access_denied: The user denied access"),
        other => panic!("unexpected result: {:?}", other),
    }

    let bare = CallbackResult::Denied {
        error: "access_denied".to_string(),
        description: None,
    };
    assert!(matches!(
        accept_callback(bare, "st4te"),
        Err(FeedError::Auth(ref m)) if m == "access_denied"
    ));
}

// ============================================================================
// FeedHub Tests
// ============================================================================

struct FixedWeather(Result<WeatherReport, String>);

#[async_trait]
impl WeatherSource for FixedWeather {
    async fn current(&self) -> Result<WeatherReport, FeedError> {
        self.0.clone().map_err(FeedError::Auth)
    }
}

struct FixedCalendar(Vec<CalendarEvent>);

#[async_trait]
impl CalendarSource for FixedCalendar {
    async fn upcoming(&self, max: usize) -> Result<Vec<CalendarEvent>, FeedError> {
        Ok(self.0.iter().take(max).cloned().collect())
    }
}

fn hub(weather: Result<WeatherReport, String>, events: Vec<CalendarEvent>) -> FeedHub {
    FeedHub::new(
        tokio::runtime::Handle::current(),
        Arc::new(FixedWeather(weather)),
        Arc::new(FixedCalendar(events)),
    )
}

/// Poll the queue the way the render loop does until one update arrives.
async fn first_update(hub: &mut FeedHub) -> FeedUpdate {
    loop {
        if let Some(update) = hub.drain().into_iter().next() {
            return update;
        }
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_hub_delivers_weather_failure_as_text() {
    let mut hub = hub(Err("city not found".into()), Vec::new());
    hub.dispatch(FeedKind::Weather);

    assert_eq!(
        first_update(&mut hub).await,
        FeedUpdate::Weather(Err("authorization failed: city not found".to_string()))
    );
}

#[tokio::test]
async fn test_hub_redacts_errors() {
    let mut hub = hub(Err("bad url ?appid=SECRET".into()), Vec::new());
    hub.dispatch(FeedKind::Weather);

    match first_update(&mut hub).await {
        FeedUpdate::Weather(Err(msg)) => assert!(!msg.contains("SECRET")),
        other => panic!("unexpected update: {:?}", other),
    }
}

#[tokio::test]
async fn test_hub_caps_calendar_events() {
    let events: Vec<CalendarEvent> = (0..8)
        .map(|i| CalendarEvent {
            start: format!("2026-10-{:02}", 17 + i),
            title: format!("E{}", i),
        })
        .collect();
    let mut hub = hub(Err("unused".into()), events);
    hub.dispatch(FeedKind::Calendar);

    match first_update(&mut hub).await {
        FeedUpdate::Calendar(Ok(got)) => assert_eq!(got.len(), 5),
        other => panic!("unexpected update: {:?}", other),
    }
}

#[tokio::test]
async fn test_hub_drain_is_non_blocking() {
    let report = WeatherReport {
        location: "X".into(),
        description: "clear sky".into(),
        temperature_f: 70.0,
    };
    let mut hub = hub(Ok(report.clone()), Vec::new());
    assert!(hub.drain().is_empty());

    hub.dispatch(FeedKind::Weather);
    hub.dispatch(FeedKind::Calendar);

    let mut got = Vec::new();
    while got.len() < 2 {
        got.extend(hub.drain());
        tokio::task::yield_now().await;
    }
    assert!(got.contains(&FeedUpdate::Weather(Ok(report))));
    assert!(got.contains(&FeedUpdate::Calendar(Ok(Vec::new()))));
}
