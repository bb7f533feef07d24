use regex::Regex;
use std::sync::OnceLock;

/// Scrub credentials out of text before it is logged or drawn on the HUD.
pub struct Redactor;

static QUERY_SECRET_REGEX: OnceLock<Regex> = OnceLock::new();
static BEARER_REGEX: OnceLock<Regex> = OnceLock::new();
static GOOGLE_TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();

impl Redactor {
    pub fn scrub(input: &str) -> String {
        let mut scrubbed = input.to_string();

        // 1. Secrets carried in query strings (appid=..., access_token=..., code=...)
        let query_re = QUERY_SECRET_REGEX.get_or_init(|| {
            Regex::new(r"(?i)\b(appid|api_key|access_token|refresh_token|client_secret|code)=[^&\s)]+")
                .expect("Invalid query secret Regex")
        });
        scrubbed = query_re.replace_all(&scrubbed, "$1=[REDACTED]").to_string();

        // 2. Authorization headers
        let bearer_re = BEARER_REGEX.get_or_init(|| {
            Regex::new(r"(?i)\bbearer\s+[A-Za-z0-9._~+/=-]+").expect("Invalid Bearer Regex")
        });
        scrubbed = bearer_re.replace_all(&scrubbed, "Bearer [REDACTED]").to_string();

        // 3. Bare Google access (ya29.) and refresh (1//) tokens
        let google_re = GOOGLE_TOKEN_REGEX.get_or_init(|| {
            Regex::new(r"(ya29\.[A-Za-z0-9._-]{10,}|1//[A-Za-z0-9._-]{10,})")
                .expect("Invalid Google token Regex")
        });
        scrubbed = google_re.replace_all(&scrubbed, "[REDACTED_TOKEN]").to_string();

        scrubbed
    }
}
