// Shared transport: client construction, fixed headers, logging, retry.
//
// Every request to the vendor goes through `Transport::execute`, which
// logs a redacted view of the request, retries transient failures with
// capped exponential backoff, and turns non-success statuses into errors.

use std::time::Duration;

use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, warn};

use crate::error::Error;

/// API version the mobile app currently reports.
pub const DEFAULT_API_VERSION: &str = "12.4.1";
/// Client fingerprint sent in `X-Client`.
pub const DEFAULT_CLIENT: &str = "android(14;Pixel 8)";
/// User agent of the mobile app's HTTP stack.
pub const DEFAULT_USER_AGENT: &str = "okhttp/3.14.9";
/// Image pipeline version header.
const IMG_VERSION: &str = "1.0";

/// Headers that carry the session token (both, per vendor quirk).
pub const SESSION_HEADERS: [&str; 2] = ["X-Session", "F-Session"];

/// How many leading characters of a token survive redaction.
const TOKEN_PREVIEW_CHARS: usize = 8;

// ── Retry policy ─────────────────────────────────────────────────────

/// Bounded exponential backoff for transient failures.
///
/// `delay(n) = min(base * 2^(n-1), max)` for retry `n` (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. The failure after the last retry propagates.
    pub max_retries: u32,
    /// Delay before the first retry. Default: 1s.
    pub base_delay: Duration,
    /// Upper bound on any single delay. Default: 16s.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(16),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2_u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Every delay this policy will sleep through, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        (1..=self.max_retries).map(|n| self.delay_for(n)).collect()
    }
}

// ── Transport configuration ──────────────────────────────────────────

/// Fixed per-instance request settings.
///
/// The header values are baked into the `reqwest::Client` once and never
/// change over the client's lifetime.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub api_version: String,
    pub client: String,
    pub locale: String,
    /// UTC offset in hours, formatted the way the app sends it (`"2.0"`).
    pub timezone: String,
    /// IANA zone name.
    pub timezone_id: String,
    pub user_agent: String,
    pub retry: RetryPolicy,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            api_version: DEFAULT_API_VERSION.into(),
            client: DEFAULT_CLIENT.into(),
            locale: "en-US".into(),
            timezone: crate::auth::utc_offset_hours(),
            timezone_id: "UTC".into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            retry: RetryPolicy::default(),
        }
    }
}

impl TransportConfig {
    /// The fixed header set attached to every request.
    pub fn default_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        let fixed: [(&'static str, &str); 6] = [
            ("x-api-version", &self.api_version),
            ("x-client", &self.client),
            ("x-locale", &self.locale),
            ("x-timezone", &self.timezone),
            ("x-timezoneid", &self.timezone_id),
            ("x-img-version", IMG_VERSION),
        ];
        for (name, value) in fixed {
            let value = HeaderValue::from_str(value).map_err(|_| Error::InvalidHeader { name })?;
            headers.insert(HeaderName::from_static(name), value);
        }
        let lang = HeaderValue::from_str(&self.locale).map_err(|_| Error::InvalidHeader {
            name: "Accept-Language",
        })?;
        headers.insert(ACCEPT_LANGUAGE, lang);
        Ok(headers)
    }

    /// Build a `reqwest::Client` carrying the fixed headers.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let headers = self.default_headers()?;
        debug!(
            api_version = %self.api_version,
            client = %self.client,
            locale = %self.locale,
            timezone = %self.timezone,
            "building HTTP client"
        );
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)
    }
}

// ── Transport ────────────────────────────────────────────────────────

/// Configured request pipeline: logging, retry, status handling.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl Transport {
    /// Build a transport from a `TransportConfig`.
    pub fn new(config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: config.build_client()?,
            retry: config.retry.clone(),
        })
    }

    /// Wrap a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, retry: RetryPolicy) -> Self {
        Self { http, retry }
    }

    /// The underlying HTTP client, for building requests.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Execute a request, retrying transient failures.
    ///
    /// Connect/DNS errors, timeouts, connection resets, and 5xx statuses
    /// are retried per the policy. 4xx statuses and anything else
    /// propagate immediately.
    pub async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response, Error> {
        let mut retry: u32 = 0;

        loop {
            let attempt = request.try_clone().ok_or(Error::NotReplayable)?;
            log_request(&attempt, retry);

            match self.http.execute(attempt).await {
                Ok(resp) => {
                    let status = resp.status();
                    debug!(
                        status = status.as_u16(),
                        size = resp.content_length().unwrap_or(0),
                        url = %resp.url(),
                        "response"
                    );

                    if status.is_success() {
                        return Ok(resp);
                    }
                    if status.is_server_error() && retry < self.retry.max_retries {
                        retry += 1;
                        self.backoff(retry, &format!("HTTP {status}")).await;
                        continue;
                    }

                    let body = resp.text().await.unwrap_or_default();
                    return Err(Error::Http {
                        status: status.as_u16(),
                        body: preview(&body).to_owned(),
                    });
                }
                Err(e) => {
                    if is_retryable(&e) && retry < self.retry.max_retries {
                        retry += 1;
                        self.backoff(retry, &e.to_string()).await;
                        continue;
                    }
                    warn!(error = %e, url = ?e.url().map(reqwest::Url::as_str), "request failed");
                    return Err(Error::Transport(e));
                }
            }
        }
    }

    async fn backoff(&self, retry: u32, reason: &str) {
        let delay = self.retry.delay_for(retry);
        warn!(
            retry,
            max_retries = self.retry.max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            reason,
            "transient failure, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

/// Whether a network-level error is worth another attempt.
pub(crate) fn is_retryable(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || is_connection_reset(err)
}

fn is_connection_reset(err: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionReset {
                return true;
            }
        }
        source = inner.source();
    }
    false
}

// ── Redaction ────────────────────────────────────────────────────────

/// Keep only the first few characters of a token.
pub fn redact_token(token: &str) -> String {
    let head: String = token.chars().take(TOKEN_PREVIEW_CHARS).collect();
    format!("{head}...")
}

/// Mask credential-bearing fields in a form-encoded body.
pub fn redact_form(body: &str) -> String {
    body.split('&')
        .map(|pair| match pair.split_once('=') {
            Some(("password", _)) => "password=***".to_owned(),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn redacted_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = value.to_str().unwrap_or("<binary>");
            let shown = if SESSION_HEADERS
                .iter()
                .any(|h| name.as_str().eq_ignore_ascii_case(h))
            {
                redact_token(value)
            } else {
                value.to_owned()
            };
            (name.as_str().to_owned(), shown)
        })
        .collect()
}

fn log_request(request: &reqwest::Request, retry: u32) {
    let body = request
        .body()
        .and_then(reqwest::Body::as_bytes)
        .map(|b| redact_form(&String::from_utf8_lossy(b)))
        .unwrap_or_default();
    debug!(
        method = %request.method(),
        url = %request.url(),
        headers = ?redacted_headers(request.headers()),
        body = %body,
        retry,
        "request"
    );
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_schedule_doubles_then_caps() {
        let schedule: Vec<u128> = RetryPolicy::default()
            .schedule()
            .iter()
            .map(Duration::as_millis)
            .collect();
        assert_eq!(schedule, vec![1000, 2000, 4000, 8000, 16000]);
    }

    #[test]
    fn delay_stays_capped_past_the_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(6), Duration::from_secs(16));
        assert_eq!(policy.delay_for(40), Duration::from_secs(16));
    }

    #[test]
    fn none_policy_has_empty_schedule() {
        assert!(RetryPolicy::none().schedule().is_empty());
    }

    #[test]
    fn token_keeps_eight_chars() {
        assert_eq!(redact_token("abcdefghijklmnop"), "abcdefgh...");
        assert_eq!(redact_token("abc"), "abc...");
    }

    #[test]
    fn password_field_is_masked() {
        let body = "username=me%40example.com&password=5f4dcc3b&encrypt=1";
        assert_eq!(
            redact_form(body),
            "username=me%40example.com&password=***&encrypt=1"
        );
    }

    #[test]
    fn session_headers_are_redacted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-session", HeaderValue::from_static("0123456789abcdef"));
        headers.insert("x-locale", HeaderValue::from_static("en-US"));
        let shown = redacted_headers(&headers);
        assert!(shown.contains(&("x-session".to_owned(), "01234567...".to_owned())));
        assert!(shown.contains(&("x-locale".to_owned(), "en-US".to_owned())));
    }

    #[test]
    fn fixed_headers_are_present() {
        let headers = TransportConfig::default().default_headers().unwrap();
        assert_eq!(headers["x-api-version"], DEFAULT_API_VERSION);
        assert_eq!(headers["x-client"], DEFAULT_CLIENT);
        assert_eq!(headers[ACCEPT_LANGUAGE], "en-US");
    }
}
