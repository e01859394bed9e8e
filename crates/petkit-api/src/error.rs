use thiserror::Error;

/// Vendor error codes carried in the `{"error": {"code": N, "msg": "..."}}` body.
pub mod codes {
    /// The server is overloaded; the request may be retried later by the caller.
    pub const SERVER_BUSY: i64 = 1;
    /// The session token is no longer accepted.
    pub const SESSION_EXPIRED: i64 = 5;
    /// Wrong username or password.
    pub const BAD_CREDENTIALS: i64 = 122;
    /// The account does not exist in the selected region.
    pub const UNREGISTERED_ACCOUNT: i64 = 125;
}

/// Top-level error type for the `petkit-api` crate.
///
/// Covers every failure mode of the vendor API surface: region
/// resolution, authentication, transport, and the vendor's own error
/// envelope. `petkit-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong credentials, unregistered account).
    #[error("Authentication failed (code {code}): {message}")]
    Authentication { code: i64, message: String },

    /// Session token expired or revoked server-side.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    /// An operation needed a session (or a bound region) and none exists.
    #[error("Not logged in")]
    NotLoggedIn,

    /// The configured region matched nothing in the region directory.
    #[error("Region not found: {region}")]
    RegionNotFound { region: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Network failure (connect, DNS, timeout, reset) after retries.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status (4xx immediately, 5xx after retries).
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A configured header value contains characters HTTP does not allow.
    #[error("Invalid header value for {name}")]
    InvalidHeader { name: &'static str },

    /// Request body could not be cloned for a retry attempt.
    #[error("Request body cannot be replayed")]
    NotReplayable,

    // ── Vendor API ──────────────────────────────────────────────────
    /// Vendor reported code 1: server busy.
    #[error("Server busy -- try again later")]
    ServerBusy,

    /// Any vendor error code without a dedicated variant.
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Map a vendor error code from the response envelope to a typed error.
    pub fn from_vendor(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            codes::SERVER_BUSY => Self::ServerBusy,
            codes::SESSION_EXPIRED => Self::SessionExpired,
            codes::BAD_CREDENTIALS | codes::UNREGISTERED_ACCOUNT => {
                Self::Authentication { code, message }
            }
            _ => Self::Api { code, message },
        }
    }

    /// Returns `true` if the credentials themselves were rejected.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if the account is not registered in the region.
    pub fn is_unregistered_account(&self) -> bool {
        matches!(
            self,
            Self::Authentication {
                code: codes::UNREGISTERED_ACCOUNT,
                ..
            }
        )
    }

    /// Returns `true` if this is a transient network error.
    ///
    /// Only meaningful before retries are applied; once surfaced from the
    /// transport the retry budget is already spent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => crate::transport::is_retryable(e),
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Extract the vendor error code, if available.
    pub fn api_error_code(&self) -> Option<i64> {
        match self {
            Self::Authentication { code, .. } | Self::Api { code, .. } => Some(*code),
            Self::ServerBusy => Some(codes::SERVER_BUSY),
            Self::SessionExpired => Some(codes::SESSION_EXPIRED),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_codes_map_to_variants() {
        assert!(matches!(
            Error::from_vendor(122, "bad password"),
            Error::Authentication { code: 122, .. }
        ));
        assert!(matches!(
            Error::from_vendor(5, "expired"),
            Error::SessionExpired
        ));
        assert!(matches!(Error::from_vendor(1, "busy"), Error::ServerBusy));
        assert!(matches!(
            Error::from_vendor(42, "odd"),
            Error::Api { code: 42, .. }
        ));
    }

    #[test]
    fn unregistered_account_is_an_auth_failure() {
        let err = Error::from_vendor(codes::UNREGISTERED_ACCOUNT, "no such user");
        assert!(err.is_auth_failure());
        assert!(err.is_unregistered_account());
        assert_eq!(err.api_error_code(), Some(125));
    }

    #[test]
    fn client_errors_are_not_transient() {
        let err = Error::Http {
            status: 404,
            body: String::new(),
        };
        assert!(!err.is_transient());
        let err = Error::Http {
            status: 503,
            body: String::new(),
        };
        assert!(err.is_transient());
    }
}
