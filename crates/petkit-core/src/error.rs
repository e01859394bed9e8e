// ── Core error types ──
//
// User-facing errors from petkit-core. Consumers never see raw HTTP
// statuses or JSON parse failures directly; the `From<petkit_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

use crate::model::DeviceId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach PetKit cloud: {reason}")]
    Transport { reason: String, status: Option<u16> },

    #[error("Region not found: {region}")]
    RegionNotFound { region: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        message: String,
        /// Vendor error code (122 bad credentials, 125 unregistered account).
        code: Option<i64>,
    },

    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    #[error("PetKit servers are busy -- try again later")]
    ServerBusy,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {device_id}")]
    DeviceNotFound { device_id: DeviceId },

    #[error("Device {device_id} has no detail information yet")]
    DeviceInfoMissing { device_id: DeviceId },

    #[error("Device {device_id} is a {actual}, not a {expected}")]
    WrongDeviceKind {
        device_id: DeviceId,
        expected: &'static str,
        actual: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error(
        "Action '{action}' is not supported for device type '{device_type}' (supported types: {allowed:?})"
    )]
    UnsupportedAction {
        action: String,
        device_type: String,
        /// Empty when the action name itself is unknown.
        allowed: Vec<String>,
    },

    #[error("Command '{action}' failed for device {device_id}: {source}")]
    Command {
        action: String,
        device_id: DeviceId,
        #[source]
        source: Box<CoreError>,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The innermost error of a `Command` chain.
    pub fn root(&self) -> &CoreError {
        match self {
            Self::Command { source, .. } => source.root(),
            other => other,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<petkit_api::Error> for CoreError {
    fn from(err: petkit_api::Error) -> Self {
        use petkit_api::Error as Api;
        match err {
            Api::Authentication { code, message } => CoreError::AuthenticationFailed {
                message,
                code: Some(code),
            },
            Api::NotLoggedIn => CoreError::AuthenticationFailed {
                message: "not logged in".into(),
                code: None,
            },
            Api::SessionExpired => CoreError::SessionExpired,
            Api::ServerBusy => CoreError::ServerBusy,
            Api::RegionNotFound { region } => CoreError::RegionNotFound { region },
            Api::Transport(e) => CoreError::Transport {
                reason: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            Api::Http { status, body } => CoreError::Transport {
                reason: format!("HTTP {status}: {body}"),
                status: Some(status),
            },
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::InvalidHeader { name } => CoreError::Config {
                message: format!("Invalid header value for {name}"),
            },
            Api::Api { code, message } => CoreError::Api { code, message },
            Api::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            Api::NotReplayable => CoreError::Internal("request body cannot be replayed".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_auth_codes_become_authentication_failed() {
        let err = CoreError::from(petkit_api::Error::from_vendor(125, "unregistered"));
        assert!(matches!(
            err,
            CoreError::AuthenticationFailed { code: Some(125), .. }
        ));
    }

    #[test]
    fn unmapped_vendor_code_keeps_its_number() {
        let err = CoreError::from(petkit_api::Error::from_vendor(77, "odd"));
        assert!(matches!(err, CoreError::Api { code: 77, .. }));
    }

    #[test]
    fn command_root_unwraps_nested_source() {
        let err = CoreError::Command {
            action: "clean".into(),
            device_id: 5,
            source: Box::new(CoreError::ServerBusy),
        };
        assert!(matches!(err.root(), CoreError::ServerBusy));
        assert!(err.to_string().contains("clean"));
    }

    #[test]
    fn unsupported_message_lists_allowed_types() {
        let err = CoreError::UnsupportedAction {
            action: "call_pet".into(),
            device_type: "t4".into(),
            allowed: vec!["d3".into()],
        };
        assert_eq!(
            err.to_string(),
            "Action 'call_pet' is not supported for device type 't4' (supported types: [\"d3\"])"
        );
    }
}
