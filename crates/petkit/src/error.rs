//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use petkit_config::ConfigError;
use petkit_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the PetKit cloud: {reason}")]
    #[diagnostic(
        code(petkit::connection_failed),
        help("Check your network connection. Retry later if the servers are busy.")
    )]
    ConnectionFailed { reason: String },

    #[error("Region '{region}' is not served by PetKit")]
    #[diagnostic(
        code(petkit::region_not_found),
        help("Use the country name or id shown in the mobile app, or CN for mainland China.")
    )]
    RegionNotFound { region: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(petkit::auth_failed),
        help(
            "Verify your username, password and region.\n\
             Run: petkit config set-password --profile {profile}"
        )
    )]
    AuthFailed { message: String, profile: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(petkit::no_credentials),
        help(
            "Add a profile with: petkit config add <name> --username <email>\n\
             Or set PETKIT_USERNAME and PETKIT_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Devices ──────────────────────────────────────────────────────
    #[error("Device {id} not found")]
    #[diagnostic(
        code(petkit::not_found),
        help("Run: petkit devices list to see available devices")
    )]
    NotFound { id: i64 },

    #[error("{message}")]
    #[diagnostic(
        code(petkit::unsupported),
        help("Run: petkit actions {device_type} to see what this device accepts")
    )]
    Unsupported {
        message: String,
        device_type: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(petkit::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(petkit::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(petkit::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: petkit config add {name} --username <email>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(petkit::config))]
    Config(ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(petkit::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::RegionNotFound { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Unsupported { .. } => exit_code::UNSUPPORTED,
            Self::Validation { .. } | Self::Json(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Transport { reason, .. } => CliError::ConnectionFailed { reason },

            CoreError::ServerBusy => CliError::ConnectionFailed {
                reason: "servers are busy".into(),
            },

            CoreError::RegionNotFound { region } => CliError::RegionNotFound { region },

            CoreError::AuthenticationFailed { message, .. } => CliError::AuthFailed {
                message,
                profile: "current".into(),
            },

            CoreError::SessionExpired => CliError::AuthFailed {
                message: "session expired".into(),
                profile: "current".into(),
            },

            CoreError::DeviceNotFound { device_id } => CliError::NotFound { id: device_id },

            err @ (CoreError::DeviceInfoMissing { .. } | CoreError::WrongDeviceKind { .. }) => {
                CliError::Validation {
                    field: "device".into(),
                    reason: err.to_string(),
                }
            }

            CoreError::UnsupportedAction {
                ref device_type, ..
            } => CliError::Unsupported {
                device_type: device_type.clone(),
                message: err.to_string(),
            },

            CoreError::Command { source, .. } => CliError::from(*source),

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { code, message } => CliError::ApiError {
                code: code.to_string(),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}
