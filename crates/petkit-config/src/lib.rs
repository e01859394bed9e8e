//! Shared configuration for PetKit tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `petkit_core::ClientConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use petkit_core::ClientConfig;
use petkit_core::config::DEFAULT_REGION;

/// Keyring service name for stored passwords.
pub const KEYRING_SERVICE: &str = "petkit";

/// Environment variable consulted when a profile names none.
pub const PASSWORD_ENV: &str = "PETKIT_PASSWORD";
pub const USERNAME_ENV: &str = "PETKIT_USERNAME";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in config")]
    ProfileNotFound { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());
        self.profiles
            .get(&name)
            .map(|p| (name.clone(), p))
            .ok_or(ConfigError::ProfileNotFound { name })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named PetKit account.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Account email or phone number.
    pub username: Option<String>,

    /// Password (plaintext, prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Region name or id as shown in the app ("US", "Germany", "CN").
    pub region: Option<String>,

    /// IANA zone name.
    pub timezone: Option<String>,

    pub locale: Option<String>,

    /// Override the passport host (directory and login for foreign regions).
    pub passport_url: Option<String>,

    /// Override the domestic gateway.
    pub domestic_gateway: Option<String>,

    /// Override timeout in seconds.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "petkit", "petkit").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("petkit");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PETKIT_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Store a password in the system keyring for `profile_name`.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

pub fn resolve_username(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    profile
        .username
        .clone()
        .or_else(|| std::env::var(USERNAME_ENV).ok())
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Resolve the account password: env var, then keyring, then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Env var
    let env_name = profile.password_env.as_deref().unwrap_or(PASSWORD_ENV);
    if let Ok(pw) = std::env::var(env_name) {
        return Ok(SecretString::from(pw));
    }

    // 2. Keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

fn check_url(field: &str, value: Option<&String>) -> Result<(), ConfigError> {
    if let Some(raw) = value {
        raw.parse::<url::Url>()
            .map_err(|e| ConfigError::Validation {
                field: field.into(),
                reason: format!("invalid URL '{raw}': {e}"),
            })?;
    }
    Ok(())
}

/// Build a `ClientConfig` from a profile.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ClientConfig, ConfigError> {
    check_url("passport_url", profile.passport_url.as_ref())?;
    check_url("domestic_gateway", profile.domestic_gateway.as_ref())?;

    let username = resolve_username(profile, profile_name)?;
    let password = resolve_password(profile, profile_name)?;

    let mut config = ClientConfig::new(username, password)
        .with_region(profile.region.as_deref().unwrap_or(DEFAULT_REGION));
    config.timezone.clone_from(&profile.timezone);
    if let Some(ref locale) = profile.locale {
        config.locale.clone_from(locale);
    }
    config.passport_url.clone_from(&profile.passport_url);
    config.domestic_gateway.clone_from(&profile.domestic_gateway);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout));
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    const SAMPLE: &str = r#"
default_profile = "home"

[defaults]
output = "json"

[profiles.home]
username = "owner@example.com"
password = "hunter2"
password_env = "PETKIT_TEST_UNSET_PASSWORD_VAR"
region = "DE"
timezone = "Europe/Berlin"
timeout = 10
"#;

    fn write_sample(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn loads_profiles_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&write_sample(&dir)).unwrap();
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.timeout, 30);

        let (name, profile) = cfg.profile(None).unwrap();
        assert_eq!(name, "home");
        assert_eq!(profile.region.as_deref(), Some("DE"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert!(matches!(
            cfg.profile(None),
            Err(ConfigError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                username: Some("a@b.c".into()),
                region: Some("US".into()),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let (_, profile) = loaded.profile(Some("default")).unwrap();
        assert_eq!(profile.username.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn profile_converts_to_client_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&write_sample(&dir)).unwrap();
        let (name, profile) = cfg.profile(Some("home")).unwrap();

        let client = profile_to_client_config(profile, &format!("test-{name}-convert")).unwrap();
        assert_eq!(client.username, "owner@example.com");
        assert_eq!(client.region, "DE");
        assert_eq!(client.timezone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(client.timeout, Duration::from_secs(10));
        assert_eq!(client.password.expose_secret(), "hunter2");
    }

    #[test]
    fn region_defaults_to_us() {
        let profile = Profile {
            username: Some("a@b.c".into()),
            password: Some("pw".into()),
            password_env: Some("PETKIT_TEST_UNSET_PASSWORD_VAR".into()),
            ..Profile::default()
        };
        let client = profile_to_client_config(&profile, "test-region-default").unwrap();
        assert_eq!(client.region, "US");
    }

    #[test]
    fn bad_override_url_is_rejected() {
        let profile = Profile {
            username: Some("a@b.c".into()),
            password: Some("pw".into()),
            passport_url: Some("not a url".into()),
            ..Profile::default()
        };
        let err = profile_to_client_config(&profile, "test-bad-url").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "passport_url"));
    }

    #[test]
    fn missing_password_is_reported() {
        let profile = Profile {
            username: Some("a@b.c".into()),
            password_env: Some("PETKIT_TEST_UNSET_PASSWORD_VAR".into()),
            ..Profile::default()
        };
        let err = resolve_password(&profile, "test-no-password").unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { .. }));
    }
}
