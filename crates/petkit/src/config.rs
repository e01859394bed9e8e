//! CLI configuration: thin wrapper around `petkit_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--username, --region, --timeout).

use std::time::Duration;

use petkit_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use petkit_config::{
    Config, Profile, config_path, load_config_or_default, save_config, store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `ClientConfig` from the config file, profile, and CLI overrides.
///
/// Without a stored profile the flags and `PETKIT_*` variables alone must
/// supply the username; the password then comes from the env/keyring chain.
pub fn build_client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = cfg.profiles.get(&profile_name).cloned().unwrap_or_default();
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if let Some(ref region) = global.region {
        profile.region = Some(region.clone());
    }

    let mut client = petkit_config::profile_to_client_config(&profile, &profile_name)?;
    client.timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(cfg.defaults.timeout),
    );
    Ok(client)
}
