//! CLI configuration: thin wrapper around `dnsdeck_config`.
//!
//! Adds the resolution that respects `GlobalOpts` flag overrides
//! (--profile, --api-url, --insecure, --timeout).

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use dnsdeck_config::{ConfigError, profile_data_dir, profile_to_console_config};
use dnsdeck_core::{Console, ConsoleConfig, FileStorage, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use dnsdeck_config::{Config, config_path, load_config};

/// Resolve the active profile and translate it, plus flag overrides, into
/// a `ConsoleConfig`. Returns the profile name alongside.
pub fn resolve_console_config(global: &GlobalOpts) -> Result<(String, ConsoleConfig), CliError> {
    let cfg = load_config()?;
    let (name, profile) = cfg
        .profile(global.profile.as_deref())
        .map_err(|e| match e {
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: available_profiles(&cfg),
                path: config_path().display().to_string(),
            },
            other => other.into(),
        })?;

    let mut console = profile_to_console_config(&profile, &cfg.defaults)?;

    // Flags take priority over profile values.
    if let Some(ref url) = global.api_url {
        console.api_url = url.parse().map_err(|e| CliError::Validation {
            field: "api-url".into(),
            reason: format!("invalid URL '{url}': {e}"),
        })?;
    }
    if global.insecure {
        console.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        console.timeout = Duration::from_secs(secs);
    }

    Ok((name, console))
}

/// Build a `Console` whose session is persisted in the profile's data
/// directory.
pub fn build_console(global: &GlobalOpts) -> Result<(Console, String), CliError> {
    let (name, config) = resolve_console_config(global)?;
    let storage = FileStorage::new(profile_data_dir(&name));
    debug!(
        profile = %name,
        api_url = %config.api_url,
        data_dir = %storage.dir().display(),
        "building console"
    );
    let console = Console::new(config, Arc::new(storage))?;
    Ok((console, name))
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        return "(none)".into();
    }
    cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
}
