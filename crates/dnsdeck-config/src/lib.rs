//! Profile configuration for dnsdeck.
//!
//! TOML profiles merged with `DNSDECK_*` environment variables, the
//! per-profile directory where the session is persisted, and translation
//! to `dnsdeck_core::ConsoleConfig`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dnsdeck_core::{ConsoleConfig, DEFAULT_API_URL, Theme, TlsVerification};

/// Environment variable prefix. Nested keys use `__`, e.g.
/// `DNSDECK_DEFAULTS__TIMEOUT=10`.
pub const ENV_PREFIX: &str = "DNSDECK_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown profile '{name}'")]
    UnknownProfile { name: String },

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
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named management-API profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub theme: Theme,

    #[serde(default = "default_sidebar_open")]
    pub sidebar_open: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: default_timeout(),
            theme: Theme::default(),
            sidebar_open: default_sidebar_open(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_sidebar_open() -> bool {
    true
}

/// A named management-API profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Server root (e.g. "https://dns.example.com:5380").
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override `defaults.insecure`.
    pub insecure: Option<bool>,

    /// Override `defaults.timeout` (seconds).
    pub timeout: Option<u64>,

    /// Override `defaults.theme`.
    pub theme: Option<Theme>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            ca_cert: None,
            insecure: None,
            timeout: None,
            theme: None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

impl Config {
    /// Resolve a profile by name, falling back to `default_profile`.
    ///
    /// The implicit default profile needs no entry in the file; any other
    /// name must be configured.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
            .to_owned();
        match self.profiles.get(&name) {
            Some(profile) => Ok((name, profile.clone())),
            None if name == "default" => Ok((name, Profile::default())),
            None => Err(ConfigError::UnknownProfile { name }),
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "dnsdeck", "dnsdeck")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    for part in parts {
        p.push(part);
    }
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "dnsdeck", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding persisted state for one profile. Each profile has
/// its own, so sessions against different servers never mix.
pub fn profile_data_dir(profile_name: &str) -> PathBuf {
    let base = project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "dnsdeck"]),
        |dirs| dirs.data_dir().to_path_buf(),
    );
    base.join("profiles").join(profile_name)
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` + environment. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

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

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ConsoleConfig` from a profile and the global defaults.
pub fn profile_to_console_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ConsoleConfig, ConfigError> {
    let api_url: url::Url = profile
        .api_url
        .parse()
        .map_err(|e| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL '{}': {e}", profile.api_url),
        })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = ConsoleConfig::new(api_url);
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.theme = profile.theme.unwrap_or(defaults.theme);
    config.sidebar_open = defaults.sidebar_open;
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
timeout = 10
theme = "dark"

[profiles.lab]
api_url = "https://lab.example.com:5380"
ca_cert = "/etc/dnsdeck/lab-ca.pem"

[profiles.edge]
api_url = "https://edge.example.com"
insecure = true
timeout = 3
theme = "light"
"#;

    fn sample() -> Config {
        toml::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults.timeout, 30);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn file_is_merged_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("lab"));
        assert_eq!(config.defaults.theme, Theme::Dark);
        assert_eq!(config.profiles.len(), 2);
    }

    #[test]
    fn defaults_carry_only_console_settings() {
        let rendered = toml::to_string(&Defaults::default()).unwrap();
        assert!(!rendered.contains("output"), "unexpected key in:\n{rendered}");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\noutput = \"json\"\ntimeout = 7\n").unwrap();
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.defaults.timeout, 7);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        save_config_to(&sample(), &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), sample());
    }

    #[test]
    fn profile_resolution() {
        let config = sample();
        assert_eq!(config.profile(None).unwrap().0, "lab");
        assert_eq!(config.profile(Some("edge")).unwrap().0, "edge");
        assert!(matches!(
            config.profile(Some("nope")),
            Err(ConfigError::UnknownProfile { .. })
        ));

        let (name, profile) = Config::default().profile(None).unwrap();
        assert_eq!(name, "default");
        assert_eq!(profile.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn console_config_prefers_profile_overrides() {
        let config = sample();

        let (_, lab) = config.profile(Some("lab")).unwrap();
        let console = profile_to_console_config(&lab, &config.defaults).unwrap();
        assert_eq!(
            console.tls,
            TlsVerification::CustomCa("/etc/dnsdeck/lab-ca.pem".into())
        );
        assert_eq!(console.timeout, Duration::from_secs(10));
        assert_eq!(console.theme, Theme::Dark);

        let (_, edge) = config.profile(Some("edge")).unwrap();
        let console = profile_to_console_config(&edge, &config.defaults).unwrap();
        assert_eq!(console.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(console.timeout, Duration::from_secs(3));
        assert_eq!(console.theme, Theme::Light);
    }

    #[test]
    fn invalid_url_is_a_validation_error() {
        let profile = Profile {
            api_url: "not a url".into(),
            ..Profile::default()
        };
        let err = profile_to_console_config(&profile, &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api_url"));
    }

    #[test]
    fn profiles_get_separate_data_dirs() {
        let lab = profile_data_dir("lab");
        let edge = profile_data_dir("edge");
        assert_ne!(lab, edge);
        assert!(lab.ends_with("profiles/lab"));
    }
}
