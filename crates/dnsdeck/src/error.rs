//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use dnsdeck_config::ConfigError;
use dnsdeck_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the management API at {url}")]
    #[diagnostic(
        code(dnsdeck::connection_failed),
        help(
            "Check that the server is running and accessible.\n\
             Override the URL with --api-url, or accept a self-signed\n\
             certificate with --insecure (-k)."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(dnsdeck::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(dnsdeck::auth_failed),
        help("Check the username and password, then run: dnsdeck login")
    )]
    AuthFailed { message: String },

    #[error("Not signed in")]
    #[diagnostic(code(dnsdeck::not_authenticated), help("Run: dnsdeck login --profile {profile}"))]
    NotAuthenticated { profile: String },

    #[error("Session expired")]
    #[diagnostic(code(dnsdeck::session_expired), help("Sign in again with: dnsdeck login --profile {profile}"))]
    SessionExpired { profile: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(code(dnsdeck::forbidden))]
    Forbidden { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({status}): {message}")]
    #[diagnostic(code(dnsdeck::api_error))]
    ApiError { status: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(dnsdeck::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(dnsdeck::profile_not_found),
        help("Available profiles: {available}\nConfig file: {path}")
    )]
    ProfileNotFound {
        name: String,
        available: String,
        path: String,
    },

    #[error(transparent)]
    #[diagnostic(code(dnsdeck::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(dnsdeck::internal))]
    Internal(String),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NotAuthenticated { .. } | Self::SessionExpired { .. } => {
                exit_code::AUTH
            }
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the active profile name to session errors.
    pub fn from_core(err: CoreError, profile: &str) -> Self {
        match err {
            CoreError::NotAuthenticated => Self::NotAuthenticated {
                profile: profile.into(),
            },
            CoreError::SessionExpired | CoreError::SessionChanged => Self::SessionExpired {
                profile: profile.into(),
            },
            other => other.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::LoginFailed { message } => CliError::AuthFailed { message },

            CoreError::LoginSuperseded => {
                CliError::Internal("sign-in was superseded by another session action".into())
            }

            CoreError::NotAuthenticated => CliError::NotAuthenticated {
                profile: "default".into(),
            },

            CoreError::SessionExpired | CoreError::SessionChanged => CliError::SessionExpired {
                profile: "default".into(),
            },

            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::Api {
                message,
                status: Some(403),
            } => CliError::Forbidden { message },

            CoreError::Api { message, status } => CliError::ApiError {
                status: status.map_or_else(|| "unknown".into(), |s| s.to_string()),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Storage(e) => CliError::Io(e),

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}
