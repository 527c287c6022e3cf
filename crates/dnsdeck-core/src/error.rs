// ── Core error types ──
//
// Errors surfaced by the state layer. Consumers never see HTTP status
// codes or JSON parse failures directly: the `From<dnsdeck_api::Error>`
// impl translates transport-layer errors into state-level variants.

use thiserror::Error;

/// Message used when a login fails without a server-supplied explanation.
pub const LOGIN_FALLBACK_MESSAGE: &str = "Login failed";

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    /// Login rejected or failed in transit. Displays exactly the message
    /// stored in the session's `error` field.
    #[error("{message}")]
    LoginFailed { message: String },

    /// A newer login or a logout happened while this login was in flight;
    /// its result was discarded.
    #[error("Login superseded by a newer session action")]
    LoginSuperseded,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Session expired -- sign in again")]
    SessionExpired,

    /// The session changed (login, logout, or expiry) while a request was
    /// in flight; its result was dropped.
    #[error("Session changed while the request was in flight")]
    SessionChanged,

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach management API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration / storage errors ───────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<dnsdeck_api::Error> for CoreError {
    fn from(err: dnsdeck_api::Error) -> Self {
        match err {
            dnsdeck_api::Error::Authentication { .. } => CoreError::SessionExpired,
            dnsdeck_api::Error::Forbidden { message } => CoreError::Api {
                message: message.unwrap_or_else(|| "insufficient permissions".into()),
                status: Some(403),
            },
            dnsdeck_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            dnsdeck_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            dnsdeck_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            dnsdeck_api::Error::Api { status, message } => CoreError::Api {
                message: message.unwrap_or_else(|| format!("HTTP {status}")),
                status: Some(status),
            },
            dnsdeck_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
