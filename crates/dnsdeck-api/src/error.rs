use thiserror::Error;

/// Top-level error type for the `dnsdeck-api` crate.
///
/// Covers every failure mode of the management API surface:
/// authentication, transport, HTTP status errors, and payload decoding.
/// `dnsdeck-core` maps these into state-layer errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Credentials rejected (bad login, or a bearer token the server no
    /// longer accepts). Carries the server-supplied message, if any.
    #[error("Authentication failed: {}", message.as_deref().unwrap_or("credentials rejected"))]
    Authentication { message: Option<String> },

    /// Authenticated, but not allowed to perform the operation.
    #[error("Forbidden: {}", message.as_deref().unwrap_or("insufficient permissions"))]
    Forbidden { message: Option<String> },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success response that is not an auth failure.
    #[error("API error (HTTP {status}): {}", message.as_deref().unwrap_or("no details"))]
    Api { status: u16, message: Option<String> },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the server rejected the credential attached to
    /// the request (HTTP 401). The session owning that credential is no
    /// longer valid.
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// The human-readable message supplied by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Authentication { message }
            | Self::Forbidden { message }
            | Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status associated with the error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
