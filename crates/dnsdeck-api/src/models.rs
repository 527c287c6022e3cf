// Wire types for the management API.
//
// These mirror the JSON the server speaks and stay deliberately loose:
// unknown attributes are captured into `extra` maps rather than rejected.
// `dnsdeck-core` converts them into canonical domain types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /api/auth/login`.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful login payload: the bearer token plus the user's attributes,
/// all at the top level of the JSON object.
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(flatten)]
    pub user: UserRecord,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// A user as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    #[serde(default)]
    pub role: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A DNS zone as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub id: u64,
    pub name: String,
    #[serde(default, alias = "type")]
    pub zone_type: Option<String>,
    #[serde(default, alias = "records")]
    pub record_count: Option<u32>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_enabled() -> bool {
    true
}

/// `GET /api/zones` answers either with a bare array or `{ "zones": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ZonesEnvelope {
    List(Vec<ZoneRecord>),
    Wrapped { zones: Vec<ZoneRecord> },
}

impl ZonesEnvelope {
    pub(crate) fn into_zones(self) -> Vec<ZoneRecord> {
        match self {
            Self::List(zones) | Self::Wrapped { zones } => zones,
        }
    }
}

/// Error bodies carry a human-readable message under `error`, either as a
/// plain string or as `{ "message": "..." }`.
#[derive(Deserialize)]
pub(crate) struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Message(String),
    Nested { message: Option<String> },
}

impl ErrorBody {
    /// Extract the message from a raw response body, if it has one.
    pub(crate) fn message_from(body: &str) -> Option<String> {
        let parsed: Self = serde_json::from_str(body).ok()?;
        match parsed.error? {
            ErrorDetail::Message(msg) => Some(msg),
            ErrorDetail::Nested { message } => message,
        }
        .filter(|msg| !msg.trim().is_empty())
    }
}
