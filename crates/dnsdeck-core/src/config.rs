// ── Runtime console configuration ──
//
// Describes which management API to talk to and how the UI starts out.
// Never touches disk: the CLI resolves a profile and hands this in.

use std::path::PathBuf;
use std::time::Duration;

use dnsdeck_api::{TlsMode, TransportConfig};
use url::Url;

use crate::model::Theme;

/// Server root used when a profile names none.
pub const DEFAULT_API_URL: &str = "http://localhost:5380";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

impl From<TlsVerification> for TlsMode {
    fn from(tls: TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Everything a [`Console`](crate::Console) needs at construction.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Management API root (e.g. `https://dns.example.com:5380`).
    pub api_url: Url,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Initial theme of the UI store.
    pub theme: Theme,
    pub sidebar_open: bool,
}

impl ConsoleConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            theme: Theme::default(),
            sidebar_open: true,
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone().into(),
            timeout: self.timeout,
        }
    }
}
