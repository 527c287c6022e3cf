// Management API HTTP client
//
// Wraps `reqwest::Client` with URL construction, bearer-token binding,
// and status/error-body mapping. Every request goes through the shared
// `TokenBinder`, so the session layer controls authentication for all
// calls from one place.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::TokenBinder;
use crate::error::Error;
use crate::models::{ErrorBody, LoginRequest, LoginResponse, ZoneRecord, ZonesEnvelope};
use crate::transport::TransportConfig;

const LOGIN_PATH: &str = "auth/login";
const ZONES_PATH: &str = "zones";

/// Raw HTTP client for the DNS management API.
///
/// Cheaply cloneable; clones share the connection pool and the token slot.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: TokenBinder,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the server root (e.g. `https://dns.example.com:5380`);
    /// endpoint paths are appended below `/api/`.
    pub fn new(
        base_url: Url,
        transport: &TransportConfig,
        tokens: TokenBinder,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, tokens))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, tokens: TokenBinder) -> Self {
        Self {
            http,
            base_url,
            tokens,
        }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The token slot attached to every request.
    pub fn tokens(&self) -> &TokenBinder {
        &self.tokens
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Exchange username/password for a bearer token and user profile.
    ///
    /// Does not touch the token binder: installing the returned token is
    /// the session layer's decision.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, Error> {
        let url = self.api_url(LOGIN_PATH)?;
        debug!(username, "logging in at {}", url);

        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };
        self.post(url, &body).await
    }

    /// List all zones visible to the current credential.
    pub async fn list_zones(&self) -> Result<Vec<ZoneRecord>, Error> {
        let url = self.api_url(ZONES_PATH)?;
        let envelope: ZonesEnvelope = self.get(url).await?;
        Ok(envelope.into_zones())
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let builder = self.tokens.apply(self.http.get(url));
        let resp = builder.send().await?;

        parse_response(resp).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let builder = self.tokens.apply(self.http.post(url).json(body));
        let resp = builder.send().await?;

        parse_response(resp).await
    }
}

/// Map HTTP status and error bodies into `Error`, or decode the payload.
async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        let message = ErrorBody::message_from(&body);
        debug!(status = status.as_u16(), ?message, "request failed");
        return Err(match status {
            reqwest::StatusCode::UNAUTHORIZED => Error::Authentication { message },
            reqwest::StatusCode::FORBIDDEN => Error::Forbidden { message },
            _ => Error::Api {
                status: status.as_u16(),
                message,
            },
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.clone(),
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            TokenBinder::new(),
        )
    }

    #[test]
    fn api_url_joins_under_api_prefix() {
        let c = client("http://127.0.0.1:5380");
        assert_eq!(
            c.api_url("auth/login").unwrap().as_str(),
            "http://127.0.0.1:5380/api/auth/login"
        );
    }

    #[test]
    fn api_url_keeps_base_path_prefix() {
        let c = client("https://example.com/console/");
        assert_eq!(
            c.api_url("/zones").unwrap().as_str(),
            "https://example.com/console/api/zones"
        );
    }
}
