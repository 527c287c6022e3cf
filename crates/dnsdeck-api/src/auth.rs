// Bearer credential binding
//
// The management API authenticates every call with a bearer token.
// `TokenBinder` holds the one current token and stamps it onto outgoing
// requests; clearing it removes the header entirely.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

/// Process-wide holder for the current bearer credential.
///
/// Cheaply cloneable: every clone shares the same slot, so the session
/// layer and the HTTP client observe the same token. Only the session
/// store is expected to write it.
#[derive(Clone, Default)]
pub struct TokenBinder {
    slot: Arc<ArcSwapOption<SecretString>>,
}

impl TokenBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or clear the current credential.
    ///
    /// `None` removes the credential; subsequent requests carry no
    /// `Authorization` header at all.
    pub fn set_token(&self, token: Option<SecretString>) {
        debug!(present = token.is_some(), "binding API token");
        self.slot.store(token.map(Arc::new));
    }

    /// The current credential, if any.
    pub fn token(&self) -> Option<Arc<SecretString>> {
        self.slot.load_full()
    }

    pub fn is_set(&self) -> bool {
        self.slot.load().is_some()
    }

    /// Attach the current credential to a request, if one is bound.
    pub fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.slot.load().as_deref() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }
}

impl fmt::Debug for TokenBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBinder")
            .field("token", &self.is_set().then_some("[REDACTED]"))
            .finish()
    }
}
