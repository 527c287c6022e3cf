// ── Session persistence ──
//
// Only the durable slice of the session (token and user) is written.
// Loading is forgiving: anything unreadable becomes an anonymous session.

mod storage;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{Credential, Session, User};

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};

/// Storage key of the persisted session slice.
pub const SESSION_STORAGE_KEY: &str = "auth-storage";

/// Schema version of [`PersistedSession`].
pub const SESSION_STORAGE_VERSION: u32 = 0;

/// On-disk form of the session: `{"state":{"token":..,"user":..},"version":0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub state: PersistedSessionState,
    pub version: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedSessionState {
    #[serde(default)]
    pub token: Option<Credential>,
    #[serde(default)]
    pub user: Option<User>,
}

impl PersistedSession {
    /// Project the durable slice out of a session. Loading and error
    /// flags are transient and never written.
    pub fn from_session(session: &Session) -> Self {
        Self {
            state: PersistedSessionState {
                token: session.token.clone(),
                user: session.user.clone(),
            },
            version: SESSION_STORAGE_VERSION,
        }
    }

    /// Rebuild a session. A slice with only one of token/user is treated
    /// as anonymous.
    pub fn into_session(self) -> Session {
        match (self.state.token, self.state.user) {
            (Some(token), Some(user)) => Session {
                user: Some(user),
                token: Some(token),
                is_loading: false,
                error: None,
            },
            _ => Session::default(),
        }
    }

    fn is_partial(&self) -> bool {
        self.state.token.is_some() != self.state.user.is_some()
    }
}

/// Reads and writes the session slice through a [`KeyValueStorage`].
#[derive(Clone)]
pub struct SessionPersistence {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
}

impl SessionPersistence {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_key(storage, SESSION_STORAGE_KEY)
    }

    pub fn with_key(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the persisted session. Never fails; problems are logged and
    /// yield an anonymous session.
    pub fn load(&self) -> Session {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "no persisted session");
                return Session::default();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "could not read persisted session");
                return Session::default();
            }
        };

        let persisted: PersistedSession = match serde_json::from_str(&raw) {
            Ok(p) => p,
            Err(e) => {
                warn!(key = %self.key, error = %e, "discarding malformed persisted session");
                return Session::default();
            }
        };

        if persisted.version != SESSION_STORAGE_VERSION {
            warn!(
                key = %self.key,
                found = persisted.version,
                expected = SESSION_STORAGE_VERSION,
                "discarding persisted session with unknown version"
            );
            return Session::default();
        }
        if persisted.is_partial() {
            warn!(key = %self.key, "discarding half-populated persisted session");
            return Session::default();
        }

        let session = persisted.into_session();
        debug!(
            key = %self.key,
            authenticated = session.is_authenticated(),
            "rehydrated session"
        );
        session
    }

    /// Write the durable slice of `session`. Failures are logged and
    /// otherwise ignored.
    pub fn save(&self, session: &Session) {
        let persisted = PersistedSession::from_session(session);
        let result = serde_json::to_string(&persisted)
            .map_err(std::io::Error::other)
            .and_then(|json| self.storage.set_item(&self.key, &json));
        if let Err(e) = result {
            warn!(key = %self.key, error = %e, "failed to persist session");
        }
    }

    /// Drop the persisted slice entirely.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(&self.key) {
            warn!(key = %self.key, error = %e, "failed to remove persisted session");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Role;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn signed_in() -> Session {
        Session {
            user: Some(User::new("alice", Role::Admin)),
            token: Some(Credential::new("T")),
            is_loading: true,
            error: Some("stale".into()),
        }
    }

    fn persistence() -> (Arc<MemoryStorage>, SessionPersistence) {
        let storage = Arc::new(MemoryStorage::new());
        let persistence = SessionPersistence::new(Arc::clone(&storage) as Arc<dyn KeyValueStorage>);
        (storage, persistence)
    }

    #[test]
    fn round_trip_keeps_only_token_and_user() {
        let restored = PersistedSession::from_session(&signed_in()).into_session();
        assert_eq!(restored.token, Some(Credential::new("T")));
        assert_eq!(restored.user, Some(User::new("alice", Role::Admin)));
        assert!(!restored.is_loading);
        assert_eq!(restored.error, None);
        assert!(restored.is_authenticated());
    }

    #[test]
    fn persisted_shape_is_stable() {
        insta::assert_json_snapshot!(PersistedSession::from_session(&signed_in()), @r#"
        {
          "state": {
            "token": "T",
            "user": {
              "username": "alice",
              "role": "admin"
            }
          },
          "version": 0
        }
        "#);
    }

    #[test]
    fn anonymous_session_persists_nulls() {
        let value = serde_json::to_value(PersistedSession::from_session(&Session::default())).unwrap();
        assert_eq!(
            value,
            json!({ "state": { "token": null, "user": null }, "version": 0 })
        );
    }

    #[test]
    fn save_then_load_restores_session() {
        let (storage, persistence) = persistence();
        persistence.save(&signed_in());
        assert!(storage.get_item(SESSION_STORAGE_KEY).unwrap().is_some());

        let loaded = persistence.load();
        assert!(loaded.is_authenticated());
        assert_eq!(loaded.token.unwrap().expose(), "T");
    }

    #[test]
    fn missing_key_loads_anonymous() {
        let (_, persistence) = persistence();
        assert_eq!(persistence.load(), Session::default());
    }

    #[test]
    fn malformed_content_loads_anonymous() {
        let (storage, persistence) = persistence();
        storage.set_item(SESSION_STORAGE_KEY, "{not json").unwrap();
        assert_eq!(persistence.load(), Session::default());
    }

    #[test]
    fn unknown_version_loads_anonymous() {
        let (storage, persistence) = persistence();
        let raw = json!({
            "state": { "token": "T", "user": { "username": "alice", "role": "admin" } },
            "version": 7
        });
        storage
            .set_item(SESSION_STORAGE_KEY, &raw.to_string())
            .unwrap();
        assert_eq!(persistence.load(), Session::default());
    }

    #[test]
    fn half_populated_slice_loads_anonymous() {
        let (storage, persistence) = persistence();
        let raw = json!({ "state": { "token": "T", "user": null }, "version": 0 });
        storage
            .set_item(SESSION_STORAGE_KEY, &raw.to_string())
            .unwrap();
        assert_eq!(persistence.load(), Session::default());
    }

    #[test]
    fn clear_removes_the_key() {
        let (storage, persistence) = persistence();
        persistence.save(&signed_in());
        persistence.clear();
        assert_eq!(storage.get_item(SESSION_STORAGE_KEY).unwrap(), None);
    }
}
