// ── Session store ──
//
// Owns the authenticated identity, the bearer credential, and the
// loading/error flags of the login flow. The token binder is written
// only from here, always under the store's writer lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dnsdeck_api::TokenBinder;
use secrecy::SecretString;
use tracing::{debug, info, warn};

use super::state::{Store, Subscription};
use crate::api::ManagementApi;
use crate::error::{CoreError, LOGIN_FALLBACK_MESSAGE};
use crate::model::{Credential, Session, User};
use crate::persist::SessionPersistence;
use crate::stream::StateStream;

/// Error recorded when the server rejects a credential that was valid
/// at sign-in.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired";

/// Reactive authentication state.
///
/// Every `login()` and `logout()` starts a new generation. A login
/// response is committed only while its generation is still current, so
/// a logout or a newer login wins over an older request still in flight.
pub struct SessionStore<A: ManagementApi> {
    api: Arc<A>,
    tokens: TokenBinder,
    store: Store<Session>,
    generation: AtomicU64,
    _persist: Option<Subscription>,
}

impl<A: ManagementApi> SessionStore<A> {
    /// A store that starts anonymous and is not persisted.
    pub fn new(api: Arc<A>, tokens: TokenBinder) -> Self {
        tokens.set_token(None);
        Self {
            api,
            tokens,
            store: Store::new(Session::default()),
            generation: AtomicU64::new(0),
            _persist: None,
        }
    }

    /// A store rehydrated from `persistence` and written back to it on
    /// every change.
    ///
    /// The rehydrated token is installed into `tokens` before the store
    /// is returned. It is not validated against the server.
    pub fn with_persistence(
        api: Arc<A>,
        tokens: TokenBinder,
        persistence: SessionPersistence,
    ) -> Self {
        let session = persistence.load();
        tokens.set_token(session.token.as_ref().map(secret_of));
        if session.is_authenticated() {
            info!(
                username = session.user.as_ref().map_or("", |u| u.username.as_str()),
                "restored persisted session"
            );
        }

        let store = Store::new(session);
        let subscription = store.subscribe(move |session| persistence.save(session));
        Self {
            api,
            tokens,
            store,
            generation: AtomicU64::new(0),
            _persist: Some(subscription),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<Session> {
        self.store.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.get().is_authenticated()
    }

    pub fn user(&self) -> Option<User> {
        self.store.get().user.clone()
    }

    pub fn is_admin(&self) -> bool {
        self.store.get().is_admin()
    }

    pub fn is_agent(&self) -> bool {
        self.store.get().is_agent()
    }

    /// The current generation. Capture it before issuing an
    /// authenticated request and hand it to
    /// [`reject_credential`](Self::reject_credential) if the server
    /// rejects the token.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn tokens(&self) -> &TokenBinder {
        &self.tokens
    }

    pub fn subscribe(&self, listener: impl Fn(&Session) + Send + Sync + 'static) -> Subscription {
        self.store.subscribe(listener)
    }

    pub fn watch(&self) -> StateStream<Session> {
        self.store.watch()
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Sign in with username and password.
    ///
    /// Empty credentials are sent as-is; rejecting them is the server's
    /// job. On failure the session's `error` holds the server message (or
    /// `"Login failed"`) and the returned error displays the same text.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<User, CoreError> {
        let generation = self.store.update(|s| {
            s.is_loading = true;
            s.error = None;
            self.advance()
        });
        info!(username, generation, "signing in");

        match self.api.login(username, password).await {
            Ok(response) => {
                let token = Credential::new(response.token);
                let user = User::from(response.user);
                let committed = self.store.try_update(|s| {
                    if !self.is_current(generation) {
                        return None;
                    }
                    // Binder first: anyone who sees the session as
                    // authenticated can already issue requests.
                    self.tokens.set_token(Some(secret_of(&token)));
                    s.token = Some(token);
                    s.user = Some(user.clone());
                    s.is_loading = false;
                    s.error = None;
                    Some(())
                });
                if committed.is_none() {
                    debug!(username, generation, "discarding superseded login response");
                    return Err(CoreError::LoginSuperseded);
                }
                info!(username, role = %user.role, "signed in");
                Ok(user)
            }
            Err(e) => {
                let message = e
                    .server_message()
                    .map_or_else(|| LOGIN_FALLBACK_MESSAGE.to_owned(), str::to_owned);
                let committed = self.store.try_update(|s| {
                    if !self.is_current(generation) {
                        return None;
                    }
                    s.error = Some(message.clone());
                    s.is_loading = false;
                    Some(())
                });
                if committed.is_none() {
                    debug!(username, generation, "discarding superseded login failure");
                    return Err(CoreError::LoginSuperseded);
                }
                warn!(username, error = %e, "sign-in failed");
                Err(CoreError::LoginFailed { message })
            }
        }
    }

    /// Sign out. Clears the credential everywhere and abandons any login
    /// still in flight. Calling it while anonymous is harmless.
    pub fn logout(&self) {
        let was_authenticated = self.store.update(|s| {
            self.advance();
            self.tokens.set_token(None);
            let was = s.is_authenticated();
            s.user = None;
            s.token = None;
            s.is_loading = false;
            was
        });
        if was_authenticated {
            info!("signed out");
        }
    }

    pub fn clear_error(&self) {
        self.store.update(|s| s.error = None);
    }

    /// Replace the signed-in user's attributes. Ignored when anonymous.
    pub fn set_user(&self, user: User) -> bool {
        self.store
            .try_update(|s| {
                if !s.is_authenticated() {
                    return None;
                }
                s.user = Some(user);
                Some(())
            })
            .is_some()
    }

    /// Drop the session because the server rejected its credential.
    ///
    /// `generation` is the value of [`generation`](Self::generation) when
    /// the rejected request was issued. If a login or logout happened
    /// since, the rejection concerns an older credential and is ignored.
    pub fn reject_credential(&self, generation: u64) -> bool {
        let rejected = self
            .store
            .try_update(|s| {
                if !self.is_current(generation) || !s.is_authenticated() {
                    return None;
                }
                self.advance();
                self.tokens.set_token(None);
                s.user = None;
                s.token = None;
                s.is_loading = false;
                s.error = Some(SESSION_EXPIRED_MESSAGE.to_owned());
                Some(())
            })
            .is_some();
        if rejected {
            warn!(generation, "credential rejected by server, signed out");
        }
        rejected
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

fn secret_of(credential: &Credential) -> SecretString {
    SecretString::from(credential.expose().to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Role;
    use crate::persist::{KeyValueStorage, MemoryStorage, SESSION_STORAGE_KEY};
    use dnsdeck_api::{LoginResponse, UserRecord, ZoneRecord};
    use secrecy::ExposeSecret;
    use serde_json::Map;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    type Reply = (Result<LoginResponse, dnsdeck_api::Error>, Option<Arc<Notify>>);

    /// Scripted backend. Each login pops one reply; a reply with a gate
    /// waits for it to be notified before resolving.
    #[derive(Default)]
    struct FakeApi {
        replies: Mutex<VecDeque<Reply>>,
    }

    impl FakeApi {
        fn reply(self, reply: Result<LoginResponse, dnsdeck_api::Error>) -> Self {
            self.replies.lock().unwrap().push_back((reply, None));
            self
        }

        fn gated(self, reply: Result<LoginResponse, dnsdeck_api::Error>, gate: &Arc<Notify>) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back((reply, Some(Arc::clone(gate))));
            self
        }
    }

    impl ManagementApi for FakeApi {
        async fn login(
            &self,
            _username: &str,
            _password: &SecretString,
        ) -> Result<LoginResponse, dnsdeck_api::Error> {
            let (reply, gate) = self.replies.lock().unwrap().pop_front().unwrap();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            reply
        }

        async fn list_zones(&self) -> Result<Vec<ZoneRecord>, dnsdeck_api::Error> {
            Ok(Vec::new())
        }
    }

    fn granted(username: &str, role: &str, token: &str) -> Result<LoginResponse, dnsdeck_api::Error> {
        Ok(LoginResponse {
            token: token.into(),
            user: UserRecord {
                username: username.into(),
                role: role.into(),
                extra: Map::new(),
            },
        })
    }

    fn denied(message: Option<&str>) -> Result<LoginResponse, dnsdeck_api::Error> {
        Err(dnsdeck_api::Error::Authentication {
            message: message.map(str::to_owned),
        })
    }

    fn password() -> SecretString {
        SecretString::from("secret".to_owned())
    }

    fn store(api: FakeApi) -> SessionStore<FakeApi> {
        SessionStore::new(Arc::new(api), TokenBinder::new())
    }

    fn bound_token(store: &SessionStore<FakeApi>) -> Option<String> {
        store.tokens().token().map(|t| t.expose_secret().to_owned())
    }

    #[tokio::test]
    async fn successful_login_authenticates_and_binds_token() {
        let store = store(FakeApi::default().reply(granted("alice", "admin", "T")));

        let user = store.login("alice", &password()).await.unwrap();

        assert_eq!(user, User::new("alice", Role::Admin));
        let snap = store.snapshot();
        assert!(snap.is_authenticated());
        assert_eq!(snap.token, Some(Credential::new("T")));
        assert!(!snap.is_loading);
        assert_eq!(snap.error, None);
        assert!(store.is_admin());
        assert!(!store.is_agent());
        assert_eq!(bound_token(&store).as_deref(), Some("T"));
    }

    #[tokio::test]
    async fn failed_login_records_server_message() {
        let store = store(FakeApi::default().reply(denied(Some("Invalid username or password"))));

        let err = store.login("alice", &password()).await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid username or password");
        let snap = store.snapshot();
        assert!(!snap.is_authenticated());
        assert!(!snap.is_loading);
        assert_eq!(snap.error.as_deref(), Some("Invalid username or password"));
        assert_eq!(bound_token(&store), None);
    }

    #[tokio::test]
    async fn failed_login_without_message_uses_fallback() {
        let store = store(FakeApi::default().reply(Err(dnsdeck_api::Error::Api {
            status: 500,
            message: None,
        })));

        let err = store.login("", &SecretString::from(String::new())).await.unwrap_err();

        assert!(matches!(err, CoreError::LoginFailed { ref message } if message == "Login failed"));
        assert_eq!(store.snapshot().error.as_deref(), Some("Login failed"));
    }

    #[tokio::test]
    async fn next_login_clears_previous_error() {
        let store = store(
            FakeApi::default()
                .reply(denied(None))
                .reply(granted("bob", "agent", "B")),
        );

        store.login("bob", &password()).await.unwrap_err();
        store.login("bob", &password()).await.unwrap();

        assert_eq!(store.snapshot().error, None);
        assert!(store.is_agent());
    }

    #[tokio::test]
    async fn loading_flag_is_set_while_request_is_pending() {
        let gate = Arc::new(Notify::new());
        let store = store(FakeApi::default().gated(granted("alice", "user", "T"), &gate));

        let pw = password();
        let login = store.login("alice", &pw);
        tokio::pin!(login);
        assert!(futures_util::poll!(&mut login).is_pending());
        assert!(store.snapshot().is_loading);
        assert!(!store.is_authenticated());

        gate.notify_one();
        login.await.unwrap();
        assert!(!store.snapshot().is_loading);
    }

    #[tokio::test]
    async fn logout_discards_in_flight_login() {
        let gate = Arc::new(Notify::new());
        let store = store(FakeApi::default().gated(granted("alice", "admin", "T"), &gate));

        let pw = password();
        let login = store.login("alice", &pw);
        tokio::pin!(login);
        assert!(futures_util::poll!(&mut login).is_pending());

        store.logout();
        assert!(!store.snapshot().is_loading);

        gate.notify_one();
        let err = login.await.unwrap_err();
        assert!(matches!(err, CoreError::LoginSuperseded));

        let snap = store.snapshot();
        assert!(!snap.is_authenticated());
        assert_eq!(snap.user, None);
        assert_eq!(bound_token(&store), None);
    }

    #[tokio::test]
    async fn newest_concurrent_login_wins() {
        let gate = Arc::new(Notify::new());
        let store = store(
            FakeApi::default()
                .gated(granted("first", "admin", "A"), &gate)
                .reply(granted("second", "agent", "B")),
        );

        let pw = password();
        let first = store.login("first", &pw);
        tokio::pin!(first);
        assert!(futures_util::poll!(&mut first).is_pending());

        store.login("second", &password()).await.unwrap();
        gate.notify_one();
        assert!(matches!(first.await, Err(CoreError::LoginSuperseded)));

        assert_eq!(store.user().unwrap().username, "second");
        assert_eq!(bound_token(&store).as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn logout_is_idempotent_and_keeps_error() {
        let store = store(FakeApi::default().reply(denied(Some("nope"))));
        store.login("alice", &password()).await.unwrap_err();

        store.logout();
        let once = store.snapshot();
        store.logout();
        let twice = store.snapshot();

        assert_eq!(*once, *twice);
        assert_eq!(twice.error.as_deref(), Some("nope"));
        assert!(!twice.is_authenticated());
    }

    #[tokio::test]
    async fn clear_error_touches_only_error() {
        let store = store(FakeApi::default().reply(denied(Some("nope"))));
        store.login("alice", &password()).await.unwrap_err();
        store.clear_error();
        let snap = store.snapshot();
        assert_eq!(snap.error, None);
        assert!(!snap.is_loading);
    }

    #[tokio::test]
    async fn set_user_requires_a_session() {
        let store = store(FakeApi::default().reply(granted("alice", "user", "T")));
        assert!(!store.set_user(User::new("mallory", Role::Admin)));
        assert_eq!(store.user(), None);

        store.login("alice", &password()).await.unwrap();
        assert!(store.set_user(User::new("alice", Role::Admin)));
        assert!(store.is_admin());
    }

    #[tokio::test]
    async fn stale_rejection_is_ignored() {
        let store = store(
            FakeApi::default()
                .reply(granted("alice", "user", "A"))
                .reply(granted("alice", "user", "B")),
        );
        store.login("alice", &password()).await.unwrap();
        let issued_at = store.generation();

        store.login("alice", &password()).await.unwrap();
        assert!(!store.reject_credential(issued_at));
        assert!(store.is_authenticated());

        assert!(store.reject_credential(store.generation()));
        let snap = store.snapshot();
        assert!(!snap.is_authenticated());
        assert_eq!(snap.error.as_deref(), Some(SESSION_EXPIRED_MESSAGE));
        assert_eq!(bound_token(&store), None);
    }

    #[tokio::test]
    async fn authenticated_iff_token_and_user_after_every_step() {
        let store = store(
            FakeApi::default()
                .reply(granted("alice", "admin", "T"))
                .reply(denied(None)),
        );
        let violations = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&violations);
        let _sub = store.subscribe(move |s| {
            let expected = s.token.is_some() && s.user.is_some();
            if s.is_authenticated() != expected {
                sink.fetch_add(1, Ordering::SeqCst);
            }
        });

        store.login("alice", &password()).await.unwrap();
        store.set_user(User::new("alice", Role::Agent));
        store.logout();
        store.login("alice", &password()).await.unwrap_err();
        store.clear_error();

        assert_eq!(violations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn persisted_session_is_rehydrated_and_kept_in_sync() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let first = SessionStore::with_persistence(
            Arc::new(FakeApi::default().reply(granted("alice", "admin", "T"))),
            TokenBinder::new(),
            SessionPersistence::new(Arc::clone(&storage)),
        );
        first.login("alice", &password()).await.unwrap();
        drop(first);

        let tokens = TokenBinder::new();
        let restored = SessionStore::with_persistence(
            Arc::new(FakeApi::default()),
            tokens.clone(),
            SessionPersistence::new(Arc::clone(&storage)),
        );
        assert!(restored.is_authenticated());
        assert!(restored.is_admin());
        assert_eq!(
            tokens.token().map(|t| t.expose_secret().to_owned()).as_deref(),
            Some("T")
        );

        restored.logout();
        let raw = storage.get_item(SESSION_STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["state"]["token"], serde_json::Value::Null);
        assert_eq!(value["state"]["user"], serde_json::Value::Null);
    }
}
