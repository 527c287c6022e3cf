// ── Console facade ──
//
// Explicitly constructed wiring of the token binder, API client, and the
// three stores. Owns the flows that span stores: sign-in feedback and
// zone loading with credential-rejection handling.

use std::sync::Arc;

use dnsdeck_api::{ApiClient, TokenBinder};
use secrecy::SecretString;
use tracing::{debug, info};

use crate::api::ManagementApi;
use crate::config::ConsoleConfig;
use crate::error::CoreError;
use crate::model::{NewNotification, User, Zone};
use crate::persist::{KeyValueStorage, SessionPersistence};
use crate::store::{SessionStore, UiState, UiStore, ZoneStore};

/// The client-side state of one console.
///
/// Each instance has its own token binder and stores; nothing is global,
/// so several consoles (or tests) can coexist in one process.
pub struct Console<A: ManagementApi = ApiClient> {
    config: ConsoleConfig,
    api: Arc<A>,
    session: SessionStore<A>,
    zones: ZoneStore,
    ui: UiStore,
}

impl Console<ApiClient> {
    /// Build a console against the management API in `config`, restoring
    /// any session persisted in `storage`.
    pub fn new(config: ConsoleConfig, storage: Arc<dyn KeyValueStorage>) -> Result<Self, CoreError> {
        let tokens = TokenBinder::new();
        let api = ApiClient::new(config.api_url.clone(), &config.transport(), tokens.clone())?;
        Ok(Self::with_api(Arc::new(api), tokens, storage, config))
    }
}

impl<A: ManagementApi> Console<A> {
    /// Build a console around an existing API. `tokens` must be the
    /// binder that `api` reads its credential from.
    pub fn with_api(
        api: Arc<A>,
        tokens: TokenBinder,
        storage: Arc<dyn KeyValueStorage>,
        config: ConsoleConfig,
    ) -> Self {
        let session = SessionStore::with_persistence(
            Arc::clone(&api),
            tokens,
            SessionPersistence::new(storage),
        );
        let ui = UiStore::new(UiState {
            theme: config.theme,
            sidebar_open: config.sidebar_open,
            notifications: Vec::new(),
        });
        Self {
            config,
            api,
            session,
            zones: ZoneStore::new(),
            ui,
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn session(&self) -> &SessionStore<A> {
        &self.session
    }

    pub fn zones(&self) -> &ZoneStore {
        &self.zones
    }

    pub fn ui(&self) -> &UiStore {
        &self.ui
    }

    // ── Flows ────────────────────────────────────────────────────────

    /// Sign in and post the outcome to the notification queue.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<User, CoreError> {
        let result = self.session.login(username, password).await;
        match &result {
            Ok(user) => {
                self.ui.add_notification(NewNotification::success(format!(
                    "Signed in as {}",
                    user.username
                )));
            }
            Err(CoreError::LoginFailed { message }) => {
                self.ui.add_notification(
                    NewNotification::error(message.clone()).with_title("Sign-in failed"),
                );
            }
            Err(_) => {}
        }
        result
    }

    /// Sign out and forget everything loaded under the old credential.
    pub fn logout(&self) {
        let was_authenticated = self.session.is_authenticated();
        self.session.logout();
        self.zones.reset();
        if was_authenticated {
            self.ui.add_notification(NewNotification::info("Signed out"));
        }
    }

    /// Fetch the zone list into the zone store.
    ///
    /// A 401 from the server ends the session. Results that arrive after
    /// the session changed are dropped with [`CoreError::SessionChanged`].
    pub async fn load_zones(&self) -> Result<Vec<Arc<Zone>>, CoreError> {
        if !self.session.is_authenticated() {
            return Err(CoreError::NotAuthenticated);
        }
        let generation = self.session.generation();

        self.zones.set_loading(true);
        let outcome = self.fetch_zones(generation).await;
        self.zones.set_loading(false);

        outcome.map(|()| self.zones.snapshot().to_vec())
    }

    async fn fetch_zones(&self, generation: u64) -> Result<(), CoreError> {
        let result = self.api.list_zones().await;

        if self.session.generation() != generation {
            debug!(generation, "dropping zone list from a previous session");
            return Err(CoreError::SessionChanged);
        }

        match result {
            Ok(records) => {
                let count = records.len();
                self.zones.set_all(records.into_iter().map(Zone::from));
                self.zones.set_error(None);
                debug!(count, "zones loaded");
                Ok(())
            }
            Err(e) => {
                let message = e.server_message().map(str::to_owned);
                let rejected = e.is_auth_rejected();
                let err = CoreError::from(e);
                self.zones
                    .set_error(Some(message.unwrap_or_else(|| err.to_string())));

                if rejected && self.session.reject_credential(generation) {
                    info!("session expired while loading zones");
                    self.zones.clear();
                    self.ui.add_notification(
                        NewNotification::warning("Your session expired, sign in again")
                            .with_title("Session expired"),
                    );
                }
                Err(err)
            }
        }
    }
}
