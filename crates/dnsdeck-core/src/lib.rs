//! Reactive client state layer between `dnsdeck-api` and UI consumers.
//!
//! This crate owns the session lifecycle, the domain model, and the
//! observable stores a DNS management console renders from:
//!
//! - **[`Console`]**: explicitly constructed facade wiring a
//!   [`TokenBinder`](dnsdeck_api::TokenBinder), the API client, and the
//!   stores. Hosts the cross-store flows ([`login`](Console::login),
//!   [`logout`](Console::logout), [`load_zones`](Console::load_zones)).
//!
//! - **[`SessionStore`]**: authenticated user, bearer credential, and
//!   login loading/error flags. Persisted through [`persist`] and
//!   rehydrated at construction. A generation counter discards login
//!   responses that a logout or newer login has superseded.
//!
//! - **[`CollectionStore<T>`]** / [`ZoneStore`]: insertion-ordered,
//!   id-unique entity collections with independent loading/error flags.
//!
//! - **[`UiStore`]**: theme, sidebar visibility, and a notification queue
//!   with process-unique ids.
//!
//! - **[`Store<S>`]** and [`StateStream<S>`]: the observable primitive.
//!   Synchronous listeners via [`Store::subscribe`] (returning a
//!   [`Subscription`] handle) and async consumption via [`Store::watch`].

pub mod api;
pub mod config;
pub mod console;
pub mod convert;
pub mod error;
pub mod model;
pub mod persist;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use api::ManagementApi;
pub use config::{ConsoleConfig, DEFAULT_API_URL, TlsVerification};
pub use console::Console;
pub use error::{CoreError, LOGIN_FALLBACK_MESSAGE};
pub use persist::{FileStorage, KeyValueStorage, MemoryStorage, PersistedSession, SessionPersistence};
pub use store::{
    CollectionState, CollectionStore, Entity, SessionStore, Store, Subscription, UiState, UiStore,
    ZoneStore,
};
pub use stream::StateStream;

pub use model::{
    Credential, NewNotification, Notification, NotificationId, NotificationKind, Role, Session,
    Theme, User, Zone, ZoneId, ZonePatch,
};
