// ── Reactive stores ──
//
// `Store<S>` is the observable primitive; the session, collection, and
// UI stores wrap it with domain actions.

mod collection;
mod session;
mod state;
mod ui;

pub use collection::{CollectionState, CollectionStore, Entity};
pub use session::{SESSION_EXPIRED_MESSAGE, SessionStore};
pub use state::{Store, Subscription};
pub use ui::{UiState, UiStore};

use crate::model::Zone;

/// The zone list shown by the console.
pub type ZoneStore = CollectionStore<Zone>;
