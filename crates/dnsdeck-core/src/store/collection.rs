// ── Generic reactive entity collection ──
//
// Insertion-ordered, id-keyed projection of server records with
// loading/error flags, published through a `Store`.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use indexmap::IndexMap;

use super::state::{Store, Subscription};
use crate::stream::StateStream;

/// A server record that can live in a [`CollectionStore`].
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;
    /// Partial update applied by [`CollectionStore::update`].
    type Patch;

    fn id(&self) -> &Self::Id;

    /// Shallow-merge `patch` into `self`. Must not change the id.
    fn apply(&mut self, patch: Self::Patch);
}

/// Snapshot of a collection.
///
/// Ids are unique (the map is keyed by them) and iteration follows
/// insertion order.
#[derive(Debug, Clone)]
pub struct CollectionState<T: Entity> {
    items: IndexMap<T::Id, Arc<T>>,
    selected: Option<T::Id>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl<T: Entity> Default for CollectionState<T> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
            selected: None,
            is_loading: false,
            error: None,
        }
    }
}

impl<T: Entity> CollectionState<T> {
    pub fn get(&self, id: &T::Id) -> Option<&Arc<T>> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.items.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.items.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &T::Id> {
        self.items.keys()
    }

    pub fn to_vec(&self) -> Vec<Arc<T>> {
        self.items.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected_id(&self) -> Option<&T::Id> {
        self.selected.as_ref()
    }

    pub fn selected(&self) -> Option<&Arc<T>> {
        self.selected.as_ref().and_then(|id| self.items.get(id))
    }

    fn drop_stale_selection(&mut self) {
        if self
            .selected
            .as_ref()
            .is_some_and(|id| !self.items.contains_key(id))
        {
            self.selected = None;
        }
    }
}

/// Reactive CRUD store over one entity type.
///
/// Loading and error flags are independent of the CRUD operations:
/// callers sequence them around their network calls.
pub struct CollectionStore<T: Entity> {
    store: Store<CollectionState<T>>,
}

impl<T: Entity> Default for CollectionStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> CollectionStore<T> {
    pub fn new() -> Self {
        Self {
            store: Store::new(CollectionState::default()),
        }
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<CollectionState<T>> {
        self.store.get()
    }

    pub fn get(&self, id: &T::Id) -> Option<Arc<T>> {
        self.store.get().get(id).cloned()
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&CollectionState<T>) + Send + Sync + 'static,
    ) -> Subscription {
        self.store.subscribe(listener)
    }

    pub fn watch(&self) -> StateStream<CollectionState<T>> {
        self.store.watch()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Replace the whole collection, in input order. A repeated id keeps
    /// its first position and its last value.
    pub fn set_all(&self, entities: impl IntoIterator<Item = T>) {
        let items: IndexMap<T::Id, Arc<T>> = entities
            .into_iter()
            .map(|e| (e.id().clone(), Arc::new(e)))
            .collect();
        self.store.update(|state| {
            state.items = items;
            state.drop_stale_selection();
        });
    }

    /// Append an entity. An entity whose id is already present replaces
    /// the existing one in place. Returns `true` if the id was new.
    pub fn add(&self, entity: T) -> bool {
        let id = entity.id().clone();
        self.store
            .update(|state| state.items.insert(id, Arc::new(entity)).is_none())
    }

    /// Merge `patch` into the entity with `id`. No-op (and no
    /// notification) if the id is absent. Returns `true` if applied.
    pub fn update(&self, id: &T::Id, patch: T::Patch) -> bool {
        self.store
            .try_update(|state| {
                let slot = state.items.get_mut(id)?;
                let mut entity = T::clone(&**slot);
                entity.apply(patch);
                debug_assert!(entity.id() == id, "patch changed entity id");
                *slot = Arc::new(entity);
                Some(())
            })
            .is_some()
    }

    /// Remove the entity with `id`, preserving the order of the rest.
    /// No-op if absent.
    pub fn remove(&self, id: &T::Id) -> Option<Arc<T>> {
        self.store.try_update(|state| {
            let removed = state.items.shift_remove(id)?;
            state.drop_stale_selection();
            Some(removed)
        })
    }

    pub fn clear(&self) {
        self.store.update(|state| {
            state.items.clear();
            state.selected = None;
        });
    }

    /// Drop items, selection, and both flags in a single notification.
    pub fn reset(&self) {
        self.store.update(|state| *state = CollectionState::default());
    }

    /// Mark an entity as selected. Selecting an unknown id is a no-op;
    /// `None` clears the selection.
    pub fn select(&self, id: Option<T::Id>) -> bool {
        self.store
            .try_update(|state| {
                if let Some(ref id) = id {
                    if !state.items.contains_key(id) {
                        return None;
                    }
                }
                state.selected = id;
                Some(())
            })
            .is_some()
    }

    pub fn set_loading(&self, is_loading: bool) {
        self.store.update(|state| state.is_loading = is_loading);
    }

    pub fn set_error(&self, error: Option<String>) {
        self.store.update(|state| state.error = error);
    }
}
