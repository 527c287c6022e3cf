// ── Observable state container ──
//
// Lock-free snapshot reads via `ArcSwap`, serialized writes, and two
// notification paths: synchronous listeners (called before the mutating
// call returns) and a `watch` channel for async consumers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use arc_swap::ArcSwap;
use tokio::sync::watch;

use crate::stream::StateStream;

type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;

struct Listeners<S> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Listener<S>)>>,
}

impl<S> Listeners<S> {
    fn entries(&self) -> MutexGuard<'_, Vec<(u64, Listener<S>)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, listener: Listener<S>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries().push((id, listener));
        id
    }

    fn remove(&self, id: u64) {
        self.entries().retain(|(entry_id, _)| *entry_id != id);
    }

    /// Copy of the current listeners, so callbacks run without the lock
    /// held and may subscribe or unsubscribe freely.
    fn snapshot(&self) -> Vec<Listener<S>> {
        self.entries().iter().map(|(_, l)| Arc::clone(l)).collect()
    }
}

/// Handle for a registered listener.
///
/// Dropping it, or calling [`unsubscribe`](Self::unsubscribe), detaches
/// the listener. Detaching after the store is gone is a no-op.
#[must_use = "dropping a Subscription immediately detaches its listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.run_detach();
    }

    fn run_detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_detach();
    }
}

/// An explicitly constructed, observable state container.
///
/// Every mutation clones the current state, applies the change under a
/// writer lock, and publishes the result atomically: readers see either
/// the old or the new state, never a half-applied one. Listeners run once
/// per mutation, after the writer lock is released.
pub struct Store<S: Clone + Send + Sync + 'static> {
    state: ArcSwap<S>,
    writer: Mutex<()>,
    listeners: Arc<Listeners<S>>,
    changes: watch::Sender<Arc<S>>,
}

impl<S: Clone + Send + Sync + 'static> Store<S> {
    pub fn new(initial: S) -> Self {
        let initial = Arc::new(initial);
        let (changes, _) = watch::channel(Arc::clone(&initial));
        Self {
            state: ArcSwap::new(initial),
            writer: Mutex::new(()),
            listeners: Arc::new(Listeners {
                next_id: AtomicU64::new(0),
                entries: Mutex::new(Vec::new()),
            }),
            changes,
        }
    }

    /// The current state (cheap `Arc` clone).
    pub fn get(&self) -> Arc<S> {
        self.state.load_full()
    }

    /// Apply a mutation and notify listeners.
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let out = {
            let _guard = self.lock_writer();
            let mut next = S::clone(&self.state.load());
            let out = f(&mut next);
            self.publish(next);
            out
        };
        self.notify();
        out
    }

    /// Apply a mutation only if `f` returns `Some`. On `None` the state is
    /// left untouched and nobody is notified.
    pub fn try_update<R>(&self, f: impl FnOnce(&mut S) -> Option<R>) -> Option<R> {
        let out = {
            let _guard = self.lock_writer();
            let mut next = S::clone(&self.state.load());
            let out = f(&mut next)?;
            self.publish(next);
            out
        };
        self.notify();
        Some(out)
    }

    /// Register a listener called synchronously after every mutation.
    pub fn subscribe(&self, listener: impl Fn(&S) + Send + Sync + 'static) -> Subscription {
        let id = self.listeners.insert(Arc::new(listener));
        let registry: Weak<Listeners<S>> = Arc::downgrade(&self.listeners);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry.remove(id);
                }
            })),
        }
    }

    /// Subscribe to state snapshots from async code.
    pub fn watch(&self) -> StateStream<S> {
        StateStream::new(self.changes.subscribe())
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.entries().len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, next: S) {
        let snapshot = Arc::new(next);
        self.state.store(Arc::clone(&snapshot));
        // `send_replace` updates even with zero receivers.
        self.changes.send_replace(snapshot);
    }

    fn notify(&self) {
        let snapshot = self.state.load_full();
        for listener in self.listeners.snapshot() {
            listener(&snapshot);
        }
    }
}

impl<S: Clone + Default + Send + Sync + 'static> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
