// ── UI preferences and notification queue ──

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::Serialize;

use super::state::{Store, Subscription};
use crate::model::{NewNotification, Notification, NotificationId, Theme};
use crate::stream::StateStream;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiState {
    pub theme: Theme,
    pub sidebar_open: bool,
    /// Queue in insertion order (which is also id order).
    pub notifications: Vec<Notification>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            sidebar_open: true,
            notifications: Vec::new(),
        }
    }
}

/// Theme, sidebar visibility, and transient notifications.
///
/// Nothing here is persisted; removal of notifications (timeouts,
/// dismissal) is up to the consumer.
pub struct UiStore {
    store: Store<UiState>,
    next_notification: AtomicU64,
}

impl Default for UiStore {
    fn default() -> Self {
        Self::new(UiState::default())
    }
}

impl UiStore {
    pub fn new(initial: UiState) -> Self {
        let next = initial
            .notifications
            .iter()
            .map(|n| n.id.0 + 1)
            .max()
            .unwrap_or(1);
        Self {
            store: Store::new(initial),
            next_notification: AtomicU64::new(next),
        }
    }

    pub fn snapshot(&self) -> Arc<UiState> {
        self.store.get()
    }

    pub fn subscribe(&self, listener: impl Fn(&UiState) + Send + Sync + 'static) -> Subscription {
        self.store.subscribe(listener)
    }

    pub fn watch(&self) -> StateStream<UiState> {
        self.store.watch()
    }

    pub fn toggle_sidebar(&self) {
        self.store.update(|s| s.sidebar_open = !s.sidebar_open);
    }

    pub fn set_theme(&self, theme: Theme) {
        self.store.update(|s| s.theme = theme);
    }

    pub fn toggle_theme(&self) {
        self.store.update(|s| s.theme = s.theme.toggled());
    }

    /// Queue a notification and return its id.
    pub fn add_notification(&self, new: NewNotification) -> NotificationId {
        // Allocated under the writer lock so queue order matches id order.
        self.store.update(|s| {
            let id = NotificationId(self.next_notification.fetch_add(1, Ordering::Relaxed));
            s.notifications.push(Notification {
                id,
                kind: new.kind,
                title: new.title,
                message: new.message,
                created_at: Utc::now(),
            });
            id
        })
    }

    /// Remove the notification with `id`. Returns `false` if it was not
    /// queued (nothing is notified in that case).
    pub fn remove_notification(&self, id: NotificationId) -> bool {
        self.store
            .try_update(|s| {
                let index = s.notifications.iter().position(|n| n.id == id)?;
                s.notifications.remove(index);
                Some(())
            })
            .is_some()
    }

    pub fn clear_notifications(&self) {
        self.store.update(|s| s.notifications.clear());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NotificationKind;

    #[test]
    fn defaults_match_console_startup() {
        let ui = UiStore::default();
        let snap = ui.snapshot();
        assert_eq!(snap.theme, Theme::Light);
        assert!(snap.sidebar_open);
        assert!(snap.notifications.is_empty());
    }

    #[test]
    fn toggles_flip_state() {
        let ui = UiStore::default();
        ui.toggle_sidebar();
        ui.toggle_theme();
        assert!(!ui.snapshot().sidebar_open);
        assert_eq!(ui.snapshot().theme, Theme::Dark);

        ui.set_theme(Theme::Light);
        ui.toggle_sidebar();
        assert_eq!(ui.snapshot().theme, Theme::Light);
        assert!(ui.snapshot().sidebar_open);
    }

    #[test]
    fn notifications_get_distinct_increasing_ids() {
        let ui = UiStore::default();
        let first = ui.add_notification(NewNotification::info("x"));
        let second = ui.add_notification(NewNotification::info("x"));
        assert!(second > first);

        let snap = ui.snapshot();
        let ids: Vec<_> = snap.notifications.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![first, second]);

        assert!(ui.remove_notification(first));
        let snap = ui.snapshot();
        assert_eq!(snap.notifications.len(), 1);
        assert_eq!(snap.notifications[0].id, second);
    }

    #[test]
    fn ids_are_never_reused_after_clear() {
        let ui = UiStore::default();
        let a = ui.add_notification(NewNotification::error("boom").with_title("Zones"));
        ui.clear_notifications();
        let b = ui.add_notification(NewNotification::success("ok"));
        assert_ne!(a, b);
        assert_eq!(ui.snapshot().notifications[0].kind, NotificationKind::Success);
    }

    #[test]
    fn removing_unknown_id_is_a_noop() {
        let ui = UiStore::default();
        ui.add_notification(NewNotification::warning("w"));
        assert!(!ui.remove_notification(NotificationId(999)));
        assert_eq!(ui.snapshot().notifications.len(), 1);
    }
}
