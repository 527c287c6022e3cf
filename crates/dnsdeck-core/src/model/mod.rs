// ── Domain model ──
//
// Canonical types shared by the stores. Wire types from `dnsdeck-api`
// are converted into these in `crate::convert`.

pub mod notification;
pub mod preference;
pub mod session;
pub mod user;
pub mod zone;

pub use notification::{NewNotification, Notification, NotificationId, NotificationKind};
pub use preference::Theme;
pub use session::Session;
pub use user::{Credential, Role, User};
pub use zone::{Zone, ZoneId, ZonePatch};
