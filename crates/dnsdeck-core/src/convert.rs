// ── Wire → domain conversion ──
//
// Maps `dnsdeck-api` wire records into canonical model types.

use dnsdeck_api::{UserRecord, ZoneRecord};
use tracing::warn;

use crate::model::{Role, User, Zone};

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        // Unknown roles get the least-privileged role.
        let role = record.role.parse::<Role>().unwrap_or_else(|_| {
            warn!(role = %record.role, username = %record.username, "unknown role, treating as user");
            Role::User
        });
        Self {
            username: record.username,
            role,
            extra: record.extra,
        }
    }
}

impl From<ZoneRecord> for Zone {
    fn from(record: ZoneRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            zone_type: record.zone_type,
            record_count: record.record_count,
            enabled: record.enabled,
            extra: record.extra,
        }
    }
}
