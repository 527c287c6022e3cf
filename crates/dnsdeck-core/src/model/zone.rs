use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::Entity;

pub type ZoneId = u64;

/// Serialized names of the typed `Zone` fields. These never live in
/// `extra`.
const ZONE_FIELDS: [&str; 5] = ["id", "name", "zone_type", "record_count", "enabled"];

/// A DNS zone as projected into the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub zone_type: Option<String>,
    pub record_count: Option<u32>,
    pub enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Zone {
    pub fn new(id: ZoneId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            zone_type: None,
            record_count: None,
            enabled: true,
            extra: Map::new(),
        }
    }
}

/// Partial zone update. `None` leaves a field untouched; `extra` keys are
/// merged one level deep. The id is not patchable, and `extra` keys that
/// name a typed field are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZonePatch {
    pub name: Option<String>,
    pub zone_type: Option<String>,
    pub record_count: Option<u32>,
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ZonePatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl Entity for Zone {
    type Id = ZoneId;
    type Patch = ZonePatch;

    fn id(&self) -> &ZoneId {
        &self.id
    }

    fn apply(&mut self, patch: ZonePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(zone_type) = patch.zone_type {
            self.zone_type = Some(zone_type);
        }
        if let Some(count) = patch.record_count {
            self.record_count = Some(count);
        }
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        self.extra.extend(
            patch
                .extra
                .into_iter()
                .filter(|(key, _)| !ZONE_FIELDS.contains(&key.as_str())),
        );
    }
}
