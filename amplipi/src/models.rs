use serde::{Deserialize, Serialize};

use crate::volume::{clamp_delta, clamp_volume};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub u32);

/// Wire encoding of a zone's source slot: `-1` means unassigned.
mod source_slot {
    use super::SourceId;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const UNASSIGNED: i64 = -1;

    pub fn serialize<S>(value: &Option<SourceId>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(id) => serializer.serialize_i64(i64::from(id.0)),
            None => serializer.serialize_i64(UNASSIGNED),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SourceId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<i64>::deserialize(deserializer)?;
        Ok(raw
            .filter(|id| *id >= 0)
            .and_then(|id| u32::try_from(id).ok())
            .map(SourceId))
    }
}

/// A single addressable audio output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    #[serde(default)]
    pub name: String,
    #[serde(with = "source_slot", default)]
    pub source_id: Option<SourceId>,
    #[serde(default)]
    pub vol_f: f64,
    #[serde(default)]
    pub vol_min: f64,
    #[serde(default)]
    pub vol_max: f64,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub disabled: bool,
}

impl Zone {
    pub fn new(id: u32, vol_f: f64) -> Self {
        Self {
            id: ZoneId(id),
            name: format!("Zone {}", id),
            source_id: None,
            vol_f,
            vol_min: 0.0,
            vol_max: 0.0,
            mute: false,
            disabled: false,
        }
    }

    pub fn with_source(mut self, source_id: u32) -> Self {
        self.source_id = Some(SourceId(source_id));
        self
    }

    pub fn muted(mut self, mute: bool) -> Self {
        self.mute = mute;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// A user-defined collection of zones controlled together.
///
/// `vol_f` and `mute` as reported by the device are display values only; the
/// client recomputes the group volume from member zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<SourceId>,
    #[serde(default)]
    pub zones: Vec<ZoneId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vol_f: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mute: Option<bool>,
}

impl Group {
    pub fn new(id: u32, name: &str, zones: &[u32]) -> Self {
        Self {
            id: GroupId(id),
            name: name.to_string(),
            source_id: None,
            zones: zones.iter().copied().map(ZoneId).collect(),
            vol_f: None,
            mute: None,
        }
    }

    pub fn contains(&self, zone_id: ZoneId) -> bool {
        self.zones.contains(&zone_id)
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: SourceId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: u32,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub is_streamer: bool,
}

/// Full system snapshot returned by `GET /api`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub streams: Vec<Stream>,
    #[serde(default)]
    pub presets: Vec<Preset>,
    #[serde(default)]
    pub info: Info,
}

impl Status {
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.id == id)
    }

    pub fn zone_mut(&mut self, id: ZoneId) -> Option<&mut Zone> {
        self.zones.iter_mut().find(|zone| zone.id == id)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }

    pub fn source(&self, id: SourceId) -> Option<&Source> {
        self.sources.iter().find(|source| source.id == id)
    }

    /// Enabled zones currently routed to `source_id`, in snapshot order.
    pub fn zones_for_source(&self, source_id: SourceId) -> Vec<Zone> {
        self.zones
            .iter()
            .filter(|zone| !zone.disabled && zone.source_id == Some(source_id))
            .cloned()
            .collect()
    }

    /// Enabled member zones of a group, in snapshot order.
    pub fn zones_for_group(&self, group: &Group) -> Vec<Zone> {
        self.zones
            .iter()
            .filter(|zone| !zone.disabled && group.contains(zone.id))
            .cloned()
            .collect()
    }
}

/// Body of `PATCH /api/zones/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vol_f: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vol_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vol_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mute: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

impl ZoneUpdate {
    pub fn volume(vol_f: f64) -> Self {
        Self {
            vol_f: Some(clamp_volume(vol_f)),
            ..Self::default()
        }
    }

    pub fn mute(mute: bool) -> Self {
        Self {
            mute: Some(mute),
            ..Self::default()
        }
    }
}

/// The `update` half of a bulk zone request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneBulkUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vol_f: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vol_delta_f: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mute: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<i64>,
}

/// Body of `PATCH /api/zones`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiZoneUpdate {
    pub zones: Vec<ZoneId>,
    pub update: ZoneBulkUpdate,
}

impl MultiZoneUpdate {
    pub fn volume_delta(zones: Vec<ZoneId>, delta: f64) -> Self {
        Self {
            zones,
            update: ZoneBulkUpdate {
                vol_delta_f: Some(clamp_delta(delta)),
                ..ZoneBulkUpdate::default()
            },
        }
    }

    pub fn mute(zones: Vec<ZoneId>, mute: bool) -> Self {
        Self {
            zones,
            update: ZoneBulkUpdate {
                mute: Some(mute),
                ..ZoneBulkUpdate::default()
            },
        }
    }

    pub fn source(zones: Vec<ZoneId>, source_id: Option<SourceId>) -> Self {
        Self {
            zones,
            update: ZoneBulkUpdate {
                source_id: Some(
                    source_id.map_or(source_slot::UNASSIGNED, |id| i64::from(id.0)),
                ),
                ..ZoneBulkUpdate::default()
            },
        }
    }
}

/// Body of `PATCH /api/groups/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vol_f: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mute: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<ZoneId>>,
}

impl GroupUpdate {
    pub fn mute(mute: bool) -> Self {
        Self {
            mute: Some(mute),
            ..Self::default()
        }
    }
}

/// Body of `POST /api/group`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCreate {
    pub name: String,
    pub zones: Vec<ZoneId>,
}
