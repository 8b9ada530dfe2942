use std::sync::Arc;

use log::debug;

use crate::client::DeviceApi;
use crate::error::{AmpError, Result};
use crate::models::{
    Group, GroupCreate, GroupId, GroupUpdate, MultiZoneUpdate, SourceId, Status, Zone, ZoneId,
    ZoneUpdate,
};
use crate::sender::VolumeSender;
use crate::source_view::{ControlTarget, SourceView};
use crate::state::StateCache;
use crate::volume::{
    aggregate_group_volume, aggregate_mute, aggregate_volume, clamp_volume,
    representative_volume_updates,
};

/// Turns user gestures into optimistic cache edits and device requests.
///
/// Volume gestures go through the `VolumeSender` as relative deltas. Mute
/// gestures are sent right away.
pub struct Controller {
    api: Arc<dyn DeviceApi>,
    cache: StateCache,
    sender: VolumeSender,
}

impl Controller {
    pub fn new(api: Arc<dyn DeviceApi>, cache: StateCache, sender: VolumeSender) -> Self {
        Self { api, cache, sender }
    }

    pub fn cache(&self) -> &StateCache {
        &self.cache
    }

    pub fn source_view(&self, source_id: SourceId) -> Option<SourceView> {
        self.cache
            .status()
            .map(|status| SourceView::build(&status, source_id))
    }

    fn loaded_status(&self) -> Result<Status> {
        self.cache
            .status()
            .ok_or_else(|| AmpError::Communication("no status received yet".to_string()))
    }

    pub fn set_volume(&self, target: ControlTarget, vol_f: f64) -> Result<()> {
        match target {
            ControlTarget::Source(id) => self.set_source_volume(id, vol_f),
            ControlTarget::Group(id) => self.set_group_volume(id, vol_f),
            ControlTarget::Zone(id) => self.set_zone_volume(id, vol_f),
        }
    }

    pub fn toggle_mute(&self, target: ControlTarget) -> Result<()> {
        match target {
            ControlTarget::Source(id) => self.toggle_source_mute(id),
            ControlTarget::Group(id) => self.toggle_group_mute(id),
            ControlTarget::Zone(id) => self.toggle_zone_mute(id),
        }
    }

    /// Move the source's mean volume to `vol_f`, shifting every zone equally.
    pub fn set_source_volume(&self, source_id: SourceId, vol_f: f64) -> Result<()> {
        let zones = self.cache.zones_for_source(source_id);
        if zones.is_empty() {
            return Ok(());
        }
        let delta = clamp_volume(vol_f) - aggregate_volume(&zones);
        let updates = representative_volume_updates(clamp_volume(vol_f), &zones);
        self.shift(&zones, &updates, delta);
        Ok(())
    }

    /// Move the group's displayed (midpoint) volume to `vol_f`.
    pub fn set_group_volume(&self, group_id: GroupId, vol_f: f64) -> Result<()> {
        let status = self.loaded_status()?;
        let group = status
            .group(group_id)
            .ok_or(AmpError::GroupNotFound(group_id))?;
        let zones = status.zones_for_group(group);
        if zones.is_empty() {
            return Ok(());
        }
        let delta = clamp_volume(vol_f) - aggregate_group_volume(&zones);
        let updates: Vec<(ZoneId, f64)> = zones
            .iter()
            .map(|zone| (zone.id, clamp_volume(zone.vol_f + delta)))
            .collect();
        self.shift(&zones, &updates, delta);
        Ok(())
    }

    pub fn set_zone_volume(&self, zone_id: ZoneId, vol_f: f64) -> Result<()> {
        let zone = self
            .cache
            .zone(zone_id)
            .ok_or(AmpError::ZoneNotFound(zone_id))?;
        let target = clamp_volume(vol_f);
        let delta = target - zone.vol_f;
        self.shift(&[zone], &[(zone_id, target)], delta);
        Ok(())
    }

    fn shift(&self, zones: &[Zone], updates: &[(ZoneId, f64)], delta: f64) {
        if delta == 0.0 {
            return;
        }
        debug!("shifting {} zone(s) by {:+.3}", zones.len(), delta);
        self.cache.apply_zone_volumes(updates);
        let ids: Vec<ZoneId> = zones.iter().map(|zone| zone.id).collect();
        self.sender.adjust(&ids, delta);
    }

    pub fn toggle_source_mute(&self, source_id: SourceId) -> Result<()> {
        let zones = self.cache.zones_for_source(source_id);
        if zones.is_empty() {
            return Ok(());
        }
        let mute = !aggregate_mute(&zones);
        let ids: Vec<ZoneId> = zones.iter().map(|zone| zone.id).collect();
        self.cache.set_zones_mute(&ids, mute);
        let status = self.api.update_zones(&MultiZoneUpdate::mute(ids, mute))?;
        self.accept(status);
        Ok(())
    }

    pub fn toggle_group_mute(&self, group_id: GroupId) -> Result<()> {
        let status = self.loaded_status()?;
        let group = status
            .group(group_id)
            .ok_or(AmpError::GroupNotFound(group_id))?;
        let mute = !aggregate_mute(&status.zones_for_group(group));
        self.cache.set_group_mute(group_id, mute);
        let status = self.api.update_group(group_id, &GroupUpdate::mute(mute))?;
        self.accept(status);
        Ok(())
    }

    pub fn toggle_zone_mute(&self, zone_id: ZoneId) -> Result<()> {
        let zone = self
            .cache
            .zone(zone_id)
            .ok_or(AmpError::ZoneNotFound(zone_id))?;
        let mute = !zone.mute;
        self.cache.set_zone_mute(zone_id, mute);
        let status = self.api.update_zone(zone_id, &ZoneUpdate::mute(mute))?;
        self.accept(status);
        Ok(())
    }

    /// Create a group from zones present in the last snapshot.
    pub fn create_group(&self, name: &str, zone_ids: &[ZoneId]) -> Result<Group> {
        let status = self.loaded_status()?;
        if let Some(missing) = zone_ids.iter().find(|id| status.zone(**id).is_none()) {
            return Err(AmpError::ZoneNotFound(*missing));
        }
        self.api.create_group(&GroupCreate {
            name: name.to_string(),
            zones: zone_ids.to_vec(),
        })
    }

    pub fn delete_group(&self, group_id: GroupId) -> Result<()> {
        let status = self.api.delete_group(group_id)?;
        self.accept(status);
        Ok(())
    }

    /// Take a PATCH response as the new state unless volume deltas are still
    /// outstanding, in which case the next poll catches up instead.
    fn accept(&self, status: Status) {
        if self.sender.is_idle() {
            self.cache.replace(status);
        }
    }
}
