use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::{GroupId, SourceId, Status, Zone, ZoneId};
use crate::volume::clamp_volume;

/// Local mutation epoch captured when a poll is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTicket {
    epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Applied,
    /// A local change landed after the poll started; the response is stale.
    Discarded,
}

#[derive(Debug, Default)]
struct Inner {
    status: Option<Status>,
    epoch: u64,
}

/// Shared snapshot of the device state plus optimistic local edits.
///
/// Every optimistic edit bumps an epoch. A poll response is only applied if
/// no edit happened between `begin_poll` and `apply_poll`, so a response that
/// was already in flight can never overwrite a newer user gesture.
pub struct StateCache {
    inner: Arc<RwLock<Inner>>,
}

impl StateCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_loaded(&self) -> bool {
        self.read().status.is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.read().epoch
    }

    pub fn status(&self) -> Option<Status> {
        self.read().status.clone()
    }

    pub fn zone(&self, id: ZoneId) -> Option<Zone> {
        self.read()
            .status
            .as_ref()
            .and_then(|status| status.zone(id).cloned())
    }

    pub fn zones_for_source(&self, source_id: SourceId) -> Vec<Zone> {
        self.read()
            .status
            .as_ref()
            .map(|status| status.zones_for_source(source_id))
            .unwrap_or_default()
    }

    pub fn begin_poll(&self) -> PollTicket {
        PollTicket {
            epoch: self.read().epoch,
        }
    }

    pub fn apply_poll(&self, ticket: PollTicket, status: Status) -> PollOutcome {
        let mut inner = self.write();
        if inner.epoch != ticket.epoch {
            log::debug!(
                "discarding poll started at epoch {} (now {})",
                ticket.epoch,
                inner.epoch
            );
            return PollOutcome::Discarded;
        }
        inner.status = Some(status);
        PollOutcome::Applied
    }

    /// Install a status that is known to be newer than any local edit, such as
    /// the body of a PATCH response.
    pub fn replace(&self, status: Status) {
        let mut inner = self.write();
        inner.status = Some(status);
        inner.epoch += 1;
    }

    pub fn apply_zone_volumes(&self, updates: &[(ZoneId, f64)]) {
        self.mutate(|status| {
            for (id, vol_f) in updates {
                if let Some(zone) = status.zone_mut(*id) {
                    zone.vol_f = clamp_volume(*vol_f);
                }
            }
        });
    }

    pub fn set_zone_mute(&self, id: ZoneId, mute: bool) {
        self.set_zones_mute(&[id], mute);
    }

    pub fn set_zones_mute(&self, ids: &[ZoneId], mute: bool) {
        self.mutate(|status| {
            for id in ids {
                if let Some(zone) = status.zone_mut(*id) {
                    zone.mute = mute;
                }
            }
        });
    }

    /// Mute or unmute a group and all of its member zones.
    pub fn set_group_mute(&self, id: GroupId, mute: bool) {
        self.mutate(|status| {
            let members = match status.groups.iter_mut().find(|group| group.id == id) {
                Some(group) => {
                    group.mute = Some(mute);
                    group.zones.clone()
                }
                None => return,
            };
            for zone_id in members {
                if let Some(zone) = status.zone_mut(zone_id) {
                    zone.mute = mute;
                }
            }
        });
    }

    fn mutate<F>(&self, f: F)
    where
        F: FnOnce(&mut Status),
    {
        let mut inner = self.write();
        inner.epoch += 1;
        if let Some(status) = inner.status.as_mut() {
            f(status);
        }
    }
}

impl Default for StateCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StateCache {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
