//! Representative volume and mute for composite (source and group) sliders.
//!
//! Source sliders show the arithmetic mean of their zones. Group sliders show
//! the midpoint of the quietest and loudest member.

use crate::models::{Zone, ZoneId};

pub const VOLUME_MIN: f64 = 0.0;
pub const VOLUME_MAX: f64 = 1.0;

/// Clamp a volume into `[0.0, 1.0]`. NaN maps to `0.0`.
pub fn clamp_volume(vol_f: f64) -> f64 {
    if vol_f.is_nan() {
        return VOLUME_MIN;
    }
    vol_f.clamp(VOLUME_MIN, VOLUME_MAX)
}

/// Clamp a relative change into `[-1.0, 1.0]`. NaN maps to `0.0`.
pub fn clamp_delta(delta: f64) -> f64 {
    if delta.is_nan() {
        return 0.0;
    }
    delta.clamp(-VOLUME_MAX, VOLUME_MAX)
}

/// Mean `vol_f` of `zones`, or `0.0` for an empty set.
pub fn aggregate_volume(zones: &[Zone]) -> f64 {
    if zones.is_empty() {
        return 0.0;
    }
    let total: f64 = zones.iter().map(|zone| zone.vol_f).sum();
    total / zones.len() as f64
}

/// True only when every zone is muted. Vacuously true for an empty set.
pub fn aggregate_mute(zones: &[Zone]) -> bool {
    zones.iter().all(|zone| zone.mute)
}

/// Move every zone by the same additive delta so the set's mean lands on
/// `new_value`, clamping each zone into range before it is emitted.
///
/// Clamped zones absorb less than the full delta, so the resulting mean can
/// fall short of `new_value`.
pub fn apply_representative_volume<F>(new_value: f64, zones: &[Zone], mut emit: F)
where
    F: FnMut(ZoneId, f64),
{
    let delta = new_value - aggregate_volume(zones);
    for zone in zones {
        emit(zone.id, clamp_volume(zone.vol_f + delta));
    }
}

/// Collecting form of [`apply_representative_volume`].
pub fn representative_volume_updates(new_value: f64, zones: &[Zone]) -> Vec<(ZoneId, f64)> {
    let mut updates = Vec::with_capacity(zones.len());
    apply_representative_volume(new_value, zones, |id, vol_f| updates.push((id, vol_f)));
    updates
}

/// Displayed volume of a group: midpoint of the min and max member volume.
/// A single member shows its own volume; no members shows `0.0`.
pub fn aggregate_group_volume(zones: &[Zone]) -> f64 {
    match zones {
        [] => 0.0,
        [only] => only.vol_f,
        _ => {
            let (min, max) = zones.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(min, max), zone| (min.min(zone.vol_f), max.max(zone.vol_f)),
            );
            min * 0.5 + max * 0.5
        }
    }
}
