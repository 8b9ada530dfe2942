//! Coalescing of outbound volume changes.
//!
//! Each zone set has at most one volume request in flight. Deltas that arrive
//! while a request is outstanding are summed into a pending delta and flushed
//! as one follow-up request when the outstanding one completes.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::models::ZoneId;

pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(5);

/// Sorted, de-duplicated set of zone ids identifying one throttled target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoneSetKey(Vec<ZoneId>);

impl ZoneSetKey {
    pub fn new(zone_ids: &[ZoneId]) -> Self {
        let mut ids = zone_ids.to_vec();
        ids.sort();
        ids.dedup();
        Self(ids)
    }

    pub fn zone_ids(&self) -> &[ZoneId] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrottleState {
    Idle,
    Sending { since: Instant, pending: f64 },
}

#[derive(Debug, Clone)]
pub struct VolumeThrottle {
    state: ThrottleState,
    stale_after: Duration,
}

impl VolumeThrottle {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            state: ThrottleState::Idle,
            stale_after,
        }
    }

    pub fn state(&self) -> ThrottleState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, ThrottleState::Idle)
    }

    /// Offer a delta. Returns the delta to send now, or `None` when it was
    /// merged into the pending delta of an outstanding request.
    ///
    /// A request outstanding for longer than `stale_after` is abandoned and
    /// its pending delta is sent together with `delta`.
    pub fn submit(&mut self, delta: f64, now: Instant) -> Option<f64> {
        match self.state {
            ThrottleState::Idle => {
                self.state = ThrottleState::Sending {
                    since: now,
                    pending: 0.0,
                };
                Some(delta)
            }
            ThrottleState::Sending { since, pending } => {
                if now.saturating_duration_since(since) >= self.stale_after {
                    log::warn!(
                        "volume request outstanding for {:?}, abandoning it",
                        now.saturating_duration_since(since)
                    );
                    self.state = ThrottleState::Sending {
                        since: now,
                        pending: 0.0,
                    };
                    Some(pending + delta)
                } else {
                    self.state = ThrottleState::Sending {
                        since,
                        pending: pending + delta,
                    };
                    None
                }
            }
        }
    }

    /// Mark the outstanding request finished. Returns the merged delta to
    /// send next, leaving the throttle in `Sending`, or `None` and goes idle.
    pub fn complete(&mut self, now: Instant) -> Option<f64> {
        match self.state {
            ThrottleState::Sending { pending, .. } if pending != 0.0 => {
                self.state = ThrottleState::Sending {
                    since: now,
                    pending: 0.0,
                };
                Some(pending)
            }
            _ => {
                self.state = ThrottleState::Idle;
                None
            }
        }
    }
}

impl Default for VolumeThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_AFTER)
    }
}

/// Throttles for every zone set with activity.
#[derive(Debug)]
pub struct Throttler {
    throttles: HashMap<ZoneSetKey, VolumeThrottle>,
    stale_after: Duration,
}

impl Throttler {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            throttles: HashMap::new(),
            stale_after,
        }
    }

    pub fn submit(&mut self, key: &ZoneSetKey, delta: f64, now: Instant) -> Option<f64> {
        let stale_after = self.stale_after;
        self.throttles
            .entry(key.clone())
            .or_insert_with(|| VolumeThrottle::new(stale_after))
            .submit(delta, now)
    }

    pub fn complete(&mut self, key: &ZoneSetKey, now: Instant) -> Option<f64> {
        let next = self
            .throttles
            .get_mut(key)
            .and_then(|throttle| throttle.complete(now));
        if next.is_none() {
            self.throttles.remove(key);
        }
        next
    }

    /// Forget a zone set whose delta could not be queued.
    pub fn reset(&mut self, key: &ZoneSetKey) {
        self.throttles.remove(key);
    }

    pub fn in_flight(&self) -> usize {
        self.throttles.values().filter(|t| !t.is_idle()).count()
    }
}

impl Default for Throttler {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_AFTER)
    }
}
