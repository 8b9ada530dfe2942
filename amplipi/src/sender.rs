use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::client::DeviceApi;
use crate::models::{MultiZoneUpdate, ZoneId};
use crate::throttle::{Throttler, ZoneSetKey};

#[derive(Debug, Clone, PartialEq)]
pub enum SendEvent {
    Sent { zones: Vec<ZoneId>, delta: f64 },
    Failed { zones: Vec<ZoneId>, error: String },
}

#[derive(Debug)]
struct VolumeJob {
    key: ZoneSetKey,
    delta: f64,
}

/// Sends relative volume changes as bulk zone PATCHes, one in flight per
/// zone set, merging whatever arrives in the meantime.
pub struct VolumeSender {
    throttler: Arc<Mutex<Throttler>>,
    queue: Option<mpsc::Sender<VolumeJob>>,
    worker: Option<JoinHandle<()>>,
}

impl VolumeSender {
    pub fn start(
        api: Arc<dyn DeviceApi>,
        stale_after: Duration,
    ) -> (Self, mpsc::Receiver<SendEvent>) {
        let throttler = Arc::new(Mutex::new(Throttler::new(stale_after)));
        let (queue, jobs) = mpsc::channel();
        let (events, event_receiver) = mpsc::channel();

        let worker_throttler = Arc::clone(&throttler);
        let worker = std::thread::spawn(move || {
            Self::worker_loop(api, worker_throttler, jobs, events);
        });

        let sender = Self {
            throttler,
            queue: Some(queue),
            worker: Some(worker),
        };
        (sender, event_receiver)
    }

    /// Shift every zone in `zone_ids` by `delta`.
    pub fn adjust(&self, zone_ids: &[ZoneId], delta: f64) {
        let key = ZoneSetKey::new(zone_ids);
        if key.is_empty() || delta == 0.0 || delta.is_nan() {
            return;
        }

        let send_now = lock(&self.throttler).submit(&key, delta, Instant::now());
        let Some(delta) = send_now else {
            log::debug!("merged {:+.3} into pending delta for {:?}", delta, key.zone_ids());
            return;
        };

        let Some(queue) = self.queue.as_ref() else {
            lock(&self.throttler).reset(&key);
            return;
        };
        if queue.send(VolumeJob { key: key.clone(), delta }).is_err() {
            log::error!("volume worker is gone, dropping delta for {:?}", key.zone_ids());
            lock(&self.throttler).reset(&key);
        }
    }

    /// True when no zone set has a volume request outstanding.
    pub fn is_idle(&self) -> bool {
        lock(&self.throttler).in_flight() == 0
    }

    fn worker_loop(
        api: Arc<dyn DeviceApi>,
        throttler: Arc<Mutex<Throttler>>,
        jobs: mpsc::Receiver<VolumeJob>,
        events: mpsc::Sender<SendEvent>,
    ) {
        log::debug!("volume worker started");

        while let Ok(job) = jobs.recv() {
            let zones = job.key.zone_ids().to_vec();
            let mut delta = job.delta;

            loop {
                let update = MultiZoneUpdate::volume_delta(zones.clone(), delta);
                match api.update_zones(&update) {
                    Ok(_) => {
                        let _ = events.send(SendEvent::Sent {
                            zones: zones.clone(),
                            delta,
                        });
                    }
                    Err(e) => {
                        // only this request's delta is lost; merged gestures still go out
                        log::warn!("volume update for {:?} failed: {}", zones, e);
                        let _ = events.send(SendEvent::Failed {
                            zones: zones.clone(),
                            error: e.to_string(),
                        });
                    }
                }

                match lock(&throttler).complete(&job.key, Instant::now()) {
                    Some(pending) => {
                        log::debug!("flushing merged delta {:+.3} for {:?}", pending, zones);
                        delta = pending;
                    }
                    None => break,
                }
            }
        }

        log::debug!("volume worker stopped");
    }

    pub fn stop(&mut self) {
        self.queue.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("volume worker panicked");
            }
        }
    }
}

impl Drop for VolumeSender {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(throttler: &Mutex<Throttler>) -> MutexGuard<'_, Throttler> {
    throttler.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockDeviceApi;
    use crate::error::AmpError;
    use crate::models::Status;
    use crate::throttle::DEFAULT_STALE_AFTER;

    const WAIT: Duration = Duration::from_secs(2);

    #[test]
    fn test_adjust_sends_bulk_delta() {
        let mut api = MockDeviceApi::new();
        api.expect_update_zones()
            .withf(|update| {
                update.zones == vec![ZoneId(1), ZoneId(2)]
                    && update.update.vol_delta_f == Some(0.25)
            })
            .times(1)
            .returning(|_| Ok(Status::default()));

        let (mut sender, events) = VolumeSender::start(Arc::new(api), DEFAULT_STALE_AFTER);
        sender.adjust(&[ZoneId(2), ZoneId(1)], 0.25);

        assert_eq!(
            events.recv_timeout(WAIT).unwrap(),
            SendEvent::Sent {
                zones: vec![ZoneId(1), ZoneId(2)],
                delta: 0.25
            }
        );
        sender.stop();
        assert!(sender.is_idle());
    }

    #[test]
    fn test_zero_delta_is_not_sent() {
        let mut api = MockDeviceApi::new();
        api.expect_update_zones().times(0);

        let (mut sender, _events) = VolumeSender::start(Arc::new(api), DEFAULT_STALE_AFTER);
        sender.adjust(&[ZoneId(1)], 0.0);
        sender.adjust(&[], 0.1);
        sender.stop();
    }

    #[test]
    fn test_failure_releases_zone_set() {
        let mut api = MockDeviceApi::new();
        api.expect_update_zones()
            .returning(|_| Err(AmpError::Communication("timed out".to_string())));

        let (mut sender, events) = VolumeSender::start(Arc::new(api), DEFAULT_STALE_AFTER);
        sender.adjust(&[ZoneId(4)], -0.1);

        match events.recv_timeout(WAIT).unwrap() {
            SendEvent::Failed { zones, error } => {
                assert_eq!(zones, vec![ZoneId(4)]);
                assert!(error.contains("timed out"));
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
        sender.stop();
        assert!(sender.is_idle());
    }

    #[test]
    fn test_failure_still_flushes_merged_delta() {
        let (gate_sender, gate) = mpsc::channel::<()>();
        let gate = Mutex::new(gate);
        let deltas = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&deltas);
        let mut api = MockDeviceApi::new();
        api.expect_update_zones().returning(move |update| {
            let first = {
                let mut sent = recorded.lock().unwrap();
                sent.push(update.update.vol_delta_f.unwrap());
                sent.len() == 1
            };
            if first {
                gate.lock().unwrap().recv().unwrap();
                Err(AmpError::Communication("timed out".to_string()))
            } else {
                Ok(Status::default())
            }
        });

        let (mut sender, events) = VolumeSender::start(Arc::new(api), DEFAULT_STALE_AFTER);
        sender.adjust(&[ZoneId(4)], -0.1);
        sender.adjust(&[ZoneId(4)], -0.05);
        sender.adjust(&[ZoneId(4)], -0.05);
        gate_sender.send(()).unwrap();

        assert!(matches!(
            events.recv_timeout(WAIT).unwrap(),
            SendEvent::Failed { .. }
        ));
        match events.recv_timeout(WAIT).unwrap() {
            SendEvent::Sent { zones, delta } => {
                assert_eq!(zones, vec![ZoneId(4)]);
                assert!((delta + 0.1).abs() < 1e-9);
            }
            other => panic!("Expected Sent, got {:?}", other),
        }
        sender.stop();

        assert!(sender.is_idle());
        assert_eq!(deltas.lock().unwrap().len(), 2);
    }
}
