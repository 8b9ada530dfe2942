use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::client::DeviceApi;
use crate::state::{PollOutcome, StateCache};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Updated,
    /// The response raced a local edit and was dropped.
    Discarded,
    /// The device could not be reached; the next interval retries.
    Disconnected(String),
}

/// Background thread that refreshes a `StateCache` from `GET /api`.
pub struct Poller {
    handle: Option<JoinHandle<()>>,
    shutdown_sender: mpsc::Sender<()>,
}

impl Poller {
    pub fn start(
        api: Arc<dyn DeviceApi>,
        cache: StateCache,
        interval: Duration,
        events: mpsc::Sender<PollEvent>,
    ) -> Self {
        let (shutdown_sender, shutdown_receiver) = mpsc::channel();

        let handle = std::thread::spawn(move || {
            Self::polling_loop(api, cache, interval, events, shutdown_receiver);
        });

        Self {
            handle: Some(handle),
            shutdown_sender,
        }
    }

    /// Fetch one snapshot and apply it through a poll ticket.
    pub fn poll_once(api: &dyn DeviceApi, cache: &StateCache) -> PollEvent {
        let ticket = cache.begin_poll();
        match api.status() {
            Ok(status) => match cache.apply_poll(ticket, status) {
                PollOutcome::Applied => PollEvent::Updated,
                PollOutcome::Discarded => PollEvent::Discarded,
            },
            Err(e) => {
                log::warn!("poll failed: {}", e);
                PollEvent::Disconnected(e.to_string())
            }
        }
    }

    fn polling_loop(
        api: Arc<dyn DeviceApi>,
        cache: StateCache,
        interval: Duration,
        events: mpsc::Sender<PollEvent>,
        shutdown_receiver: mpsc::Receiver<()>,
    ) {
        log::info!("poller started, interval {:?}", interval);

        loop {
            let event = Self::poll_once(api.as_ref(), &cache);
            if events.send(event).is_err() {
                log::debug!("poll event receiver dropped, stopping poller");
                break;
            }

            match shutdown_receiver.recv_timeout(interval) {
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }

        log::info!("poller stopped");
    }

    pub fn stop(&mut self) {
        let _ = self.shutdown_sender.send(());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("poller thread panicked");
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockDeviceApi;
    use crate::error::AmpError;
    use crate::models::{Status, Zone, ZoneId};

    fn status_with_volume(vol_f: f64) -> Status {
        Status {
            zones: vec![Zone::new(1, vol_f).with_source(0)],
            ..Status::default()
        }
    }

    #[test]
    fn test_poll_once_updates_cache() {
        let mut api = MockDeviceApi::new();
        api.expect_status().returning(|| Ok(status_with_volume(0.3)));
        let cache = StateCache::new();

        assert_eq!(Poller::poll_once(&api, &cache), PollEvent::Updated);
        assert_eq!(cache.zone(ZoneId(1)).unwrap().vol_f, 0.3);
    }

    #[test]
    fn test_poll_once_reports_disconnect() {
        let mut api = MockDeviceApi::new();
        api.expect_status()
            .returning(|| Err(AmpError::Communication("connection refused".to_string())));
        let cache = StateCache::new();

        match Poller::poll_once(&api, &cache) {
            PollEvent::Disconnected(msg) => assert!(msg.contains("connection refused")),
            other => panic!("Expected Disconnected, got {:?}", other),
        }
        assert!(!cache.is_loaded());
    }

    #[test]
    fn test_poll_once_discards_when_edited_mid_flight() {
        let cache = StateCache::new();
        cache.replace(status_with_volume(0.5));

        let edit_cache = cache.clone();
        let mut api = MockDeviceApi::new();
        api.expect_status().returning(move || {
            // a user gesture lands while the request is outstanding
            edit_cache.apply_zone_volumes(&[(ZoneId(1), 0.8)]);
            Ok(status_with_volume(0.5))
        });

        assert_eq!(Poller::poll_once(&api, &cache), PollEvent::Discarded);
        assert_eq!(cache.zone(ZoneId(1)).unwrap().vol_f, 0.8);
    }

    #[test]
    fn test_start_and_stop() {
        let mut api = MockDeviceApi::new();
        api.expect_status().returning(|| Ok(status_with_volume(0.1)));
        let cache = StateCache::new();
        let (sender, receiver) = mpsc::channel();

        let mut poller = Poller::start(
            Arc::new(api),
            cache.clone(),
            Duration::from_millis(10),
            sender,
        );
        let first = receiver.recv_timeout(Duration::from_secs(2)).unwrap();
        poller.stop();

        assert_eq!(first, PollEvent::Updated);
        assert!(cache.is_loaded());
    }
}
