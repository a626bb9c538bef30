use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Error;
use crate::fixtures::{Fixture, FixtureGateway, Subscription};

/// Identifies one `start` of the live stream.
pub type StreamId = u64;

struct ActiveStream {
    id: StreamId,
    subscription: Subscription,
}

/// Sole owner of the push subscription.
///
/// At most one channel is open at any time: `start` always closes the
/// previous channel before opening the next, and dropping the manager
/// closes whatever is still open.
pub struct LiveStreamManager {
    gateway: Arc<dyn FixtureGateway>,
    active: Option<ActiveStream>,
    last_id: StreamId,
}

impl LiveStreamManager {
    pub fn new(gateway: Arc<dyn FixtureGateway>) -> Self {
        LiveStreamManager {
            gateway,
            active: None,
            last_id: 0,
        }
    }

    /// Open a new channel, closing the current one first.
    ///
    /// Both callbacks receive the id returned here so the caller can tell
    /// a current stream from a replaced one.
    pub fn start<U, E>(&mut self, on_update: U, on_error: E) -> StreamId
    where
        U: Fn(StreamId, Vec<Fixture>) + Send + Sync + 'static,
        E: FnOnce(StreamId, Error) + Send + 'static,
    {
        self.stop();

        self.last_id += 1;
        let id = self.last_id;
        let subscription = self.gateway.subscribe(
            Box::new(move |fixtures| on_update(id, fixtures)),
            Box::new(move |err| on_error(id, err)),
        );
        info!("[{}] Live stream {} started", self.gateway.name(), id);
        self.active = Some(ActiveStream { id, subscription });
        id
    }

    /// Close the open channel, if any. Returns whether one was open.
    pub fn stop(&mut self) -> bool {
        match self.active.take() {
            Some(mut stream) => {
                stream.subscription.unsubscribe();
                info!("[{}] Live stream {} stopped", self.gateway.name(), stream.id);
                true
            }
            None => false,
        }
    }

    /// Close the channel only if it is still the one identified by `id`.
    pub fn stop_stream(&mut self, id: StreamId) -> bool {
        if self.active_id() == Some(id) {
            self.stop()
        } else {
            debug!("Live stream {} already replaced or stopped", id);
            false
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_id(&self) -> Option<StreamId> {
        self.active.as_ref().map(|s| s.id)
    }
}

impl Drop for LiveStreamManager {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::testing::{fixture, ScriptedGateway};
    use std::sync::Mutex;

    fn manager() -> (Arc<ScriptedGateway>, LiveStreamManager) {
        let gateway = ScriptedGateway::new();
        let manager = LiveStreamManager::new(gateway.clone());
        (gateway, manager)
    }

    #[test]
    fn test_start_twice_leaves_one_channel() {
        let (gateway, mut manager) = manager();
        let first = manager.start(|_, _| {}, |_, _| {});
        let second = manager.start(|_, _| {}, |_, _| {});

        assert_ne!(first, second);
        assert_eq!(gateway.opened(), 2);
        assert!(gateway.is_released(0));
        assert!(!gateway.is_released(1));
        assert_eq!(gateway.open_now(), 1);
        assert_eq!(manager.active_id(), Some(second));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (gateway, mut manager) = manager();
        assert!(!manager.stop());

        manager.start(|_, _| {}, |_, _| {});
        assert!(manager.stop());
        assert!(!manager.stop());
        assert!(!manager.is_active());
        assert_eq!(gateway.open_now(), 0);
    }

    #[test]
    fn test_stop_stream_ignores_replaced_id() {
        let (gateway, mut manager) = manager();
        let old = manager.start(|_, _| {}, |_, _| {});
        let current = manager.start(|_, _| {}, |_, _| {});

        assert!(!manager.stop_stream(old));
        assert_eq!(gateway.open_now(), 1);
        assert!(manager.stop_stream(current));
        assert_eq!(gateway.open_now(), 0);
    }

    #[test]
    fn test_callbacks_carry_stream_id() {
        let (gateway, mut manager) = manager();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = manager.start(
            move |id, fixtures: Vec<Fixture>| sink.lock().unwrap().push((id, fixtures.len())),
            |_, _| {},
        );

        gateway.push_latest(vec![fixture(1, "1H"), fixture(2, "NS")]);
        assert_eq!(*seen.lock().unwrap(), vec![(id, 2)]);
    }

    #[test]
    fn test_drop_releases_channel() {
        let (gateway, mut manager) = manager();
        manager.start(|_, _| {}, |_, _| {});
        drop(manager);
        assert_eq!(gateway.open_now(), 0);
    }
}
