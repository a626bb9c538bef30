use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::state::{ListSource, Phase, Selection, StatsView, ViewState};
use super::stream::{LiveStreamManager, StreamId};
use crate::error::{Error, FailureKind};
use crate::fixtures::{Fixture, FixtureGateway, FixtureId, StatsPair};

const STREAM_FAILURE_MESSAGE: &str = "Streaming error occurred, start updates again to retry";
const STATS_FAILURE_MESSAGE: &str = "Failed to load match statistics";
const STATS_UNAVAILABLE_MESSAGE: &str = "No statistics available for this match";

/// State shared with stream callbacks.
///
/// Lock order is always `stream` before `state`.
struct Shared {
    state: Mutex<ViewState>,
    stream: Mutex<LiveStreamManager>,
    updates: watch::Sender<ViewState>,
    last_token: AtomicU64,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_stream(&self) -> MutexGuard<'_, LiveStreamManager> {
        self.stream.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_token(&self) -> u64 {
        self.last_token.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Mutate the state under its lock; publishes a snapshot when `f`
    /// reports a change.
    fn update(&self, f: impl FnOnce(&mut ViewState) -> bool) -> bool {
        let mut state = self.lock_state();
        let changed = f(&mut *state);
        if changed {
            self.publish(&state);
        }
        changed
    }

    fn publish(&self, state: &ViewState) {
        self.updates.send_replace(state.clone());
    }

    fn apply_stream_update(&self, id: StreamId, fixtures: Vec<Fixture>) {
        let count = fixtures.len();
        let applied = self.update(|state| {
            if !state.is_current_stream(id) {
                return false;
            }
            state.replace_fixtures(fixtures);
            true
        });
        if applied {
            debug!("Stream {} update applied ({} fixtures)", id, count);
        } else {
            debug!("Dropping update from stream {} (no longer current)", id);
        }
    }

    fn apply_stream_failure(&self, id: StreamId, err: Error) {
        let current = self.update(|state| {
            if !state.is_current_stream(id) {
                return false;
            }
            state.phase = Phase::Idle;
            state.error = Some(STREAM_FAILURE_MESSAGE.to_string());
            true
        });
        if current {
            warn!("Live stream {} failed: {}", id, err);
            // The channel is dead; release it unless a newer stream took over.
            self.lock_stream().stop_stream(id);
        } else {
            debug!("Ignoring failure from stream {}: {}", id, err);
        }
    }
}

/// Orchestrates the presented fixture list, the acquisition mode and the
/// detail panel.
///
/// Failures never escape: each one becomes a message in the view state.
/// Dropping the coordinator tears it down.
pub struct ViewCoordinator {
    gateway: Arc<dyn FixtureGateway>,
    shared: Arc<Shared>,
    activated: AtomicBool,
    torn_down: AtomicBool,
}

impl ViewCoordinator {
    pub fn new(gateway: Arc<dyn FixtureGateway>) -> Self {
        let (updates, _) = watch::channel(ViewState::default());
        let shared = Arc::new(Shared {
            state: Mutex::new(ViewState::default()),
            stream: Mutex::new(LiveStreamManager::new(Arc::clone(&gateway))),
            updates,
            last_token: AtomicU64::new(0),
        });
        ViewCoordinator {
            gateway,
            shared,
            activated: AtomicBool::new(false),
            torn_down: AtomicBool::new(false),
        }
    }

    /// Receiver that observes every published state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.shared.updates.subscribe()
    }

    pub fn snapshot(&self) -> ViewState {
        self.shared.lock_state().clone()
    }

    /// First activation loads today's fixtures; later calls do nothing.
    pub async fn activate(&self) {
        if self.activated.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Activating with today's fixtures from {}", self.gateway.name());
        self.load_today().await;
    }

    /// Mark as activated without the initial load.
    pub fn activate_without_load(&self) {
        self.activated.store(true, Ordering::SeqCst);
    }

    pub async fn load_live(&self) {
        self.load(ListSource::Live).await;
    }

    pub async fn load_today(&self) {
        self.load(ListSource::Today).await;
    }

    async fn load(&self, source: ListSource) {
        let token = self.begin_load(source);

        let result = match source {
            ListSource::Live => self.gateway.fetch_live().await,
            ListSource::Today => self.gateway.fetch_today().await,
        };

        // Only the most recently issued load may touch the state.
        let applied = self.shared.update(|state| {
            if !state.is_current_load(token) {
                return false;
            }
            match result {
                Ok(fixtures) => {
                    info!("Loaded {} fixtures ({:?})", fixtures.len(), source);
                    state.replace_fixtures(fixtures);
                }
                Err(e) => {
                    warn!("{}: {}", source.failure_message(), e);
                    state.error = Some(source.failure_message().to_string());
                }
            }
            state.phase = Phase::Polled(source);
            true
        });
        if !applied {
            debug!("Discarding stale {:?} response (load {})", source, token);
        }
    }

    /// Close any open stream and enter `Loading` under both locks, so no
    /// `start_stream` can slip in between.
    fn begin_load(&self, source: ListSource) -> u64 {
        let mut stream = self.shared.lock_stream();
        stream.stop();
        let mut state = self.shared.lock_state();
        let token = self.shared.next_token();
        state.selection = None;
        state.error = None;
        state.phase = Phase::Loading { token, source };
        self.shared.publish(&state);
        token
    }

    /// Switch to push updates. Returns `false` when ignored: already
    /// streaming, a load is in flight, or the coordinator is torn down.
    pub fn start_stream(&self) -> bool {
        if self.torn_down.load(Ordering::SeqCst) {
            debug!("start_stream after teardown ignored");
            return false;
        }

        let mut stream = self.shared.lock_stream();
        let mut state = self.shared.lock_state();
        if state.is_streaming() || state.is_loading() {
            debug!("start_stream ignored in {:?} mode", state.mode());
            return false;
        }

        let on_update = {
            let shared = Arc::downgrade(&self.shared);
            move |id: StreamId, fixtures: Vec<Fixture>| {
                if let Some(shared) = shared.upgrade() {
                    shared.apply_stream_update(id, fixtures);
                }
            }
        };
        let on_error = {
            let shared = Arc::downgrade(&self.shared);
            move |id: StreamId, err: Error| {
                if let Some(shared) = shared.upgrade() {
                    shared.apply_stream_failure(id, err);
                }
            }
        };

        // State stays locked until the phase names the new stream, so its
        // first message cannot be mistaken for a stale one.
        let id = stream.start(on_update, on_error);
        state.phase = Phase::Streaming(id);
        self.shared.publish(&state);
        true
    }

    /// Close the push channel and leave streaming mode. Safe to repeat.
    pub fn stop_stream(&self) {
        let mut stream = self.shared.lock_stream();
        stream.stop();
        let mut state = self.shared.lock_state();
        if state.is_streaming() {
            state.phase = Phase::Idle;
            self.shared.publish(&state);
        }
    }

    /// Open the detail panel for `fixture` and fetch its stats.
    ///
    /// An open stream keeps running underneath.
    pub async fn select_fixture(&self, fixture: Fixture) {
        let token = self.shared.next_token();
        let fixture_id = fixture.id;
        self.shared.update(|state| {
            state.selection = Some(Selection {
                fixture,
                stats: StatsView::Loading { token },
            });
            state.error = None;
            true
        });

        let result = self
            .gateway
            .fetch_stats(fixture_id)
            .await
            .and_then(|records| StatsPair::from_records(fixture_id, records));

        let applied = self.shared.update(|state| {
            let Some(selection) = state.selection.as_mut() else {
                return false;
            };
            if !matches!(selection.stats, StatsView::Loading { token: t } if t == token) {
                return false;
            }
            match result {
                Ok(pair) => selection.stats = StatsView::Ready(pair),
                Err(e) => {
                    warn!("Stats for fixture {} unavailable: {}", fixture_id, e);
                    selection.stats = StatsView::Unavailable;
                    state.error = Some(stats_failure_message(&e).to_string());
                }
            }
            true
        });
        if !applied {
            debug!("Discarding stats for fixture {} (selection changed)", fixture_id);
        }
    }

    /// Select a fixture from the presented list by id. Returns `false` if
    /// no such fixture is shown.
    pub async fn select_fixture_id(&self, fixture_id: FixtureId) -> bool {
        let fixture = self
            .shared
            .lock_state()
            .fixtures
            .iter()
            .find(|f| f.id == fixture_id)
            .cloned();
        match fixture {
            Some(fixture) => {
                self.select_fixture(fixture).await;
                true
            }
            None => false,
        }
    }

    pub fn deselect_fixture(&self) {
        self.shared.update(|state| state.selection.take().is_some());
    }

    /// Release everything. Only the first call does any work.
    pub fn shutdown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Shutting down view coordinator");
        self.stop_stream();
    }
}

impl Drop for ViewCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn stats_failure_message(err: &Error) -> &'static str {
    match err.kind() {
        FailureKind::Validation => STATS_UNAVAILABLE_MESSAGE,
        FailureKind::Transport | FailureKind::Channel => STATS_FAILURE_MESSAGE,
    }
}
