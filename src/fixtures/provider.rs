use async_trait::async_trait;

use super::models::{Fixture, FixtureId, FixtureStats};
use crate::error::{Error, Result};

/// Called once per push message with the full replacement fixture list.
pub type UpdateFn = Box<dyn Fn(Vec<Fixture>) + Send + Sync>;

/// Called at most once per subscription; the channel is dead afterwards.
pub type ErrorFn = Box<dyn FnOnce(Error) + Send>;

/// Source of fixture data: one-shot retrieval plus a push subscription.
#[async_trait]
pub trait FixtureGateway: Send + Sync {
    /// All matches currently in progress.
    async fn fetch_live(&self) -> Result<Vec<Fixture>>;

    /// All matches scheduled for today, whatever their status.
    async fn fetch_today(&self) -> Result<Vec<Fixture>>;

    /// Raw stats records for one fixture (home then away).
    async fn fetch_stats(&self, fixture_id: FixtureId) -> Result<Vec<FixtureStats>>;

    /// Open the push channel. Must be called from within a tokio runtime.
    fn subscribe(&self, on_update: UpdateFn, on_error: ErrorFn) -> Subscription;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Owned handle to an open push channel.
///
/// Releasing is idempotent, and dropping the handle releases it.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Subscription {
            release: Some(Box::new(release)),
        }
    }

    /// Close the channel. Only the first call has any effect.
    pub fn unsubscribe(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    pub fn is_open(&self) -> bool {
        self.release.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("open", &self.is_open())
            .finish()
    }
}
