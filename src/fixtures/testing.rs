//! In-memory gateway for unit tests.
//!
//! One-shot calls pop scripted replies; push channels are recorded so a
//! test can drive them by hand and count how many are still open.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::models::{Fixture, FixtureId, FixtureStats};
use super::provider::{ErrorFn, FixtureGateway, Subscription, UpdateFn};
use crate::error::{Error, Result};

pub enum Reply<T> {
    Now(Result<T>),
    /// Resolves when the test sends on the paired sender
    Later(oneshot::Receiver<Result<T>>),
}

impl<T> Reply<T> {
    pub fn ok(value: T) -> Self {
        Reply::Now(Ok(value))
    }

    pub fn http_error(status: u16) -> Self {
        Reply::Now(Err(Error::Status {
            url: "http://fixtures.test/api".into(),
            status,
        }))
    }

    pub fn later() -> (Self, oneshot::Sender<Result<T>>) {
        let (tx, rx) = oneshot::channel();
        (Reply::Later(rx), tx)
    }

    async fn resolve(self) -> Result<T> {
        match self {
            Reply::Now(result) => result,
            Reply::Later(rx) => rx
                .await
                .unwrap_or_else(|_| Err(Error::Channel("reply sender dropped".into()))),
        }
    }
}

struct FakeChannel {
    on_update: Arc<dyn Fn(Vec<Fixture>) + Send + Sync>,
    on_error: Option<ErrorFn>,
    released: Arc<AtomicBool>,
}

#[derive(Default)]
pub struct ScriptedGateway {
    live: Mutex<VecDeque<Reply<Vec<Fixture>>>>,
    today: Mutex<VecDeque<Reply<Vec<Fixture>>>>,
    stats: Mutex<VecDeque<Reply<Vec<FixtureStats>>>>,
    channels: Mutex<Vec<FakeChannel>>,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script_live(&self, reply: Reply<Vec<Fixture>>) {
        self.live.lock().unwrap().push_back(reply);
    }

    pub fn script_today(&self, reply: Reply<Vec<Fixture>>) {
        self.today.lock().unwrap().push_back(reply);
    }

    pub fn script_stats(&self, reply: Reply<Vec<FixtureStats>>) {
        self.stats.lock().unwrap().push_back(reply);
    }

    pub fn opened(&self) -> usize {
        self.channels.lock().unwrap().len()
    }

    pub fn open_now(&self) -> usize {
        self.channels
            .lock()
            .unwrap()
            .iter()
            .filter(|c| !c.released.load(Ordering::SeqCst))
            .count()
    }

    pub fn is_released(&self, index: usize) -> bool {
        self.channels.lock().unwrap()[index]
            .released
            .load(Ordering::SeqCst)
    }

    /// Deliver a message on channel `index`, released or not.
    pub fn push_channel(&self, index: usize, fixtures: Vec<Fixture>) {
        let on_update = Arc::clone(&self.channels.lock().unwrap()[index].on_update);
        on_update(fixtures);
    }

    /// Fail channel `index`, released or not.
    pub fn fail_channel(&self, index: usize, err: Error) {
        let on_error = self.channels.lock().unwrap()[index]
            .on_error
            .take()
            .expect("channel already failed");
        on_error(err);
    }

    pub fn push_latest(&self, fixtures: Vec<Fixture>) {
        self.push_channel(self.opened() - 1, fixtures);
    }

    pub fn fail_latest(&self, err: Error) {
        self.fail_channel(self.opened() - 1, err);
    }
}

fn unscripted<T>(what: &str) -> Reply<T> {
    Reply::Now(Err(Error::Channel(format!("no scripted reply for {}", what))))
}

#[async_trait]
impl FixtureGateway for ScriptedGateway {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_live(&self) -> Result<Vec<Fixture>> {
        let reply = self.live.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| unscripted("fetch_live")).resolve().await
    }

    async fn fetch_today(&self) -> Result<Vec<Fixture>> {
        let reply = self.today.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| unscripted("fetch_today")).resolve().await
    }

    async fn fetch_stats(&self, _fixture_id: FixtureId) -> Result<Vec<FixtureStats>> {
        let reply = self.stats.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| unscripted("fetch_stats")).resolve().await
    }

    fn subscribe(&self, on_update: UpdateFn, on_error: ErrorFn) -> Subscription {
        let released = Arc::new(AtomicBool::new(false));
        self.channels.lock().unwrap().push(FakeChannel {
            on_update: Arc::from(on_update),
            on_error: Some(on_error),
            released: Arc::clone(&released),
        });
        Subscription::new(move || {
            assert!(
                !released.swap(true, Ordering::SeqCst),
                "channel released twice"
            );
        })
    }
}

pub fn fixture(id: FixtureId, status_short: &str) -> Fixture {
    Fixture {
        id,
        home_team: format!("Home {}", id),
        away_team: format!("Away {}", id),
        home_team_logo: None,
        away_team_logo: None,
        home_score: 0,
        away_score: 0,
        status: String::new(),
        status_short: status_short.to_string(),
        elapsed: None,
        league_name: "Premier League".to_string(),
        country: "England".to_string(),
        live: false,
    }
}

pub fn stats_for(fixture_id: FixtureId, team: &str) -> FixtureStats {
    FixtureStats {
        fixture_id: Some(fixture_id),
        team: team.to_string(),
        ..FixtureStats::default()
    }
}
