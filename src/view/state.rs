use chrono::{DateTime, Utc};

use super::stream::StreamId;
use crate::fixtures::{Fixture, StatsPair};

/// Which mechanism currently supplies the fixture list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionMode {
    Idle,
    Polling,
    Streaming,
}

/// One-shot list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSource {
    Live,
    Today,
}

impl ListSource {
    pub fn failure_message(self) -> &'static str {
        match self {
            ListSource::Live => "Failed to load live fixtures",
            ListSource::Today => "Failed to load today's fixtures",
        }
    }
}

/// Acquisition phase. Loading and streaming are separate variants, so
/// the two can never be active together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Idle,
    Loading { token: u64, source: ListSource },
    Polled(ListSource),
    Streaming(StreamId),
}

/// Stats panel for the selected fixture.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsView {
    Loading { token: u64 },
    Ready(StatsPair),
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub fixture: Fixture,
    pub stats: StatsView,
}

/// Which user actions make sense right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub load: bool,
    pub start_stream: bool,
    pub stop_stream: bool,
}

/// Everything a renderer needs, published after each change.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub(crate) fixtures: Vec<Fixture>,
    pub(crate) phase: Phase,
    pub(crate) error: Option<String>,
    pub(crate) selection: Option<Selection>,
    pub(crate) last_updated: Option<DateTime<Utc>>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            fixtures: Vec::new(),
            phase: Phase::Idle,
            error: None,
            selection: None,
            last_updated: None,
        }
    }
}

impl ViewState {
    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn mode(&self) -> AcquisitionMode {
        match self.phase {
            Phase::Idle => AcquisitionMode::Idle,
            Phase::Loading { .. } | Phase::Polled(_) => AcquisitionMode::Polling,
            Phase::Streaming(_) => AcquisitionMode::Streaming,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading { .. })
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.phase, Phase::Streaming(_))
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_fixture(&self) -> Option<&Fixture> {
        self.selection.as_ref().map(|s| &s.fixture)
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn stats(&self) -> Option<&StatsPair> {
        match self.selection.as_ref().map(|s| &s.stats) {
            Some(StatsView::Ready(pair)) => Some(pair),
            _ => None,
        }
    }

    pub fn stats_loading(&self) -> bool {
        matches!(
            self.selection.as_ref().map(|s| &s.stats),
            Some(StatsView::Loading { .. })
        )
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn controls(&self) -> Controls {
        Controls {
            load: !self.is_loading(),
            start_stream: !self.is_loading() && !self.is_streaming(),
            stop_stream: self.is_streaming(),
        }
    }

    pub(crate) fn is_current_load(&self, token: u64) -> bool {
        matches!(self.phase, Phase::Loading { token: t, .. } if t == token)
    }

    pub(crate) fn is_current_stream(&self, id: StreamId) -> bool {
        self.phase == Phase::Streaming(id)
    }

    pub(crate) fn replace_fixtures(&mut self, fixtures: Vec<Fixture>) {
        self.fixtures = fixtures;
        self.error = None;
        self.last_updated = Some(Utc::now());
    }
}
