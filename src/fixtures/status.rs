//! Maps raw short status codes onto lifecycle buckets and phase labels.

use std::fmt;

use super::models::Fixture;

/// Lifecycle bucket a fixture belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureState {
    Live,
    Finished,
    Scheduled,
}

impl FixtureState {
    pub fn as_str(self) -> &'static str {
        match self {
            FixtureState::Live => "live",
            FixtureState::Finished => "finished",
            FixtureState::Scheduled => "scheduled",
        }
    }
}

impl fmt::Display for FixtureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Known short status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    FirstHalf,
    SecondHalf,
    HalfTime,
    ExtraTime,
    Penalties,
    FullTime,
    AfterExtraTime,
    PenaltiesFinished,
    NotStarted,
    Postponed,
    Cancelled,
}

impl StatusCode {
    pub fn parse(code: &str) -> Option<StatusCode> {
        let code = match code {
            "1H" => StatusCode::FirstHalf,
            "2H" => StatusCode::SecondHalf,
            "HT" => StatusCode::HalfTime,
            "ET" => StatusCode::ExtraTime,
            "P" => StatusCode::Penalties,
            "FT" => StatusCode::FullTime,
            "AET" => StatusCode::AfterExtraTime,
            "PEN" => StatusCode::PenaltiesFinished,
            "NS" => StatusCode::NotStarted,
            "PST" => StatusCode::Postponed,
            "CANC" => StatusCode::Cancelled,
            _ => return None,
        };
        Some(code)
    }

    pub fn state(self) -> FixtureState {
        match self {
            StatusCode::FirstHalf
            | StatusCode::SecondHalf
            | StatusCode::HalfTime
            | StatusCode::ExtraTime
            | StatusCode::Penalties => FixtureState::Live,
            StatusCode::FullTime | StatusCode::AfterExtraTime | StatusCode::PenaltiesFinished => {
                FixtureState::Finished
            }
            StatusCode::NotStarted | StatusCode::Postponed | StatusCode::Cancelled => {
                FixtureState::Scheduled
            }
        }
    }

    /// Fixed phrase for the phase, without any elapsed minute.
    pub fn phrase(self) -> &'static str {
        match self {
            StatusCode::FirstHalf => "First Half",
            StatusCode::SecondHalf => "Second Half",
            StatusCode::HalfTime => "Half Time",
            StatusCode::ExtraTime => "Extra Time",
            StatusCode::Penalties => "Penalties",
            StatusCode::FullTime => "Full Time",
            StatusCode::AfterExtraTime => "After Extra Time",
            StatusCode::PenaltiesFinished => "Penalties Finished",
            StatusCode::NotStarted => "Not Started",
            StatusCode::Postponed => "Postponed",
            StatusCode::Cancelled => "Cancelled",
        }
    }

    fn shows_elapsed(self) -> bool {
        matches!(
            self,
            StatusCode::FirstHalf | StatusCode::SecondHalf | StatusCode::ExtraTime
        )
    }
}

/// Classify a short status code. Unknown codes are `Scheduled`.
pub fn classify(status_short: &str) -> FixtureState {
    StatusCode::parse(status_short)
        .map(StatusCode::state)
        .unwrap_or(FixtureState::Scheduled)
}

/// Human-readable phase label, e.g. `37' - First Half` or `Half Time`.
///
/// Unrecognised codes fall back to the fixture's long-form status.
pub fn describe(fixture: &Fixture) -> String {
    let Some(code) = StatusCode::parse(&fixture.status_short) else {
        return fixture.status.clone();
    };
    match (code.shows_elapsed(), fixture.elapsed) {
        (true, Some(minute)) => format!("{}' - {}", minute, code.phrase()),
        _ => code.phrase().to_string(),
    }
}
