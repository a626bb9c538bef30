use thiserror::Error;

use crate::fixtures::models::FixtureId;

/// The three failure classes the client distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network or HTTP failure on a one-shot call.
    Transport,
    /// Push channel error or malformed push message.
    Channel,
    /// A response that decoded fine but has the wrong shape.
    Validation,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("push channel failed: {0}")]
    Channel(String),

    #[error("malformed push message: {0}")]
    MalformedMessage(#[source] serde_json::Error),

    #[error("expected a home/away stats pair for fixture {fixture_id}, got {count} record(s)")]
    StatsShape { fixture_id: FixtureId, count: usize },

    #[error("stats record belongs to fixture {found}, expected {expected}")]
    StatsFixtureMismatch {
        expected: FixtureId,
        found: FixtureId,
    },
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Request { .. } | Error::Status { .. } | Error::Decode { .. } => {
                FailureKind::Transport
            }
            Error::Channel(_) | Error::MalformedMessage(_) => FailureKind::Channel,
            Error::StatsShape { .. } | Error::StatsFixtureMismatch { .. } => {
                FailureKind::Validation
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
