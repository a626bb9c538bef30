pub mod http;
pub mod models;
pub mod provider;
pub mod sse;
pub mod status;
pub mod websocket;

pub use http::HttpFixtureGateway;
pub use models::{Fixture, FixtureId, FixtureStats, StatsPair};
pub use provider::{ErrorFn, FixtureGateway, Subscription, UpdateFn};
pub use status::{classify, describe, FixtureState};

#[cfg(test)]
pub mod testing;
