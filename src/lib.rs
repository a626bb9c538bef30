//! Live football fixtures client: one-shot loads, a single push
//! subscription, and the view state built from them.

pub mod config;
pub mod error;
pub mod fixtures;
pub mod view;
