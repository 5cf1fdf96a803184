//! courtside library
//!
//! Fetches NBA schedules, standings and game summaries from ESPN, caches them
//! in namespaced storage with TTL-gated refetching, and turns them into view
//! models and plain-text views. The binary and the integration tests both build
//! on these modules.

pub mod api;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod prefs;
pub mod view;
