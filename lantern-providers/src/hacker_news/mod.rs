//! Hacker News story API
//!
//! Top story ids and individual items (stories, jobs, comments) from the
//! public Firebase REST API.

pub mod client;
pub mod types;

pub use client::{HackerNewsClient, DEFAULT_BASE_URL, MAX_TOP_STORIES};
