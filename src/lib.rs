//! Stenella - a combined RSS viewer
//!
//! Fetches a configurable list of RSS/Atom feeds on every request, merges
//! their items newest-first and serves them as JSON next to a small page for
//! managing the source list.

pub mod aggregator;
pub mod config;
pub mod dates;
pub mod fetcher;
pub mod registry;
pub mod routes;
