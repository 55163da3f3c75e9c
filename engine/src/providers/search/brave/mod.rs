//! Brave Search adapter.
//!
//! One client backs both the text-search and image-search capabilities; the
//! two endpoints share authentication, SafeSearch semantics, and country
//! handling, so they share configuration and error mapping too.

mod client;
mod config;
mod messages;

pub use client::BraveSearch;
pub use config::BraveSearchConfig;
