//! Groq chat-completions adapter.
//!
//! Groq exposes an OpenAI-compatible REST API with very fast Llama inference,
//! which suits a live pipeline: topic and claim updates should trail the
//! conversation by seconds, not minutes.

mod client;
mod config;
mod messages;

pub use client::GroqChat;
pub use config::GroqConfig;
