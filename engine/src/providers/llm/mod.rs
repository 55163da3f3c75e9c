//! LLM provider adapters.

pub mod groq;
