//! Search provider adapters.

pub mod brave;
