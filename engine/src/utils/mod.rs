//! Shared utilities for the engine crate.

pub mod hosts;
pub mod json;
pub mod time;

pub use hosts::HostBlocklist;
pub use json::{parse_json_response, strip_code_fences};
pub use time::epoch_millis;
