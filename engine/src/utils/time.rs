//! Wall-clock helpers.

use std::time::SystemTime;

/// Current wall-clock time as milliseconds since the Unix epoch.
///
/// All timestamps stored in the state core use this representation; the state
/// additionally clamps them to be non-decreasing per entity type, so callers
/// should treat the value as advisory rather than strictly monotonic.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
