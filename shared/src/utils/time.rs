//! Time-related utilities

use std::sync::OnceLock;
use std::time::Instant;

/// Process-wide origin for monotonic nanosecond timestamps
fn epoch() -> Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    *EPOCH.get_or_init(Instant::now)
}

/// Nanoseconds elapsed on the monotonic clock since the first call in this process
///
/// Unaffected by wall-clock adjustments, so deltas are safe to use as
/// device-style event timestamps.
pub fn monotonic_nanos() -> u64 {
    epoch().elapsed().as_nanos() as u64
}

/// Host name of this machine, or a pid-based fallback
pub fn host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| format!("host-{}", std::process::id()))
}
