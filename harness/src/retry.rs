//! Retry utility with exponential backoff

use std::time::Duration;
use tracing::warn;

/// Upper bound for a single backoff sleep
pub const MAX_DELAY: Duration = Duration::from_secs(30);

/// Run `f`, retrying up to `retries` more times with exponential backoff.
///
/// Returns `Ok` on first success, or the last `Err` once every attempt failed.
/// With `retries == 0` the operation runs once and never sleeps.
/// Delays: `initial_delay`, `2 * initial_delay`, `4 * initial_delay`, ... capped at 30s.
pub fn retry_with_backoff<F, T, E>(
    operation_name: &str,
    retries: u32,
    initial_delay: Duration,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: std::fmt::Display,
{
    let max_attempts = retries.saturating_add(1);
    let mut delay = initial_delay;
    let mut attempt = 1;

    loop {
        match f() {
            Ok(val) => return Ok(val),
            Err(e) if attempt < max_attempts => {
                warn!(
                    "{} failed (attempt {}/{}): {}",
                    operation_name, attempt, max_attempts, e
                );
                std::thread::sleep(delay);
                delay = (delay * 2).min(MAX_DELAY);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
