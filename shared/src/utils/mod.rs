//! Utility functions and helpers

pub mod time;

/// Format a duration in seconds the way the CSV log stores it
pub fn format_secs(secs: f64) -> String {
    format!("{:.9}", secs)
}

/// Round `len` up to the next multiple of `multiple`
pub fn round_up(len: usize, multiple: usize) -> usize {
    if multiple == 0 {
        return len;
    }
    len.div_ceil(multiple) * multiple
}
