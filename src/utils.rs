//! Small helpers shared by the writer's progress reporting.

use std::time::Instant;

/// Format a second count as `HH:MM:SS`, with a day prefix past 24h.
pub fn format_seconds(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let rest = total_seconds % 86_400;
    let (h, m, s) = (rest / 3600, (rest % 3600) / 60, rest % 60);
    if days > 0 {
        format!("{days}:{h:02}:{m:02}:{s:02}")
    } else {
        format!("{h:02}:{m:02}:{s:02}")
    }
}

/// Remaining-time estimate from elapsed time and progress so far.
pub fn eta(done: usize, total: usize, start: Instant) -> String {
    if done == 0 || total <= done {
        return format_seconds(0);
    }
    let elapsed = start.elapsed().as_secs_f64();
    let remaining = elapsed * (total - done) as f64 / done as f64;
    format_seconds(remaining as u64)
}
