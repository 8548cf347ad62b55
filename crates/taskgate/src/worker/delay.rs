use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

pub const MIN_DELAY: Duration = Duration::from_millis(100);
pub const MAX_DELAY: Duration = Duration::from_millis(500);

/// Simulated processing time for `task`, always in `[MIN_DELAY, MAX_DELAY)`.
///
/// `DefaultHasher::new()` uses fixed keys, so the same task text maps to the
/// same delay on every call.
pub fn processing_delay(task: &str) -> Duration {
    let mut hasher = DefaultHasher::new();
    task.hash(&mut hasher);

    let span = (MAX_DELAY - MIN_DELAY).as_millis() as u64;
    MIN_DELAY + Duration::from_millis(hasher.finish() % span)
}
