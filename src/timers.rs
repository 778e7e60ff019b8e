//! RAII phase timing for the generation pipeline.

use std::time::{Duration, Instant};

/// Adds the elapsed time to `slot` when dropped, early returns included.
///
/// ```rust,ignore
/// let mut bucket = Duration::ZERO;
/// {
///     let _timer = PhaseTimer::new(&mut bucket);
///     // grouping statements
/// }
/// ```
pub struct PhaseTimer<'a> {
    start: Instant,
    slot: &'a mut Duration,
}

impl<'a> PhaseTimer<'a> {
    pub fn new(slot: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            slot,
        }
    }
}

impl Drop for PhaseTimer<'_> {
    fn drop(&mut self) {
        *self.slot += self.start.elapsed();
    }
}

/// Milliseconds as a float, the unit phase metrics are reported in.
pub(crate) fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
