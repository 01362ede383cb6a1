//! Clock utilities for sample timestamps and duration reporting.
//!
//! Sample streams and the movie file output are anchored to a monotonic
//! epoch recorded when capture starts. The wall-clock anchor is kept
//! alongside so logs and file metadata can reference real time.

use std::time::Instant;

/// A recording clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment capture started).
#[derive(Debug, Clone)]
pub struct RecordingClock {
    /// The instant capture started.
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl RecordingClock {
    /// Create a new recording clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get nanoseconds elapsed since capture start.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Get seconds elapsed since capture start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at capture start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// The underlying epoch instant.
    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    /// Convert an elapsed nanosecond value to seconds.
    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / 1_000_000_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_monotonic() {
        let clock = RecordingClock::start();
        let a = clock.elapsed_ns();
        let b = clock.elapsed_ns();
        assert!(b >= a);
    }

    #[test]
    fn ns_conversion_round_numbers() {
        assert_eq!(RecordingClock::ns_to_secs(1_500_000_000), 1.5);
    }
}
