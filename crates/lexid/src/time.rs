use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Custom epoch: Wednesday, January 1, 2025 00:00:00 UTC
///
/// Chosen recent so the 64-bit timestamp field's used range stays small
/// relative to its capacity. All generators in a process must share the
/// same epoch for their IDs to remain mutually comparable.
pub const CUSTOM_EPOCH: Duration = Duration::from_millis(1_735_689_600_000);

/// A source of elapsed milliseconds since a configured epoch.
///
/// This abstraction lets the generator run against the real system clock
/// in production and a scripted clock in tests.
///
/// # Example
///
/// ```
/// use lexid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

/// A wall-clock time source, offset from a fixed epoch.
///
/// Reads `SystemTime::now()` on every call. This is deliberate: the
/// generator's rollback compensation only works if the clock it observes
/// can actually move backward, so a monotonic timer is the wrong tool
/// here. NTP steps, manual adjustments, and VM resumes all show up as
/// regressions and are handled by [`crate::Generator::next`].
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    epoch_millis: u64,
}

impl Default for WallClock {
    /// Constructs a wall clock aligned to [`CUSTOM_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(CUSTOM_EPOCH)
    }
}

impl WallClock {
    /// Constructs a wall clock using a custom epoch as the origin (t = 0),
    /// specified as a [`Duration`] since 1970-01-01 UTC.
    pub fn with_epoch(epoch: Duration) -> Self {
        Self {
            epoch_millis: epoch.as_millis() as u64,
        }
    }
}

impl TimeSource for WallClock {
    /// Returns milliseconds elapsed since the configured epoch.
    ///
    /// Saturates to zero if the system clock reads earlier than the
    /// epoch; the generator treats that like any other rollback.
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
            .saturating_sub(self.epoch_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_clock_advances() {
        let clock = WallClock::default();
        let a = clock.current_millis();
        std::thread::sleep(Duration::from_millis(2));
        let b = clock.current_millis();
        assert!(b >= a + 1, "expected clock to advance: {a} -> {b}");
    }

    #[test]
    fn wall_clock_epoch_offset() {
        // A clock anchored at the unix epoch reads CUSTOM_EPOCH millis
        // ahead of the default clock.
        let unix = WallClock::with_epoch(Duration::ZERO);
        let custom = WallClock::default();
        let diff = unix.current_millis() - custom.current_millis();
        let expected = CUSTOM_EPOCH.as_millis() as u64;
        assert!(diff.abs_diff(expected) <= 1, "offset {diff} != {expected}");
    }

    #[test]
    fn wall_clock_saturates_before_epoch() {
        // An epoch far in the future must not underflow.
        let future = WallClock::with_epoch(Duration::from_millis(u64::MAX / 2));
        assert_eq!(future.current_millis(), 0);
    }
}
