//! Injectable time source
//!
//! Token services never read the wall clock directly; they ask a [`Clock`].
//! Production code uses [`SystemClock`], tests drive a [`ManualClock`].

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Source of the current instant
pub trait Clock: Send + Sync + 'static {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

/// Reads the real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
///
/// Stored as nanoseconds since the Unix epoch, matching the resolution of the
/// token timestamp.
#[derive(Debug)]
pub struct ManualClock {
    nanos: AtomicI64,
}

impl ManualClock {
    /// Start at the given instant
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            nanos: AtomicI64::new(unix_nanos(start)),
        }
    }

    /// Start at the current system time
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Jump to an absolute instant
    pub fn set(&self, at: DateTime<Utc>) {
        self.nanos.store(unix_nanos(at), Ordering::SeqCst);
    }

    /// Move forward
    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(duration_nanos(by), Ordering::SeqCst);
    }

    /// Move backward
    pub fn rewind(&self, by: Duration) {
        self.nanos.fetch_sub(duration_nanos(by), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// Nanoseconds since the Unix epoch.
///
/// `DateTime<Utc>` only fits in an `i64` of nanoseconds between 1677 and
/// 2262; instants outside that range saturate.
pub(crate) fn unix_nanos(at: DateTime<Utc>) -> i64 {
    at.timestamp_nanos_opt().unwrap_or(if at.timestamp() < 0 {
        i64::MIN
    } else {
        i64::MAX
    })
}

fn duration_nanos(d: Duration) -> i64 {
    i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advance_and_rewind() {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::from_secs(90));
        assert_eq!((clock.now() - start).num_seconds(), 90);

        clock.rewind(Duration::from_secs(120));
        assert_eq!((clock.now() - start).num_seconds(), -30);
    }

    #[test]
    fn test_manual_clock_keeps_nanoseconds() {
        let start = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(Duration::from_nanos(1));
        assert_eq!(clock.now().timestamp_subsec_nanos(), 123_456_790);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let a = SystemClock.now();
        let b = SystemClock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_unix_nanos_saturates() {
        let far = DateTime::from_timestamp(i64::from(i32::MAX) * 10, 0).unwrap();
        assert_eq!(unix_nanos(far), i64::MAX);
    }
}
