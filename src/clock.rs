// src/clock.rs

//! Wall-clock timestamps and the clock the controller samples.

use std::fmt;
use std::ops::Add;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// An absolute wall-clock instant.
///
/// File modification times and poll boundaries share this type so the
/// change detector can compare them directly.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(SystemTime);

impl Timestamp {
    pub fn from_system_time(time: SystemTime) -> Self {
        Self(time)
    }

    /// Build a timestamp from fractional seconds since the UNIX epoch.
    ///
    /// Negative or non-finite values clamp to the epoch.
    pub fn from_secs_f64(secs: f64) -> Self {
        let offset = Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO);
        Self(UNIX_EPOCH + offset)
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.seconds_since(Timestamp(UNIX_EPOCH))
    }

    pub fn as_system_time(&self) -> SystemTime {
        self.0
    }

    /// Signed difference `self - earlier`, in seconds.
    pub fn seconds_since(&self, earlier: Timestamp) -> f64 {
        match self.0.duration_since(earlier.0) {
            Ok(d) => d.as_secs_f64(),
            Err(e) => -e.duration().as_secs_f64(),
        }
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0 + rhs)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({:.6})", self.as_secs_f64())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.as_secs_f64())
    }
}

/// Source of "now" for the controller.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp(SystemTime::now())
    }
}

/// Clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn at_secs(secs: f64) -> Self {
        Self::new(Timestamp::from_secs_f64(secs))
    }

    pub fn set(&self, to: Timestamp) {
        *self.now.lock().unwrap() = to;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secs_round_trip_is_close() {
        let ts = Timestamp::from_secs_f64(1_700_000_000.25);
        assert!((ts.as_secs_f64() - 1_700_000_000.25).abs() < 1e-6);
    }

    #[test]
    fn negative_secs_clamp_to_epoch() {
        assert_eq!(Timestamp::from_secs_f64(-5.0).as_secs_f64(), 0.0);
    }

    #[test]
    fn seconds_since_is_signed() {
        let a = Timestamp::from_secs_f64(100.0);
        let b = a + Duration::from_secs(5);
        assert_eq!(b.seconds_since(a), 5.0);
        assert_eq!(a.seconds_since(b), -5.0);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::at_secs(10.0);
        let other = clock.clone();
        clock.advance(Duration::from_millis(500));
        assert_eq!(other.now(), Timestamp::from_secs_f64(10.5));
    }
}
