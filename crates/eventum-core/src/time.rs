//! Simulated-time type
//!
//! `SimTime` is the kernel's clock value: a unit-agnostic non-negative real.
//! It is unrelated to wall-clock time; the unit is whatever the model treats
//! its delays as.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// A point on the simulated clock
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct SimTime(pub f64);

impl SimTime {
    /// Zero time constant
    pub const ZERO: SimTime = SimTime(0.0);

    /// Maximum time constant (for sentinel values)
    pub const MAX: SimTime = SimTime(f64::MAX);

    #[inline]
    pub fn new(t: f64) -> Self {
        SimTime(t)
    }

    /// Get the raw clock value
    #[inline]
    pub fn get(&self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Total ordering used by the event queue, so NaN cannot poison the heap
    #[inline]
    pub fn total_cmp(&self, other: &SimTime) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for SimTime {
    #[inline]
    fn from(t: f64) -> Self {
        SimTime(t)
    }
}

impl Add for SimTime {
    type Output = SimTime;

    #[inline]
    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0 + rhs.0)
    }
}

impl Sub for SimTime {
    type Output = SimTime;

    #[inline]
    fn sub(self, rhs: SimTime) -> SimTime {
        SimTime(self.0 - rhs.0)
    }
}

impl AddAssign for SimTime {
    #[inline]
    fn add_assign(&mut self, rhs: SimTime) {
        self.0 += rhs.0;
    }
}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl fmt::Debug for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimTime({:.3})", self.0)
    }
}

impl fmt::Display for SimTime {
    /// Fixed-width decimal, the form used by log-record prefixes
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:014.9}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_arithmetic() {
        let t1 = SimTime::new(10.0);
        let t2 = SimTime::new(5.0);
        assert_eq!((t1 + t2).get(), 15.0);
        assert_eq!((t1 - t2).get(), 5.0);
    }

    #[test]
    fn test_total_cmp_handles_nan() {
        let t = SimTime::new(f64::NAN);
        assert_eq!(t.total_cmp(&SimTime::MAX), Ordering::Greater);
    }

    #[test]
    fn test_display_fixed_width() {
        assert_eq!(format!("{}", SimTime::new(5.0)), "0005.000000000");
    }
}
