//! Simulated time.
//!
//! The kernel only knows logical time: [`SimTime`] is an absolute timestamp on
//! the simulated timeline and [`TimeAdvance`] is the delay a model spends in a
//! state before its next spontaneous transition. Neither has any relationship
//! with wall-clock time.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Sub;

/// An absolute simulation timestamp.
///
/// A `SimTime` is always finite and non-negative, which makes it totally
/// ordered.
#[derive(Copy, Clone, Default, PartialEq)]
pub struct SimTime(f64);

impl SimTime {
    /// The origin of the simulated timeline.
    pub const ZERO: Self = Self(0.0);

    /// Creates a timestamp, or returns `None` if `t` is negative, infinite or
    /// NaN.
    pub fn new(t: f64) -> Option<Self> {
        if t.is_finite() && t >= 0.0 {
            // Normalize -0.0 so that ordering and equality agree.
            Some(Self(t + 0.0))
        } else {
            None
        }
    }

    /// Returns the timestamp as a floating-point number.
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Returns the timestamp that lies `delay` after `self`, or `None` if the
    /// delay is infinite or the result is not a valid timestamp.
    pub fn checked_add(self, delay: TimeAdvance) -> Option<Self> {
        match delay {
            TimeAdvance::Finite(d) => Self::new(self.0 + d),
            TimeAdvance::Infinite => None,
        }
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Sub for SimTime {
    type Output = f64;

    fn sub(self, rhs: Self) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Debug for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimTime({})", self.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The time a model remains in a state if no external event arrives first.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TimeAdvance {
    /// A spontaneous transition is due after the given non-negative delay.
    Finite(f64),
    /// The state is passive: no spontaneous transition is ever scheduled.
    Infinite,
}

impl TimeAdvance {
    /// Returns `true` for [`TimeAdvance::Infinite`].
    pub fn is_passive(self) -> bool {
        matches!(self, Self::Infinite)
    }

    /// Returns the delay if it is finite.
    pub fn finite(self) -> Option<f64> {
        match self {
            Self::Finite(d) => Some(d),
            Self::Infinite => None,
        }
    }

    /// Checks whether this is a usable time advance, i.e. either infinite or
    /// a finite, non-negative delay.
    pub(crate) fn is_valid(self) -> bool {
        match self {
            Self::Finite(d) => d.is_finite() && d >= 0.0,
            Self::Infinite => true,
        }
    }

    /// Returns `true` if an elapsed time does not exceed this time advance.
    pub(crate) fn admits(self, elapsed: f64) -> bool {
        match self {
            Self::Finite(d) => elapsed <= d,
            Self::Infinite => true,
        }
    }
}

impl From<f64> for TimeAdvance {
    fn from(delay: f64) -> Self {
        Self::Finite(delay)
    }
}

impl fmt::Display for TimeAdvance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(d) => fmt::Display::fmt(d, f),
            Self::Infinite => f.write_str("inf"),
        }
    }
}
