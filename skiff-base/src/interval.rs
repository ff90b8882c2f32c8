use serde::{Deserialize, Serialize};

/// Closed parameter interval `[t0, t1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// lower bound
    pub t0: f64,
    /// upper bound
    pub t1: f64,
}

impl Interval {
    /// the unit interval `[0, 1]`
    pub const UNIT: Interval = Interval { t0: 0.0, t1: 1.0 };

    /// constructor
    #[inline(always)]
    pub const fn new(t0: f64, t1: f64) -> Interval { Interval { t0, t1 } }

    /// Returns the length `t1 - t0`.
    #[inline(always)]
    pub fn length(self) -> f64 { self.t1 - self.t0 }

    /// Returns the midpoint.
    #[inline(always)]
    pub fn mid(self) -> f64 { (self.t0 + self.t1) * 0.5 }

    /// Maps the normalized coordinate `s` in `[0, 1]` into the interval.
    #[inline(always)]
    pub fn param_at(self, s: f64) -> f64 { self.t0 * (1.0 - s) + self.t1 * s }

    /// Inverse of [`Interval::param_at`].
    #[inline(always)]
    pub fn normalized(self, t: f64) -> f64 { (t - self.t0) / self.length() }

    /// Returns whether `t` lies in the interval.
    #[inline(always)]
    pub fn contains(self, t: f64) -> bool { self.t0 <= t && t <= self.t1 }

    /// Clamps `t` into the interval.
    #[inline(always)]
    pub fn clamp(self, t: f64) -> f64 { f64::max(self.t0, f64::min(self.t1, t)) }
}

impl From<(f64, f64)> for Interval {
    #[inline(always)]
    fn from((t0, t1): (f64, f64)) -> Interval { Interval { t0, t1 } }
}

#[test]
fn interval_mapping_round_trip() {
    let interval = Interval::new(2.0, 6.0);
    assert_eq!(interval.length(), 4.0);
    assert_eq!(interval.mid(), 4.0);
    assert_eq!(interval.param_at(0.25), 3.0);
    assert_eq!(interval.normalized(3.0), 0.25);
    assert_eq!(interval.clamp(7.0), 6.0);
    assert!(interval.contains(2.0) && !interval.contains(1.0));
}
