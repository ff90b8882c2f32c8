//! Implementation of Newton's method with hard iteration caps

use crate::{cgmath64::*, tolerance::*};
use std::ops::{Mul, Sub};

/// the value and Jacobian corresponding to a parameter
#[derive(Clone, Debug)]
pub struct CalcOutput<V, M> {
    /// the value of the function
    pub value: V,
    /// the Jacobian of the function
    pub derivation: M,
}

/// why an iteration gave up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NewtonFailure {
    /// the Jacobian could not be inverted
    DegenerateJacobian,
    /// the iteration cap was reached before the update stagnated
    NotConverged,
}

/// Jacobian of a function
pub trait Jacobian<V>: Mul<V, Output = V> + Sized {
    #[doc(hidden)]
    fn invert(self) -> Option<Self>;
}

impl Jacobian<f64> for f64 {
    #[inline(always)]
    fn invert(self) -> Option<Self> {
        match self.so_small() {
            true => None,
            false => Some(1.0 / self),
        }
    }
}

impl Jacobian<Vector2> for Matrix2 {
    #[inline(always)]
    fn invert(self) -> Option<Self> { SquareMatrix::invert(&self) }
}

/// Solves `function(x) = 0` by Newton's method.
///
/// The iteration stops when the update stagnates within `TOLERANCE2`;
/// exceeding `trials` iterations is a [`NewtonFailure::NotConverged`].
/// # Examples
/// ```
/// use skiff_base::{newton::*, assert_near2};
///
/// let function = |x: f64| CalcOutput {
///     value: x * x - 2.0,
///     derivation: 2.0 * x,
/// };
/// let sqrt2 = solve(function, 1.0, 10).unwrap();
/// assert_near2!(sqrt2, f64::sqrt(2.0));
/// ```
pub fn solve<V, M>(
    function: impl Fn(V) -> CalcOutput<V, M>,
    mut hint: V,
    trials: usize,
) -> Result<V, NewtonFailure>
where
    V: Sub<Output = V> + Copy + Tolerance,
    M: Jacobian<V>,
{
    for _ in 0..=trials {
        let CalcOutput { value, derivation } = function(hint);
        let Some(inv) = derivation.invert() else {
            return Err(NewtonFailure::DegenerateJacobian);
        };
        let next = hint - inv * value;
        if next.near2(&hint) {
            return Ok(hint);
        }
        hint = next;
    }
    Err(NewtonFailure::NotConverged)
}

/// Solves `function(t) = 0` on the bracket `[lower, upper]` for a residual
/// that is increasing across the bracket.
///
/// Every Newton step that escapes the bracket falls back to bisection, so
/// the iterate never leaves `[lower, upper]`. Converged when the residual
/// magnitude drops below `tol`.
pub fn solve_bracketed(
    function: impl Fn(f64) -> CalcOutput<f64, f64>,
    mut hint: f64,
    mut lower: f64,
    mut upper: f64,
    tol: f64,
    trials: usize,
) -> Result<f64, NewtonFailure> {
    for _ in 0..=trials {
        let CalcOutput { value, derivation } = function(hint);
        if value.abs() < tol {
            return Ok(hint);
        }
        if value > 0.0 {
            upper = hint;
        } else {
            lower = hint;
        }
        let next = hint - value / derivation;
        hint = match next.is_finite() && lower < next && next < upper {
            true => next,
            false => 0.5 * (lower + upper),
        };
    }
    Err(NewtonFailure::NotConverged)
}
