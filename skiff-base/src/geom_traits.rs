use crate::cgmath64::*;
use crate::interval::Interval;

/// The evaluation capability shared by every curve-like shape: a twice
/// differentiable map from a closed parameter interval into 3-space.
///
/// Only the operations that the analysis and intersection algorithms
/// dispatch on live here; everything else stays on the concrete shapes.
pub trait SpatialCurve: Clone {
    /// Evaluates the curve at the parameter `t`.
    fn point_at(&self, t: f64) -> Point3;
    /// Returns the first derivative at `t`.
    fn derivative_at(&self, t: f64) -> Vector3;
    /// Returns the second derivative at `t`.
    fn second_derivative_at(&self, t: f64) -> Vector3;
    /// Returns the active parameter interval.
    fn domain(&self) -> Interval;
    /// Evaluates the curve at the front of its domain.
    fn start_point(&self) -> Point3 { self.point_at(self.domain().t0) }
    /// Evaluates the curve at the back of its domain.
    fn end_point(&self) -> Point3 { self.point_at(self.domain().t1) }
}

/// Orientation reversal. The reversed shape traces the same locus with the
/// parameter running the other way.
pub trait Reversible: Sized {
    /// Returns the reversed shape.
    fn reversed(&self) -> Self;
}

/// Application of an affine map, producing a fresh shape. All compound
/// values own their buffers, so transforming always allocates a new value
/// instead of mutating in place.
pub trait Transformable: Sized {
    /// Returns the image of `self` under `transform`.
    fn transformed(&self, transform: Matrix4) -> Self;
}
