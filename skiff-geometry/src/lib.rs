//! # Overview
//! `skiff_geometry` is a crate for describing geometrical information:
//! knot vectors, rational B-spline curves and surfaces, the constructive
//! primitives that reduce to them, and the analysis, fitting, and
//! intersection algorithms on top.

#![warn(
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

use serde::{Deserialize, Serialize};

pub use skiff_base::{assert_near, assert_near2, nonpositive_tolerance, prop_assert_near};

/// re-export `skiff_base`
pub mod base {
    pub use skiff_base::bounding_box::*;
    pub use skiff_base::cgmath64::*;
    pub use skiff_base::ders;
    pub use skiff_base::geom_traits::*;
    pub use skiff_base::interval::*;
    pub use skiff_base::newton;
    pub use skiff_base::tables;
    pub use skiff_base::tolerance::*;
}
pub use base::*;

/// knot vector
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct KnotVec(Vec<f64>);

/// NURBS curve
///
/// The control points are stored in pre-multiplied homogeneous form
/// `(w x, w y, w z, w)`; every modification algorithm is linear in this
/// space, so rational curves stay exact under knot insertion, degree
/// elevation, and splitting.
/// # Examples
/// ```
/// use skiff_geometry::*;
///
/// // the knot vector
/// let knot_vec = KnotVec::try_from(
///     vec![0.0, 0.0, 0.0, 0.25, 0.25, 0.5, 0.5, 0.75, 0.75, 1.0, 1.0, 1.0]
/// ).unwrap();
///
/// // the control points of the unit circle
/// let ctrl_pts = vec![
///     Vector4::new(0.0, -2.0, 0.0, 2.0),
///     Vector4::new(1.0, -1.0, 0.0, 1.0),
///     Vector4::new(1.0, 0.0, 0.0, 1.0),
///     Vector4::new(1.0, 1.0, 0.0, 1.0),
///     Vector4::new(0.0, 2.0, 0.0, 2.0),
///     Vector4::new(-1.0, 1.0, 0.0, 1.0),
///     Vector4::new(-1.0, 0.0, 0.0, 1.0),
///     Vector4::new(-1.0, -1.0, 0.0, 1.0),
///     Vector4::new(0.0, -2.0, 0.0, 2.0),
/// ];
///
/// let circle = NurbsCurve::new(knot_vec, ctrl_pts);
///
/// const N: usize = 100; // sample size in test
/// for i in 0..N {
///     let t = 1.0 / (N as f64) * (i as f64);
///     let pt = circle.point_at(t);
///     f64::assert_near2(&(pt.x * pt.x + pt.y * pt.y), &1.0);
/// }
/// ```
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct NurbsCurve {
    knot_vec: KnotVec,
    control_points: Vec<Vector4>,
}

/// rectangular grid of control points, stored as a flat buffer
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ControlGrid<V> {
    points: Vec<V>,
    cols: usize,
}

/// NURBS surface
///
/// A tensor-product rational surface. The knot vectors are normalized to
/// `[0, 1]` on construction; the control net is stored in pre-multiplied
/// homogeneous form like [`NurbsCurve`].
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct NurbsSurface {
    knot_vecs: (KnotVec, KnotVec),
    control_points: ControlGrid<Vector4>,
}

/// Error handler for [`Error`](./errors/enum.Error.html)
pub type Result<T> = std::result::Result<T, crate::errors::Error>;

/// analysis: arc length, parameter at length, closest points
pub mod analyze;
/// Enumerates `Error`.
pub mod errors;
/// curve fitting: interpolation and approximation
pub mod fitting;
/// intersections between curves, lines, planes, and circles
pub mod intersect;
#[doc(hidden)]
pub mod knot_vec;
/// NURBS curves and surfaces
pub mod nurbs;
/// constructive primitives: plane, line, arc, circle, polyline, polygon
pub mod primitives;

pub use primitives::{Arc, Circle, Line, Plane, Polygon, Polyline};

#[doc(hidden)]
#[inline(always)]
pub fn inv_or_zero(delta: f64) -> f64 {
    match delta.so_small() {
        true => 0.0,
        false => delta.recip(),
    }
}

/// Trait alias used by tests: `f64::assert_near2(&a, &b)`.
pub trait AssertNear: Tolerance + Sized {
    /// asserts two values are near within `TOLERANCE`
    fn assert_near(a: &Self, b: &Self) { assert_near!(a, b) }
    /// asserts two values are near within `TOLERANCE2`
    fn assert_near2(a: &Self, b: &Self) { assert_near2!(a, b) }
}
impl<T: Tolerance> AssertNear for T {}
