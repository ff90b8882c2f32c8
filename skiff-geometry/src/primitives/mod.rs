//! Constructive primitives that reduce to NURBS: plane, line, arc, circle,
//! polyline, and polygon. Each curve-like primitive implements
//! [`SpatialCurve`](crate::SpatialCurve) and exposes a `to_nurbs`
//! reduction to an exactly equivalent rational curve.

use crate::*;
use serde::{Deserialize, Serialize};

/// Implements the circular arc.
pub mod arc;
/// Implements the circle.
pub mod circle;
/// Implements the line segment.
pub mod line;
/// Implements the oriented plane.
pub mod plane;
/// Implements the closed planar polygon.
pub mod polygon;
/// Implements the polyline.
pub mod polyline;

/// An oriented plane: an origin point together with a right-handed
/// orthonormal frame.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Plane {
    pub(crate) origin: Point3,
    pub(crate) x_axis: Vector3,
    pub(crate) y_axis: Vector3,
    pub(crate) z_axis: Vector3,
}

/// A line segment between two distinct points.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Line {
    pub(crate) start: Point3,
    pub(crate) end: Point3,
}

/// A circular arc: a plane whose x-axis points at the arc start, a radius,
/// and the swept angle interval measured from the x-axis.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Arc {
    pub(crate) plane: Plane,
    pub(crate) radius: f64,
    pub(crate) angles: Interval,
}

/// A full circle on a plane.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) plane: Plane,
    pub(crate) radius: f64,
}

/// An open polyline with consecutive duplicate vertices culled.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Polyline {
    pub(crate) vertices: Vec<Point3>,
}

/// A closed planar polygon; the stored vertex list is closed
/// (first = last).
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Polygon {
    pub(crate) vertices: Vec<Point3>,
    pub(crate) plane: Plane,
}

/// Returns some unit vector perpendicular to `v`, stable under small
/// perturbations of the dominant component.
pub(crate) fn arbitrary_perpendicular(v: Vector3) -> Vector3 {
    let candidate = match v.x.abs() < v.y.abs() {
        true => Vector3::new(0.0, -v.z, v.y),
        false => Vector3::new(-v.z, 0.0, v.x),
    };
    match candidate.magnitude2().so_small2() {
        true => Vector3::unit_x(),
        false => candidate.normalize(),
    }
}

/// Intersection of the two tangent lines `p + s t0` and `q + u t2`, assumed
/// non-parallel and coplanar; used by the rational Bezier stitching of arcs
/// and surfaces of revolution.
pub(crate) fn tangent_intersection(p0: Point3, t0: Vector3, p2: Point3, t2: Vector3) -> Point3 {
    let d = p2 - p0;
    let a00 = t0.dot(t0);
    let a01 = -t0.dot(t2);
    let a10 = t0.dot(t2);
    let a11 = -t2.dot(t2);
    let det = a00 * a11 - a01 * a10;
    let (b0, b1) = (t0.dot(d), t2.dot(d));
    let s = (b0 * a11 - b1 * a01) / det;
    p0 + t0 * s
}
