//! Intersections between planes, lines, circles, and NURBS curves.
//!
//! Operations that legitimately have no solution return an empty
//! collection; an error is reserved for configurations without a unique
//! answer (parallel planes, parallel lines) or invalid inputs.

use crate::analyze::ITERATION_CAP;
use crate::errors::Error;
use crate::*;

/// relative parameter span under which a subdivided curve segment is
/// handed to the Newton polish
const LEAF_SPAN: f64 = 1.0e-3;

/// A transversal intersection or closest-approach candidate between two
/// curves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveIntersection {
    /// the point on the first curve
    pub point_a: Point3,
    /// the point on the second curve
    pub point_b: Point3,
    /// the parameter on the first curve
    pub param_a: f64,
    /// the parameter on the second curve
    pub param_b: f64,
}

/// An intersection between a curve and a plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurvePlaneIntersection {
    /// the intersection point
    pub point: Point3,
    /// the curve parameter
    pub parameter: f64,
}

/// Intersects two planes.
///
/// The returned line passes through the solution of the two plane
/// equations restricted to the cross-normal axis plane and points along
/// the unitized cross product of the normals.
/// # Failures
/// Returns [`Error::ParallelConfiguration`] when the normals are parallel.
/// # Examples
/// ```
/// use skiff_geometry::*;
/// let line = intersect::plane_plane(&Plane::xy(), &Plane::yz()).unwrap();
/// // the world y-axis
/// assert!(line.start().to_vec().magnitude().so_small());
/// assert!(line.direction().cross(Vector3::unit_y()).magnitude().so_small());
/// ```
pub fn plane_plane(a: &Plane, b: &Plane) -> Result<Line> {
    let direction = a.normal().cross(b.normal());
    if direction.magnitude().so_small() {
        return Err(Error::ParallelConfiguration);
    }
    let (na, nb) = (a.normal(), b.normal());
    let da = na.dot(a.origin().to_vec());
    let db = nb.dot(b.origin().to_vec());
    // solve on the coordinate plane orthogonal to the dominant direction axis
    let abs = Vector3::new(direction.x.abs(), direction.y.abs(), direction.z.abs());
    let axis = if abs.x >= abs.y && abs.x >= abs.z {
        0
    } else if abs.y >= abs.z {
        1
    } else {
        2
    };
    let (i, j) = ((axis + 1) % 3, (axis + 2) % 3);
    let det = na[i] * nb[j] - na[j] * nb[i];
    let pi = (da * nb[j] - db * na[j]) / det;
    let pj = (db * na[i] - da * nb[i]) / det;
    let mut origin = Point3::origin();
    origin[i] = pi;
    origin[j] = pj;
    Line::try_new(origin, origin + direction.normalize())
}

/// Intersects the infinite extension of a line with a plane, returning the
/// point and the line parameter.
/// # Failures
/// Returns [`Error::ParallelConfiguration`] when the line is parallel to
/// the plane, whether or not it is contained in it.
pub fn line_plane(line: &Line, plane: &Plane) -> Result<(Point3, f64)> {
    let denom = plane.normal().dot(line.direction());
    if denom.so_small() {
        return Err(Error::ParallelConfiguration);
    }
    let t = plane.normal().dot(plane.origin() - line.start()) / denom;
    Ok((line.point_at(t), t))
}

/// Returns the closest pair of points of two infinite lines; for skew
/// lines the points differ, for crossing lines they coincide.
/// # Failures
/// Returns [`Error::ParallelConfiguration`] when the lines are parallel.
/// # Examples
/// ```
/// use skiff_geometry::*;
/// let l0 = Line::try_new(Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)).unwrap();
/// let l1 = Line::try_new(Point3::new(0.0, -1.0, 1.0), Point3::new(0.0, 1.0, 1.0)).unwrap();
/// let closest = intersect::line_line(&l0, &l1).unwrap();
/// assert_near!(closest.point_a, Point3::new(0.0, 0.0, 0.0));
/// assert_near!(closest.point_b, Point3::new(0.0, 0.0, 1.0));
/// ```
pub fn line_line(l0: &Line, l1: &Line) -> Result<CurveIntersection> {
    let d0 = l0.direction();
    let d1 = l1.direction();
    let w = l0.start() - l1.start();
    let a = d0.dot(d0);
    let b = d0.dot(d1);
    let c = d1.dot(d1);
    let d = d0.dot(w);
    let e = d1.dot(w);
    let det = a * c - b * b;
    if (det / (a * c)).so_small() {
        return Err(Error::ParallelConfiguration);
    }
    let s = (b * e - c * d) / det;
    let t = (a * e - b * d) / det;
    Ok(CurveIntersection {
        point_a: l0.point_at(s),
        point_b: l1.point_at(t),
        param_a: s,
        param_b: t,
    })
}

/// Intersects a polyline with a plane; parameters are in the polyline's
/// segment-index parameterization.
pub fn polyline_plane(polyline: &Polyline, plane: &Plane) -> Vec<CurvePlaneIntersection> {
    let mut res: Vec<CurvePlaneIntersection> = Vec::new();
    for (idx, window) in polyline.vertices().windows(2).enumerate() {
        let segment = Line {
            start: window[0],
            end: window[1],
        };
        let Ok((point, t)) = line_plane(&segment, plane) else {
            continue;
        };
        if !(-TOLERANCE..=1.0 + TOLERANCE).contains(&t) {
            continue;
        }
        let parameter = idx as f64 + t;
        // shared vertices produce the same point from both sides
        if res
            .last()
            .is_some_and(|prev| (prev.parameter - parameter).abs() < TOLERANCE)
        {
            continue;
        }
        res.push(CurvePlaneIntersection { point, parameter });
    }
    res
}

/// Intersects a line with a circle. `param_a` of a result is the line
/// parameter, `param_b` the circle angle.
///
/// A line transversal to the circle plane meets the circle only if the
/// piercing point happens to lie on it; a line inside the plane reduces to
/// a quadratic.
pub fn line_circle(line: &Line, circle: &Circle) -> Vec<CurveIntersection> {
    let plane = circle.plane();
    let in_plane = plane.signed_distance(line.start()).so_small()
        && plane.normal().dot(line.direction()).so_small();
    let mut res = Vec::new();
    if !in_plane {
        let Ok((point, t)) = line_plane(line, &plane) else {
            return res;
        };
        if (point.distance(circle.center()) - circle.radius()).so_small() {
            let (u, v) = plane.closest_parameter(point);
            res.push(CurveIntersection {
                point_a: point,
                point_b: point,
                param_a: t,
                param_b: positive_angle(f64::atan2(v, u)),
            });
        }
        return res;
    }
    let (wu, wv) = plane.closest_parameter(line.start());
    let (du, dv) = {
        let dir = line.direction();
        (dir.dot(plane.x_axis()), dir.dot(plane.y_axis()))
    };
    let a = du * du + dv * dv;
    let b = 2.0 * (wu * du + wv * dv);
    let c = wu * wu + wv * wv - circle.radius() * circle.radius();
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return res;
    }
    let sqrt = disc.sqrt();
    let mut params = vec![(-b - sqrt) / (2.0 * a)];
    if !sqrt.so_small() {
        params.push((-b + sqrt) / (2.0 * a));
    }
    for t in params {
        let point = line.point_at(t);
        let (u, v) = plane.closest_parameter(point);
        res.push(CurveIntersection {
            point_a: point,
            point_b: point,
            param_a: t,
            param_b: positive_angle(f64::atan2(v, u)),
        });
    }
    res
}

/// Intersects a plane with a circle: the two planes are crossed into a
/// line which is then intersected with the circle in its plane. An empty
/// collection is returned for parallel or coincident planes.
pub fn plane_circle(plane: &Plane, circle: &Circle) -> Vec<Point3> {
    let Ok(line) = plane_plane(plane, &circle.plane()) else {
        return Vec::new();
    };
    line_circle(&line, circle)
        .into_iter()
        .map(|ci| ci.point_a)
        .collect()
}

/// Intersects a curve with a plane by recursive bounding pruning.
///
/// The signed distances of a segment's control points bound the signed
/// distance of the segment itself, so a segment whose distances do not
/// straddle zero is discarded; surviving leaves are polished by a Newton
/// iteration on `n · (C(t) - o)`.
/// # Examples
/// ```
/// use skiff_geometry::*;
/// let curve = NurbsCurve::from_points(&[
///     Point3::new(0.0, -1.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(2.0, -1.0, 0.0),
///     Point3::new(3.0, 1.0, 0.0),
/// ], 1).unwrap();
/// let hits = intersect::curve_plane(&curve, &Plane::zx(), TOLERANCE);
/// assert_eq!(hits.len(), 3);
/// for hit in hits {
///     assert!(hit.point.y.so_small());
/// }
/// ```
pub fn curve_plane(curve: &NurbsCurve, plane: &Plane, tol: f64) -> Vec<CurvePlaneIntersection> {
    nonpositive_tolerance!(tol);
    let mut work = curve.clone();
    if !work.is_clamped() {
        work.clamp_ends();
    }
    let Interval { t0, t1 } = work.domain();
    let leaf_span = (t1 - t0) * LEAF_SPAN;

    let mut params = Vec::new();
    let mut stack = vec![work.clone()];
    while let Some(segment) = stack.pop() {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for cp in segment.control_points() {
            let dist = plane.signed_distance(cp.to_point());
            min = f64::min(min, dist);
            max = f64::max(max, dist);
        }
        if min > tol || max < -tol {
            continue;
        }
        let Interval { t0: a, t1: b } = segment.domain();
        if b - a > leaf_span {
            let mut former = segment;
            let latter = former.cut((a + b) / 2.0);
            stack.push(former);
            stack.push(latter);
            continue;
        }
        let mut t = (a + b) / 2.0;
        for _ in 0..ITERATION_CAP {
            let f = plane.signed_distance(work.point_at(t));
            if f.abs() < tol {
                params.push(t);
                break;
            }
            let fprime = plane.normal().dot(work.derivative_at(t));
            if fprime.so_small() {
                break;
            }
            t = Interval::new(t0, t1).clamp(t - f / fprime);
        }
    }

    params.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mut res: Vec<CurvePlaneIntersection> = Vec::new();
    for t in params {
        if res
            .last()
            .is_some_and(|prev| (t - prev.parameter).abs() < 5.0 * f64::max(tol, leaf_span))
        {
            continue;
        }
        res.push(CurvePlaneIntersection {
            point: work.point_at(t),
            parameter: t,
        });
    }
    res
}

/// Newton polish of an intersection candidate between two curves, clamped
/// into both domains; `None` when the iteration cap is exhausted.
fn refine_pair(
    a: &NurbsCurve,
    b: &NurbsCurve,
    hint: (f64, f64),
    tol: f64,
) -> Option<(f64, f64)> {
    let range_a = a.domain();
    let range_b = b.domain();
    let (mut s, mut t) = hint;
    for _ in 0..ITERATION_CAP {
        let pa = a.point_at(s).to_vec();
        let pb = b.point_at(t).to_vec();
        if (pa - pb).magnitude() < tol {
            return Some((s, t));
        }
        let da = a.derivative_at(s);
        let db = b.derivative_at(t);
        let diff = pa - pb;
        let residual = Vector2::new(diff.dot(da), -diff.dot(db));
        let jacobian = Matrix2::new(
            da.magnitude2() + diff.dot(a.second_derivative_at(s)),
            -db.dot(da),
            -da.dot(db),
            db.magnitude2() - diff.dot(b.second_derivative_at(t)),
        );
        let inv = jacobian.invert()?;
        let step = inv * residual;
        let next = (range_a.clamp(s - step.x), range_b.clamp(t - step.y));
        if (next.0 - s).so_small2() && (next.1 - t).so_small2() {
            s = next.0;
            t = next.1;
            break;
        }
        s = next.0;
        t = next.1;
    }
    let dist = a.point_at(s).distance(b.point_at(t));
    match dist < tol {
        true => Some((s, t)),
        false => None,
    }
}

fn push_deduped(res: &mut Vec<CurveIntersection>, candidate: CurveIntersection, tol: f64) {
    let duplicate = res
        .iter()
        .any(|ci| (ci.param_a - candidate.param_a).abs() < 5.0 * tol);
    if !duplicate {
        res.push(candidate);
    }
}

/// Intersects two curves by descending a lazily subdivided pair tree,
/// pruning on disjoint control-point bounding boxes and polishing the
/// surviving leaves with a two-variable Newton iteration.
/// # Examples
/// ```
/// use skiff_geometry::*;
/// let curve0 = NurbsCurve::from_points(&[
///     Point3::new(-1.0, -1.0, 0.0),
///     Point3::new(0.0, 2.0, 0.0),
///     Point3::new(1.0, -1.0, 0.0),
/// ], 2).unwrap();
/// let curve1 = Line::try_new(Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0))
///     .unwrap().to_nurbs();
/// let hits = intersect::curve_curve(&curve0, &curve1, TOLERANCE);
/// assert_eq!(hits.len(), 2);
/// for hit in hits {
///     assert!(hit.point_a.distance(hit.point_b) < TOLERANCE);
///     assert!(hit.point_a.y.abs() < TOLERANCE);
/// }
/// ```
pub fn curve_curve(a: &NurbsCurve, b: &NurbsCurve, tol: f64) -> Vec<CurveIntersection> {
    nonpositive_tolerance!(tol);
    let mut a = a.clone();
    if !a.is_clamped() {
        a.clamp_ends();
    }
    let mut b = b.clone();
    if !b.is_clamped() {
        b.clamp_ends();
    }
    let leaf_a = a.domain().length() * LEAF_SPAN;
    let leaf_b = b.domain().length() * LEAF_SPAN;

    let mut res = Vec::new();
    let mut stack = vec![(a.clone(), b.clone())];
    while let Some((seg_a, seg_b)) = stack.pop() {
        let box_a = seg_a.roughly_bounding_box();
        let box_b = seg_b.roughly_bounding_box();
        if box_a.is_disjoint(&box_b, tol) {
            continue;
        }
        let Interval { t0: a0, t1: a1 } = seg_a.domain();
        let Interval { t0: b0, t1: b1 } = seg_b.domain();
        let split_a = a1 - a0 > leaf_a;
        let split_b = b1 - b0 > leaf_b;
        match (split_a, split_b) {
            (true, true) => {
                let mut a_former = seg_a;
                let a_latter = a_former.cut((a0 + a1) / 2.0);
                let mut b_former = seg_b;
                let b_latter = b_former.cut((b0 + b1) / 2.0);
                stack.push((a_former.clone(), b_former.clone()));
                stack.push((a_former, b_latter.clone()));
                stack.push((a_latter.clone(), b_former));
                stack.push((a_latter, b_latter));
            }
            (true, false) => {
                let mut a_former = seg_a;
                let a_latter = a_former.cut((a0 + a1) / 2.0);
                stack.push((a_former, seg_b.clone()));
                stack.push((a_latter, seg_b));
            }
            (false, true) => {
                let mut b_former = seg_b;
                let b_latter = b_former.cut((b0 + b1) / 2.0);
                stack.push((seg_a.clone(), b_former));
                stack.push((seg_a, b_latter));
            }
            (false, false) => {
                let hint = ((a0 + a1) / 2.0, (b0 + b1) / 2.0);
                if let Some((s, t)) = refine_pair(&a, &b, hint, tol) {
                    push_deduped(
                        &mut res,
                        CurveIntersection {
                            point_a: a.point_at(s),
                            point_b: b.point_at(t),
                            param_a: s,
                            param_b: t,
                        },
                        f64::max(tol, leaf_a),
                    );
                }
            }
        }
    }
    res.sort_by(|x, y| x.param_a.partial_cmp(&y.param_a).unwrap());
    res
}

/// Intersects a curve with a line.
#[inline(always)]
pub fn curve_line(curve: &NurbsCurve, line: &Line, tol: f64) -> Vec<CurveIntersection> {
    curve_curve(curve, &line.to_nurbs(), tol)
}

/// Returns the transversal self-intersections of a curve. Pairs meeting at
/// the subdivision seams are filtered by their parameter gap.
/// # Examples
/// ```
/// use skiff_geometry::*;
/// // a flat alpha-shaped loop
/// let curve = NurbsCurve::from_points(&[
///     Point3::new(-1.0, 0.0, 0.0),
///     Point3::new(2.0, 2.0, 0.0),
///     Point3::new(-2.0, 2.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
/// ], 3).unwrap();
/// let hits = intersect::curve_self(&curve, TOLERANCE);
/// assert_eq!(hits.len(), 1);
/// ```
pub fn curve_self(curve: &NurbsCurve, tol: f64) -> Vec<CurveIntersection> {
    nonpositive_tolerance!(tol);
    let mut work = curve.clone();
    if !work.is_clamped() {
        work.clamp_ends();
    }
    let Interval { t0, t1 } = work.domain();
    let gap = (t1 - t0) * 1.0e-2;

    let mut res = Vec::new();
    let mut stack = vec![work];
    while let Some(segment) = stack.pop() {
        let Interval { t0: a, t1: b } = segment.domain();
        let mut former = segment;
        let latter = former.cut((a + b) / 2.0);
        for ci in curve_curve(&former, &latter, tol) {
            if (ci.param_b - ci.param_a).abs() < gap {
                continue;
            }
            push_deduped(&mut res, ci, tol);
        }
        if b - a > (t1 - t0) * 0.25 {
            stack.push(former);
            stack.push(latter);
        }
    }
    res.sort_by(|x, y| x.param_a.partial_cmp(&y.param_a).unwrap());
    res
}

fn positive_angle(theta: f64) -> f64 {
    match theta < 0.0 {
        true => theta + 2.0 * std::f64::consts::PI,
        false => theta,
    }
}
