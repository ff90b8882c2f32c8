//! Metric analysis of curves and surfaces: arc length by Gauss-Legendre
//! quadrature, parameter at arc length, adaptive parameter division, and
//! closest-point queries.

use crate::errors::Error;
use crate::*;
use skiff_base::newton::{solve_bracketed, CalcOutput};
use skiff_base::tables::gauss_legendre;

/// hard iteration cap of the Newton and bisection loops
pub const ITERATION_CAP: usize = 50;

/// default convergence tolerance of the arc-length inversion
pub const LENGTH_TOLERANCE: f64 = 1.0e-10;

/// extra quadrature order on top of the curve degree
const QUADRATURE_MARGIN: usize = 16;

/// Searches the parameter `t` which minimizes `|curve(t) - point|` by
/// Newton's method with the initial guess `hint`; the iterate is clamped
/// into the parameter range at every step. Returns `None` if the number of
/// attempts exceeds `trials`.
pub fn search_nearest_parameter<C: SpatialCurve>(
    curve: &C,
    point: Point3,
    hint: f64,
    trials: usize,
) -> Option<f64> {
    let pt = curve.point_at(hint);
    let der = curve.derivative_at(hint);
    let der2 = curve.second_derivative_at(hint);
    let f = der.dot(pt - point);
    let fprime = der2.dot(pt - point) + der.magnitude2();
    if f.so_small2() || fprime.so_small() {
        Some(hint)
    } else if trials == 0 {
        None
    } else {
        let next = curve.domain().clamp(hint - f / fprime);
        search_nearest_parameter(curve, point, next, trials - 1)
    }
}

/// Subdivides the range until the curve deviates from the chord of each
/// part by less than `tol`, and returns the division parameters.
pub fn parameter_division<C: SpatialCurve>(curve: &C, range: (f64, f64), tol: f64) -> Vec<f64> {
    nonpositive_tolerance!(tol);
    // probe off the midpoint so that odd symmetries cannot fool the test
    let p = 0.51;
    let t = range.0 * (1.0 - p) + range.1 * p;
    let pt0 = curve.point_at(range.0);
    let pt1 = curve.point_at(range.1);
    let mid = pt0 + (pt1 - pt0) * p;
    if curve.point_at(t).distance(mid) < tol {
        vec![range.0, range.1]
    } else {
        let mid = (range.0 + range.1) / 2.0;
        let mut res = parameter_division(curve, (range.0, mid), tol);
        let _ = res.pop();
        res.extend(parameter_division(curve, (mid, range.1), tol));
        res
    }
}

/// Gauss-Legendre arc length of `curve` over `[a, b]`, with the quadrature
/// order tied to the degree.
fn quadrature_length(curve: &NurbsCurve, a: f64, b: f64) -> f64 {
    let order = curve.degree() + QUADRATURE_MARGIN;
    let half = (b - a) / 2.0;
    let mid = (a + b) / 2.0;
    let sum: f64 = gauss_legendre(order)
        .iter()
        .map(|qp| qp.weight * curve.derivative_at(mid + half * qp.abscissa).magnitude())
        .sum();
    sum * half
}

impl NurbsCurve {
    fn measurable(&self) -> NurbsCurve {
        let mut curve = self.clone();
        if !curve.is_clamped() {
            curve.clamp_ends();
        }
        curve
    }

    /// Returns the total arc length of the curve, by Gauss-Legendre
    /// quadrature of order `degree + 16` per Bezier segment.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let line = Line::try_new(Point3::new(0.0, 0.0, 0.0), Point3::new(3.0, 4.0, 0.0))
    ///     .unwrap().to_nurbs();
    /// f64::assert_near2(&line.length(), &5.0);
    /// ```
    pub fn length(&self) -> f64 {
        self.measurable()
            .bezier_decomposition()
            .iter()
            .map(|segment| {
                let Interval { t0, t1 } = segment.domain();
                quadrature_length(segment, t0, t1)
            })
            .sum()
    }

    /// Returns the arc length of the sub-curve over `[front, t]`; the
    /// parameter is clamped into the active domain.
    pub fn length_at(&self, t: f64) -> f64 {
        let curve = self.measurable();
        let t = curve.domain().clamp(t);
        let mut total = 0.0;
        for segment in curve.bezier_decomposition() {
            let Interval { t0: a, t1: b } = segment.domain();
            if t >= b {
                total += quadrature_length(&segment, a, b);
            } else if t > a {
                total += quadrature_length(&segment, a, t);
            }
        }
        total
    }

    /// Returns the parameter at which the arc length from the front reaches
    /// `length`, converged to [`LENGTH_TOLERANCE`].
    #[inline(always)]
    pub fn parameter_at_length(&self, length: f64) -> Result<f64> {
        self.try_parameter_at_length(length, LENGTH_TOLERANCE)
    }

    /// Returns the parameter at which the arc length from the front reaches
    /// `length`, converged to the given residual tolerance.
    ///
    /// Walks the Bezier decomposition accumulating segment lengths until the
    /// target falls inside one segment, then runs a bracketed Newton
    /// iteration on the length residual, bisecting on any step that leaves
    /// the bracket. Arguments beyond the total length are clamped to the
    /// domain ends.
    /// # Failures
    /// Returns [`Error::UnconvergedIteration`] when the iteration cap is
    /// reached first.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let line = Line::try_new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0))
    ///     .unwrap().to_nurbs();
    /// let t = line.parameter_at_length(2.5).unwrap();
    /// assert_near!(line.point_at(t), Point3::new(2.5, 0.0, 0.0));
    /// ```
    pub fn try_parameter_at_length(&self, length: f64, tol: f64) -> Result<f64> {
        let curve = self.measurable();
        let Interval { t0, t1 } = curve.domain();
        if length <= 0.0 {
            return Ok(t0);
        }
        let mut rest = length;
        for segment in curve.bezier_decomposition() {
            let Interval { t0: a, t1: b } = segment.domain();
            let segment_length = quadrature_length(&segment, a, b);
            if rest > segment_length {
                rest -= segment_length;
                continue;
            }
            let function = |t: f64| CalcOutput {
                value: quadrature_length(&segment, a, t) - rest,
                derivation: segment.derivative_at(t).magnitude(),
            };
            let hint = a + (b - a) * rest / segment_length;
            return solve_bracketed(function, hint, a, b, tol, ITERATION_CAP)
                .map_err(|_| Error::UnconvergedIteration);
        }
        Ok(t1)
    }

    /// Returns the parameter of the point of the curve closest to `point`.
    ///
    /// The curve is tessellated adaptively until each part deviates from
    /// its chord by less than a fraction of the curve extent; the nearest
    /// tessellation vertex seeds a domain-clamped Newton iteration.
    /// # Failures
    /// Returns [`Error::UnconvergedIteration`] when the Newton iteration
    /// exceeds its cap.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let line = Line::try_new(Point3::new(0.0, 0.0, 0.0), Point3::new(30.0, 45.0, 0.0))
    ///     .unwrap().to_nurbs();
    /// let t = line.closest_parameter(Point3::new(10.0, 20.0, 0.0)).unwrap();
    /// assert_near!(line.point_at(t), Point3::new(12.307692307692308, 18.461538461538463, 0.0));
    /// ```
    pub fn closest_parameter(&self, point: Point3) -> Result<f64> {
        let Interval { t0, t1 } = self.domain();
        let extent = self.roughly_bounding_box().diameter();
        let tol = f64::max(extent * 1.0e-4, TOLERANCE);
        let division = parameter_division(self, (t0, t1), tol);
        let hint = division
            .iter()
            .copied()
            .min_by(|s, t| {
                let ds = self.point_at(*s).distance2(point);
                let dt = self.point_at(*t).distance2(point);
                ds.partial_cmp(&dt).unwrap()
            })
            .unwrap();
        let t = search_nearest_parameter(self, point, hint, ITERATION_CAP)
            .ok_or(Error::UnconvergedIteration)?;
        // a Newton run may climb to a worse critical point; keep the seed then
        match self.point_at(t).distance2(point) <= self.point_at(hint).distance2(point) {
            true => Ok(t),
            false => Ok(hint),
        }
    }

    /// Returns the point of the curve closest to `point`.
    #[inline(always)]
    pub fn closest_point(&self, point: Point3) -> Result<Point3> {
        Ok(self.point_at(self.closest_parameter(point)?))
    }
}

impl NurbsSurface {
    /// Returns the parameters of the point of the surface closest to
    /// `point`, by a coarse grid presearch followed by a two-variable
    /// Newton iteration on the gradient of the squared distance, clamped
    /// into the domain.
    /// # Failures
    /// Returns [`Error::UnconvergedIteration`] when the iteration cap is
    /// reached before the gradient vanishes.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let surface = NurbsSurface::from_corners(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(2.0, 0.0, 0.0),
    ///     Point3::new(0.0, 2.0, 0.0),
    ///     Point3::new(2.0, 2.0, 0.0),
    /// );
    /// let (u, v) = surface.closest_parameter(Point3::new(0.5, 1.0, 3.0)).unwrap();
    /// assert_near!(surface.point_at(u, v), Point3::new(0.5, 1.0, 0.0));
    /// ```
    pub fn closest_parameter(&self, point: Point3) -> Result<(f64, f64)> {
        let (udom, vdom) = self.domain();
        let (u0, u1) = (udom.t0, udom.t1);
        let (v0, v1) = (vdom.t0, vdom.t1);
        let udiv = usize::max(8, 2 * self.control_grid().rows());
        let vdiv = usize::max(8, 2 * self.control_grid().cols());
        let mut best = (u0, v0);
        let mut min = f64::INFINITY;
        for i in 0..=udiv {
            for j in 0..=vdiv {
                let u = u0 + (u1 - u0) * i as f64 / udiv as f64;
                let v = v0 + (v1 - v0) * j as f64 / vdiv as f64;
                let dist = self.point_at(u, v).distance2(point);
                if dist < min {
                    min = dist;
                    best = (u, v);
                }
            }
        }

        let (mut u, mut v) = best;
        for _ in 0..ITERATION_CAP {
            let ders = self.ders(u, v, 2);
            let diff = ders[0][0] - point.to_vec();
            let (su, sv) = (ders[1][0], ders[0][1]);
            let residual = Vector2::new(diff.dot(su), diff.dot(sv));
            if residual.so_small2() {
                return Ok((u, v));
            }
            let jacobian = Matrix2::new(
                su.magnitude2() + diff.dot(ders[2][0]),
                su.dot(sv) + diff.dot(ders[1][1]),
                su.dot(sv) + diff.dot(ders[1][1]),
                sv.magnitude2() + diff.dot(ders[0][2]),
            );
            let Some(inv) = jacobian.invert() else {
                return Ok((u, v));
            };
            let step = inv * residual;
            let next = (
                Interval::new(u0, u1).clamp(u - step.x),
                Interval::new(v0, v1).clamp(v - step.y),
            );
            if (next.0 - u).so_small2() && (next.1 - v).so_small2() {
                return Ok(next);
            }
            u = next.0;
            v = next.1;
        }
        Err(Error::UnconvergedIteration)
    }

    /// Returns the point of the surface closest to `point`.
    #[inline(always)]
    pub fn closest_point(&self, point: Point3) -> Result<Point3> {
        let (u, v) = self.closest_parameter(point)?;
        Ok(self.point_at(u, v))
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn quarter_circle() -> NurbsCurve {
        let w = f64::sqrt(0.5);
        NurbsCurve::new(
            KnotVec::bezier_knot(2),
            vec![
                Vector4::new(1.0, 0.0, 0.0, 1.0),
                Vector4::new(w, w, 0.0, w),
                Vector4::new(0.0, 1.0, 0.0, 1.0),
            ],
        )
    }

    #[test]
    fn quarter_circle_length() {
        let curve = quarter_circle();
        assert!((curve.length() - PI / 2.0).abs() < 1.0e-9);
    }

    #[test]
    fn length_at_is_monotone_and_consistent() {
        let pts: Vec<_> = (0..6)
            .map(|i| Point3::new(i as f64, ((i * i) % 3) as f64, 0.0))
            .collect();
        let curve = NurbsCurve::from_points(&pts, 3).unwrap();
        let total = curve.length();
        let mut prev = 0.0;
        for i in 1..=10 {
            let t = i as f64 / 10.0;
            let len = curve.length_at(t);
            assert!(len >= prev - 1.0e-12);
            prev = len;
        }
        assert!((curve.length_at(1.0) - total).abs() < 1.0e-9);
    }

    #[test]
    fn parameter_at_length_round_trip() {
        let curve = quarter_circle();
        let total = curve.length();
        for i in 1..10 {
            let s = total * i as f64 / 10.0;
            let t = curve.parameter_at_length(s).unwrap();
            assert!((curve.length_at(t) - s).abs() < 1.0e-9, "s = {s}");
        }
        // beyond the ends the result clamps
        assert_near!(curve.parameter_at_length(-1.0).unwrap(), 0.0);
        assert_near!(curve.parameter_at_length(total + 1.0).unwrap(), 1.0);
    }

    #[test]
    fn closest_point_on_arc() {
        let curve = quarter_circle();
        let pt = Point3::new(2.0, 2.0, 0.0);
        let closest = curve.closest_point(pt).unwrap();
        let w = f64::sqrt(0.5);
        assert_near!(closest, Point3::new(w, w, 0.0));
    }

    #[test]
    fn surface_closest_point_on_cylinder() {
        let profile = crate::Line::try_new(
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
        )
        .unwrap()
        .to_nurbs();
        let surface = NurbsSurface::revolved(
            &profile,
            Point3::new(0.0, 0.0, 0.0),
            Vector3::unit_z(),
            PI / 2.0,
        )
        .unwrap();
        let closest = surface.closest_point(Point3::new(2.0, 2.0, 0.5)).unwrap();
        let w = f64::sqrt(0.5);
        assert_near!(closest, Point3::new(w, w, 0.5));
    }
}
