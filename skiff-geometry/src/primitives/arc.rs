use super::*;
use crate::errors::Error;
use std::f64::consts::{FRAC_PI_2, PI};

impl Arc {
    /// Creates the arc on `plane` sweeping `angle` radians from the
    /// plane's x-axis. A negative angle flips the plane orientation so that
    /// the stored sweep is always positive.
    /// # Failures
    /// Returns [`Error::OutOfDomain`] for a non-positive radius or a
    /// vanishing sweep; sweeps beyond a full turn are clamped to `2π`.
    pub fn try_new(plane: Plane, radius: f64, angle: f64) -> Result<Arc> {
        if radius <= TOLERANCE {
            return Err(Error::OutOfDomain(radius));
        }
        if angle.abs() <= TOLERANCE {
            return Err(Error::OutOfDomain(angle));
        }
        let (plane, sweep) = match angle < 0.0 {
            true => {
                let flipped =
                    Plane::new_unchecked(plane.origin, plane.x_axis, -plane.y_axis);
                (flipped, -angle)
            }
            false => (plane, angle),
        };
        Ok(Arc {
            plane,
            radius,
            angles: Interval::new(0.0, f64::min(sweep, 2.0 * PI)),
        })
    }

    /// Creates the arc through three points, starting at `start`, passing
    /// through `interior`, and ending at `end`.
    /// # Failures
    /// Returns [`Error::Collinear`] when the points are collinear.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let arc = Arc::from_three_points(
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    ///     Point3::new(-1.0, 0.0, 0.0),
    /// ).unwrap();
    /// assert_near!(arc.center(), Point3::new(0.0, 0.0, 0.0));
    /// f64::assert_near(&arc.radius(), &1.0);
    /// f64::assert_near(&arc.sweep(), &std::f64::consts::PI);
    /// ```
    pub fn from_three_points(start: Point3, interior: Point3, end: Point3) -> Result<Arc> {
        let support = Plane::from_three_points(start, interior, end)?;
        let (bx, by) = support.closest_parameter(interior);
        let (cx, cy) = support.closest_parameter(end);
        let det = 2.0 * (bx * cy - cx * by);
        if det.so_small() {
            return Err(Error::Collinear);
        }
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (b2 * cy - c2 * by) / det;
        let uy = (c2 * bx - b2 * cx) / det;
        let center = support.point_at(ux, uy);
        let radius = (start - center).magnitude();

        let x_axis = (start - center) / radius;
        let mut y_axis = support.normal().cross(x_axis);
        let angle_of = |pt: Point3, y_axis: Vector3| {
            let diff = pt - center;
            let theta = f64::atan2(diff.dot(y_axis), diff.dot(x_axis));
            match theta < 0.0 {
                true => theta + 2.0 * PI,
                false => theta,
            }
        };
        let mut theta_b = angle_of(interior, y_axis);
        let mut theta_c = angle_of(end, y_axis);
        if theta_b > theta_c {
            // the interior point lies on the other branch; sweep the other way
            y_axis = -y_axis;
            theta_b = 2.0 * PI - theta_b;
            theta_c = 2.0 * PI - theta_c;
        }
        debug_assert!(theta_b <= theta_c);
        Ok(Arc {
            plane: Plane::new_unchecked(center, x_axis, y_axis),
            radius,
            angles: Interval::new(0.0, theta_c),
        })
    }

    /// Creates the arc from its start point, end point, and unit-invariant
    /// start tangent direction.
    /// # Failures
    /// Returns [`Error::Collinear`] when the tangent is parallel to the
    /// chord or degenerate.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// // a quarter of the unit circle
    /// let arc = Arc::from_start_end_tangent(
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    ///     Vector3::unit_y(),
    /// ).unwrap();
    /// assert_near!(arc.center(), Point3::new(0.0, 0.0, 0.0));
    /// f64::assert_near(&arc.sweep(), &std::f64::consts::FRAC_PI_2);
    /// ```
    pub fn from_start_end_tangent(
        start: Point3,
        end: Point3,
        tangent: Vector3,
    ) -> Result<Arc> {
        if tangent.magnitude2().so_small2() {
            return Err(Error::Collinear);
        }
        let tangent = tangent.normalize();
        let chord = end - start;
        let normal = tangent.cross(chord);
        if normal.magnitude2().so_small2() {
            return Err(Error::Collinear);
        }
        let normal = normal.normalize();
        let inward = normal.cross(tangent);
        let s = chord.magnitude2() / (2.0 * chord.dot(inward));
        let center = start + inward * s;
        let radius = s.abs();

        let x_axis = (start - center) / radius;
        let y_axis = tangent;
        let diff = end - center;
        let theta = f64::atan2(diff.dot(y_axis), diff.dot(x_axis));
        let sweep = match theta <= 0.0 {
            true => theta + 2.0 * PI,
            false => theta,
        };
        Ok(Arc {
            plane: Plane::new_unchecked(center, x_axis, y_axis),
            radius,
            angles: Interval::new(0.0, sweep),
        })
    }

    /// Returns the supporting frame; the origin is the arc center.
    #[inline(always)]
    pub const fn plane(&self) -> Plane { self.plane }

    /// Returns the center of the arc.
    #[inline(always)]
    pub const fn center(&self) -> Point3 { self.plane.origin }

    /// Returns the radius.
    #[inline(always)]
    pub const fn radius(&self) -> f64 { self.radius }

    /// Returns the angle interval measured from the frame's x-axis.
    #[inline(always)]
    pub const fn angles(&self) -> Interval { self.angles }

    /// Returns the swept angle in radians.
    #[inline(always)]
    pub fn sweep(&self) -> f64 { self.angles.length() }

    /// Returns the arc length `radius * sweep`.
    #[inline(always)]
    pub fn length(&self) -> f64 { self.radius * self.sweep() }

    /// Evaluates the supporting circle at the angle `theta`.
    #[inline(always)]
    pub fn point_at_angle(&self, theta: f64) -> Point3 {
        self.plane
            .point_at(self.radius * theta.cos(), self.radius * theta.sin())
    }

    /// Returns the unit tangent of the supporting circle at the angle
    /// `theta`.
    #[inline(always)]
    pub fn tangent_at_angle(&self, theta: f64) -> Vector3 {
        self.plane.y_axis * theta.cos() - self.plane.x_axis * theta.sin()
    }

    /// Converts into an exactly equivalent rational quadratic NURBS curve.
    ///
    /// The sweep is split into at most four Bezier pieces of a quarter turn
    /// or less; each piece carries its endpoint points with weight one and
    /// the tangent-intersection point with weight `cos(dθ / 2)`; the pieces
    /// share interior knots of multiplicity two.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let arc = Arc::from_three_points(
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    ///     Point3::new(-1.0, 0.0, 0.0),
    /// ).unwrap();
    /// let curve = arc.to_nurbs();
    /// const N: usize = 100;
    /// for i in 0..=N {
    ///     let t = i as f64 / N as f64;
    ///     let pt = curve.point_at(t);
    ///     f64::assert_near2(&pt.to_vec().magnitude(), &1.0);
    /// }
    /// ```
    pub fn to_nurbs(&self) -> NurbsCurve {
        let (t0, t1) = (self.angles.t0, self.angles.t1);
        let sweep = t1 - t0;
        let narcs = usize::min(
            4,
            usize::max(1, (sweep / FRAC_PI_2).ceil() as usize),
        );
        let dtheta = sweep / narcs as f64;
        let w1 = (dtheta / 2.0).cos();

        let mut cps = Vec::with_capacity(2 * narcs + 1);
        let mut knots = vec![0.0; 3];
        let mut prev_pt = self.point_at_angle(t0);
        let mut prev_tan = self.tangent_at_angle(t0);
        cps.push(Vector4::from_point(prev_pt));
        for i in 1..=narcs {
            let theta = t0 + dtheta * i as f64;
            let pt = self.point_at_angle(theta);
            let tan = self.tangent_at_angle(theta);
            let mid = tangent_intersection(prev_pt, prev_tan, pt, tan);
            cps.push(Vector4::from_point_weight(mid, w1));
            cps.push(Vector4::from_point(pt));
            if i < narcs {
                let x = i as f64 / narcs as f64;
                knots.push(x);
                knots.push(x);
            }
            prev_pt = pt;
            prev_tan = tan;
        }
        knots.extend(std::iter::repeat(1.0).take(3));
        NurbsCurve::debug_new(KnotVec::try_from(knots).unwrap(), cps)
    }
}

impl SpatialCurve for Arc {
    #[inline(always)]
    fn point_at(&self, t: f64) -> Point3 { self.point_at_angle(self.angles.clamp(t)) }
    #[inline(always)]
    fn derivative_at(&self, t: f64) -> Vector3 {
        self.tangent_at_angle(self.angles.clamp(t)) * self.radius
    }
    #[inline(always)]
    fn second_derivative_at(&self, t: f64) -> Vector3 {
        let theta = self.angles.clamp(t);
        (self.plane.x_axis * theta.cos() + self.plane.y_axis * theta.sin()) * -self.radius
    }
    #[inline(always)]
    fn domain(&self) -> Interval { self.angles }
}

impl Transformable for Arc {
    fn transformed(&self, transform: Matrix4) -> Self {
        Arc {
            plane: self.plane.transformed(transform),
            radius: self.radius * transform.transform_vector(Vector3::unit_x()).magnitude(),
            angles: self.angles,
        }
    }
}
