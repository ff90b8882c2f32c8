use super::*;
use crate::errors::Error;
use std::f64::consts::PI;

impl Circle {
    /// Creates the circle of the given radius centered at the plane
    /// origin.
    /// # Failures
    /// Returns [`Error::OutOfDomain`] for a non-positive radius.
    pub fn try_new(plane: Plane, radius: f64) -> Result<Circle> {
        if radius <= TOLERANCE {
            return Err(Error::OutOfDomain(radius));
        }
        Ok(Circle { plane, radius })
    }

    /// Creates the circle through three points.
    /// # Failures
    /// Returns [`Error::Collinear`] when the points are collinear.
    pub fn from_three_points(a: Point3, b: Point3, c: Point3) -> Result<Circle> {
        let arc = Arc::from_three_points(a, b, c)?;
        Ok(Circle {
            plane: arc.plane(),
            radius: arc.radius(),
        })
    }

    /// Returns the supporting frame; the origin is the center.
    #[inline(always)]
    pub const fn plane(&self) -> Plane { self.plane }

    /// Returns the center.
    #[inline(always)]
    pub const fn center(&self) -> Point3 { self.plane.origin }

    /// Returns the radius.
    #[inline(always)]
    pub const fn radius(&self) -> f64 { self.radius }

    /// Returns the circumference `2 π r`.
    #[inline(always)]
    pub fn circumference(&self) -> f64 { 2.0 * PI * self.radius }

    /// Evaluates the circle at the angle `theta` from the x-axis.
    #[inline(always)]
    pub fn point_at_angle(&self, theta: f64) -> Point3 {
        self.plane
            .point_at(self.radius * theta.cos(), self.radius * theta.sin())
    }

    /// Returns the point of the circle closest to `point`: the in-plane
    /// projection is pushed radially onto the circle. A point on the axis
    /// maps to the angle-zero point.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let circle = Circle::try_new(Plane::xy(), 2.0).unwrap();
    /// let closest = circle.closest_point(Point3::new(3.0, 3.0, 5.0));
    /// let w = f64::sqrt(2.0);
    /// assert_near!(closest, Point3::new(w, w, 0.0));
    /// ```
    pub fn closest_point(&self, point: Point3) -> Point3 {
        let (u, v) = self.plane.closest_parameter(point);
        let dist = f64::sqrt(u * u + v * v);
        match dist.so_small() {
            true => self.point_at_angle(0.0),
            false => self
                .plane
                .point_at(u * self.radius / dist, v * self.radius / dist),
        }
    }

    /// Converts into an exactly equivalent rational quadratic NURBS curve
    /// of four quarter-turn Bezier pieces.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let circle = Circle::try_new(Plane::xy(), 23.0).unwrap();
    /// let curve = circle.to_nurbs();
    /// f64::assert_near(&curve.length(), &circle.circumference());
    /// ```
    pub fn to_nurbs(&self) -> NurbsCurve {
        Arc {
            plane: self.plane,
            radius: self.radius,
            angles: Interval::new(0.0, 2.0 * PI),
        }
        .to_nurbs()
    }
}

impl SpatialCurve for Circle {
    #[inline(always)]
    fn point_at(&self, t: f64) -> Point3 { self.point_at_angle(t) }
    #[inline(always)]
    fn derivative_at(&self, t: f64) -> Vector3 {
        (self.plane.y_axis * t.cos() - self.plane.x_axis * t.sin()) * self.radius
    }
    #[inline(always)]
    fn second_derivative_at(&self, t: f64) -> Vector3 {
        (self.plane.x_axis * t.cos() + self.plane.y_axis * t.sin()) * -self.radius
    }
    #[inline(always)]
    fn domain(&self) -> Interval { Interval::new(0.0, 2.0 * PI) }
}

impl Transformable for Circle {
    fn transformed(&self, transform: Matrix4) -> Self {
        Circle {
            plane: self.plane.transformed(transform),
            radius: self.radius * transform.transform_vector(Vector3::unit_x()).magnitude(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nurbs_circle_lies_on_the_circle() {
        let plane = Plane::try_new(
            Point3::new(1.0, 2.0, 3.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        )
        .unwrap();
        let circle = Circle::try_new(plane, 1.5).unwrap();
        let curve = circle.to_nurbs();
        for i in 0..=64 {
            let t = i as f64 / 64.0;
            let pt = curve.point_at(t);
            f64::assert_near(&pt.distance(circle.center()), &1.5);
            // and stays on the plane
            assert!(plane.signed_distance(pt).abs() < 1.0e-9);
        }
        assert_near!(curve.start_point(), curve.end_point());
    }

    #[test]
    fn three_point_circle() {
        let circle = Circle::from_three_points(
            Point3::new(3.0, 0.0, 1.0),
            Point3::new(0.0, 3.0, 1.0),
            Point3::new(-3.0, 0.0, 1.0),
        )
        .unwrap();
        assert_near!(circle.center(), Point3::new(0.0, 0.0, 1.0));
        f64::assert_near(&circle.radius(), &3.0);
    }
}
