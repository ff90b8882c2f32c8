use super::*;
use crate::errors::Error;

impl Line {
    /// constructor.
    /// # Failures
    /// Returns [`Error::InvalidPointCount`] when the endpoints coincide.
    pub fn try_new(start: Point3, end: Point3) -> Result<Line> {
        if start.near(&end) {
            return Err(Error::InvalidPointCount {
                required: 2,
                found: 1,
            });
        }
        Ok(Line { start, end })
    }

    /// Creates the line from an origin and a direction vector.
    pub fn from_origin_direction(origin: Point3, direction: Vector3) -> Result<Line> {
        Line::try_new(origin, origin + direction)
    }

    /// Returns the start point.
    #[inline(always)]
    pub const fn start(&self) -> Point3 { self.start }

    /// Returns the end point.
    #[inline(always)]
    pub const fn end(&self) -> Point3 { self.end }

    /// Returns the non-unitized direction `end - start`.
    #[inline(always)]
    pub fn direction(&self) -> Vector3 { self.end - self.start }

    /// Returns the length of the segment.
    #[inline(always)]
    pub fn length(&self) -> f64 { self.direction().magnitude() }

    /// Returns the parameter of the point of the segment closest to
    /// `point`, clamped to `[0, 1]`.
    #[inline(always)]
    pub fn closest_parameter(&self, point: Point3) -> f64 {
        let dir = self.direction();
        let t = (point - self.start).dot(dir) / dir.magnitude2();
        Interval::UNIT.clamp(t)
    }

    /// Returns the point of the segment closest to `point`.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let line = Line::try_new(Point3::new(0.0, 0.0, 0.0), Point3::new(30.0, 45.0, 0.0)).unwrap();
    /// let closest = line.closest_point(Point3::new(10.0, 20.0, 0.0));
    /// assert_near!(closest, Point3::new(12.307692307692308, 18.461538461538463, 0.0));
    /// ```
    #[inline(always)]
    pub fn closest_point(&self, point: Point3) -> Point3 {
        self.point_at(self.closest_parameter(point))
    }

    /// Converts into a degree-1 NURBS curve.
    #[inline(always)]
    pub fn to_nurbs(&self) -> NurbsCurve {
        NurbsCurve::debug_new(
            KnotVec::bezier_knot(1),
            vec![
                Vector4::from_point(self.start),
                Vector4::from_point(self.end),
            ],
        )
    }
}

impl SpatialCurve for Line {
    #[inline(always)]
    fn point_at(&self, t: f64) -> Point3 { self.start + self.direction() * t }
    #[inline(always)]
    fn derivative_at(&self, _: f64) -> Vector3 { self.direction() }
    #[inline(always)]
    fn second_derivative_at(&self, _: f64) -> Vector3 { Vector3::zero() }
    #[inline(always)]
    fn domain(&self) -> Interval { Interval::UNIT }
}

impl Reversible for Line {
    #[inline(always)]
    fn reversed(&self) -> Self {
        Line {
            start: self.end,
            end: self.start,
        }
    }
}

impl Transformable for Line {
    #[inline(always)]
    fn transformed(&self, transform: Matrix4) -> Self {
        Line {
            start: transform.transform_point(self.start),
            end: transform.transform_point(self.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_line_is_rejected() {
        let pt = Point3::new(1.0, 2.0, 3.0);
        assert!(Line::try_new(pt, pt).is_err());
    }

    #[test]
    fn nurbs_reduction_matches() {
        let line = Line::try_new(Point3::new(1.0, 0.0, -1.0), Point3::new(3.0, 4.0, 1.0)).unwrap();
        let curve = line.to_nurbs();
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert_near!(curve.point_at(t), line.point_at(t));
        }
        f64::assert_near2(&curve.length(), &line.length());
    }
}
