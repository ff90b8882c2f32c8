use super::*;
use crate::errors::Error;

impl Polyline {
    /// constructor. Vertices within the general tolerance of their
    /// predecessor are culled.
    /// # Failures
    /// Returns [`Error::InvalidPointCount`] when fewer than two distinct
    /// vertices remain.
    pub fn try_new(vertices: Vec<Point3>) -> Result<Polyline> {
        let mut culled: Vec<Point3> = Vec::with_capacity(vertices.len());
        for vertex in vertices {
            match culled.last() {
                Some(last) if last.near(&vertex) => {}
                _ => culled.push(vertex),
            }
        }
        if culled.len() < 2 {
            return Err(Error::InvalidPointCount {
                required: 2,
                found: culled.len(),
            });
        }
        Ok(Polyline { vertices: culled })
    }

    /// Returns the vertices.
    #[inline(always)]
    pub fn vertices(&self) -> &[Point3] { &self.vertices }

    /// Returns the number of segments.
    #[inline(always)]
    pub fn segment_count(&self) -> usize { self.vertices.len() - 1 }

    /// Returns the total length of the segments.
    pub fn length(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .sum()
    }

    /// Returns whether the first and last vertices coincide.
    #[inline(always)]
    pub fn is_closed(&self) -> bool {
        self.vertices[0].near(self.vertices.last().unwrap())
    }

    /// Converts into a degree-1 NURBS curve; the knots are the segment
    /// indices, so `curve.point_at(k)` is the `k`-th vertex.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let polyline = Polyline::try_new(vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 1.0, 0.0),
    ///     Point3::new(2.0, 0.0, 1.0),
    /// ]).unwrap();
    /// let curve = polyline.to_nurbs();
    /// for (k, vertex) in polyline.vertices().iter().enumerate() {
    ///     assert_near!(curve.point_at(k as f64), *vertex);
    /// }
    /// ```
    pub fn to_nurbs(&self) -> NurbsCurve {
        let n = self.vertices.len();
        let mut knots = vec![0.0];
        knots.extend((0..n).map(|i| i as f64));
        knots.push((n - 1) as f64);
        let control_points = self
            .vertices
            .iter()
            .map(|pt| Vector4::from_point(*pt))
            .collect();
        NurbsCurve::debug_new(KnotVec::try_from(knots).unwrap(), control_points)
    }
}

impl Polyline {
    fn segment_at(&self, t: f64) -> (usize, f64) {
        let t = self.domain().clamp(t);
        let idx = usize::min(t.floor() as usize, self.segment_count() - 1);
        (idx, t - idx as f64)
    }
}

impl SpatialCurve for Polyline {
    fn point_at(&self, t: f64) -> Point3 {
        let (idx, local) = self.segment_at(t);
        self.vertices[idx] + (self.vertices[idx + 1] - self.vertices[idx]) * local
    }
    fn derivative_at(&self, t: f64) -> Vector3 {
        let (idx, _) = self.segment_at(t);
        self.vertices[idx + 1] - self.vertices[idx]
    }
    #[inline(always)]
    fn second_derivative_at(&self, _: f64) -> Vector3 { Vector3::zero() }
    #[inline(always)]
    fn domain(&self) -> Interval { Interval::new(0.0, self.segment_count() as f64) }
}

impl Reversible for Polyline {
    #[inline(always)]
    fn reversed(&self) -> Self {
        Polyline {
            vertices: self.vertices.iter().rev().copied().collect(),
        }
    }
}

impl Transformable for Polyline {
    #[inline(always)]
    fn transformed(&self, transform: Matrix4) -> Self {
        Polyline {
            vertices: self
                .vertices
                .iter()
                .map(|pt| transform.transform_point(*pt))
                .collect(),
        }
    }
}
