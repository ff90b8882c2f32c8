use super::*;
use crate::errors::Error;

impl Polygon {
    /// constructor. Consecutive duplicate vertices are culled and the
    /// vertex list is closed (first = last) if it is not already.
    /// # Failures
    /// * Returns [`Error::InvalidPointCount`] when fewer than three
    ///   distinct vertices remain.
    /// * Returns [`Error::NonPlanar`] when the vertices deviate from their
    ///   fitted plane by more than the coarse tolerance.
    /// # Examples
    /// ```
    /// use skiff_geometry::{errors::Error, *};
    /// let skewed = Polygon::try_new(vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(1.0, 1.0, 0.5),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// ]);
    /// assert_eq!(skewed, Err(Error::NonPlanar));
    /// ```
    pub fn try_new(vertices: Vec<Point3>) -> Result<Polygon> {
        let mut culled: Vec<Point3> = Vec::with_capacity(vertices.len() + 1);
        for vertex in vertices {
            match culled.last() {
                Some(last) if last.near(&vertex) => {}
                _ => culled.push(vertex),
            }
        }
        if culled.len() > 1 && culled[0].near(culled.last().unwrap()) {
            culled.pop();
        }
        if culled.len() < 3 {
            return Err(Error::InvalidPointCount {
                required: 3,
                found: culled.len(),
            });
        }
        let plane = Plane::try_fit(&culled)?;
        let deviation = culled
            .iter()
            .map(|pt| plane.signed_distance(*pt).abs())
            .fold(0.0, f64::max);
        if deviation > COARSE_TOLERANCE {
            return Err(Error::NonPlanar);
        }
        let first = culled[0];
        culled.push(first);
        Ok(Polygon {
            vertices: culled,
            plane,
        })
    }

    /// Returns the closed vertex list (first = last).
    #[inline(always)]
    pub fn vertices(&self) -> &[Point3] { &self.vertices }

    /// Returns the fitted supporting plane; the origin is the vertex
    /// centroid.
    #[inline(always)]
    pub const fn plane(&self) -> Plane { self.plane }

    /// Returns the perimeter.
    pub fn perimeter(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .sum()
    }

    /// Converts into a closed degree-1 NURBS curve over the closed vertex
    /// list.
    pub fn to_nurbs(&self) -> NurbsCurve {
        Polyline {
            vertices: self.vertices.clone(),
        }
        .to_nurbs()
    }
}

impl Polygon {
    fn segment_at(&self, t: f64) -> (usize, f64) {
        let segments = self.vertices.len() - 1;
        let t = Interval::new(0.0, segments as f64).clamp(t);
        let idx = usize::min(t.floor() as usize, segments - 1);
        (idx, t - idx as f64)
    }
}

impl SpatialCurve for Polygon {
    #[inline(always)]
    fn point_at(&self, t: f64) -> Point3 {
        let (idx, local) = self.segment_at(t);
        self.vertices[idx] + (self.vertices[idx + 1] - self.vertices[idx]) * local
    }
    #[inline(always)]
    fn derivative_at(&self, t: f64) -> Vector3 {
        let (idx, _) = self.segment_at(t);
        self.vertices[idx + 1] - self.vertices[idx]
    }
    #[inline(always)]
    fn second_derivative_at(&self, _: f64) -> Vector3 { Vector3::zero() }
    #[inline(always)]
    fn domain(&self) -> Interval { Interval::new(0.0, (self.vertices.len() - 1) as f64) }
}

impl Transformable for Polygon {
    fn transformed(&self, transform: Matrix4) -> Self {
        Polygon {
            vertices: self
                .vertices
                .iter()
                .map(|pt| transform.transform_point(*pt))
                .collect(),
            plane: self.plane.transformed(transform),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_polygon() {
        let polygon = Polygon::try_new(vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(2.0, 0.0, 1.0),
            Point3::new(2.0, 2.0, 1.0),
            Point3::new(0.0, 2.0, 1.0),
        ])
        .unwrap();
        assert_eq!(polygon.vertices().len(), 5);
        assert_near!(polygon.vertices()[0], polygon.vertices()[4]);
        f64::assert_near2(&polygon.perimeter(), &8.0);
        let curve = polygon.to_nurbs();
        assert_near!(curve.start_point(), curve.end_point());
        f64::assert_near2(&curve.length(), &8.0);
    }

    #[test]
    fn closed_input_is_accepted() {
        let polygon = Polygon::try_new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(polygon.vertices().len(), 4);
    }

    #[test]
    fn too_few_vertices() {
        assert_eq!(
            Polygon::try_new(vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
            ]),
            Err(Error::InvalidPointCount { required: 3, found: 2 }),
        );
    }
}
