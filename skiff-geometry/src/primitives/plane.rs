use super::*;
use crate::errors::Error;

impl Plane {
    /// Creates a plane from an origin and two spanning directions; the
    /// frame is orthonormalized.
    /// # Failures
    /// Returns [`Error::Collinear`] when the directions are parallel or one
    /// of them vanishes.
    pub fn try_new(origin: Point3, x_dir: Vector3, y_dir: Vector3) -> Result<Plane> {
        if x_dir.magnitude2().so_small2() {
            return Err(Error::Collinear);
        }
        let x_axis = x_dir.normalize();
        let rejection = y_dir - x_axis * y_dir.dot(x_axis);
        if rejection.magnitude2().so_small2() {
            return Err(Error::Collinear);
        }
        let y_axis = rejection.normalize();
        Ok(Plane {
            origin,
            x_axis,
            y_axis,
            z_axis: x_axis.cross(y_axis),
        })
    }

    /// Creates a plane whose frame is taken as given, without the
    /// orthonormality checks. The z-axis is recomputed as `x × y`.
    #[inline(always)]
    pub fn new_unchecked(origin: Point3, x_axis: Vector3, y_axis: Vector3) -> Plane {
        Plane {
            origin,
            x_axis,
            y_axis,
            z_axis: x_axis.cross(y_axis),
        }
    }

    /// Creates the plane through three points: the origin is the first
    /// point and the x-axis points at the second.
    /// # Failures
    /// Returns [`Error::Collinear`] when the points are collinear.
    pub fn from_three_points(origin: Point3, x_point: Point3, on_plane: Point3) -> Result<Plane> {
        Plane::try_new(origin, x_point - origin, on_plane - origin)
    }

    /// the world xy-plane
    #[inline(always)]
    pub fn xy() -> Plane {
        Plane::new_unchecked(Point3::origin(), Vector3::unit_x(), Vector3::unit_y())
    }

    /// the world yz-plane
    #[inline(always)]
    pub fn yz() -> Plane {
        Plane::new_unchecked(Point3::origin(), Vector3::unit_y(), Vector3::unit_z())
    }

    /// the world zx-plane
    #[inline(always)]
    pub fn zx() -> Plane {
        Plane::new_unchecked(Point3::origin(), Vector3::unit_z(), Vector3::unit_x())
    }

    /// Returns the origin.
    #[inline(always)]
    pub const fn origin(&self) -> Point3 { self.origin }

    /// Returns the x-axis.
    #[inline(always)]
    pub const fn x_axis(&self) -> Vector3 { self.x_axis }

    /// Returns the y-axis.
    #[inline(always)]
    pub const fn y_axis(&self) -> Vector3 { self.y_axis }

    /// Returns the z-axis, the unit normal of the plane.
    #[inline(always)]
    pub const fn normal(&self) -> Vector3 { self.z_axis }

    /// Evaluates the plane at the in-plane coordinates `(u, v)`.
    #[inline(always)]
    pub fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.origin + self.x_axis * u + self.y_axis * v
    }

    /// Returns the signed distance of `point` from the plane, positive on
    /// the normal side.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let plane = Plane::xy();
    /// assert_near!(plane.signed_distance(Point3::new(5.0, -2.0, 3.0)), 3.0);
    /// assert_near!(plane.signed_distance(Point3::new(0.0, 0.0, -1.5)), -1.5);
    /// ```
    #[inline(always)]
    pub fn signed_distance(&self, point: Point3) -> f64 {
        (point - self.origin).dot(self.z_axis)
    }

    /// Returns the in-plane coordinates of the orthogonal projection of
    /// `point`.
    #[inline(always)]
    pub fn closest_parameter(&self, point: Point3) -> (f64, f64) {
        let diff = point - self.origin;
        (diff.dot(self.x_axis), diff.dot(self.y_axis))
    }

    /// Returns the orthogonal projection of `point` onto the plane.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let plane = Plane::try_new(
    ///     Point3::new(0.0, 0.0, 1.0),
    ///     Vector3::unit_x(),
    ///     Vector3::unit_y(),
    /// ).unwrap();
    /// assert_near!(plane.closest_point(Point3::new(2.0, 3.0, 7.0)), Point3::new(2.0, 3.0, 1.0));
    /// ```
    #[inline(always)]
    pub fn closest_point(&self, point: Point3) -> Point3 {
        point - self.z_axis * self.signed_distance(point)
    }

    /// Fits a plane through the points: the origin is their centroid, the
    /// normal the Newell accumulation of the consecutive cross products.
    /// # Failures
    /// * Returns [`Error::InvalidPointCount`] for fewer than three points.
    /// * Returns [`Error::Collinear`] when no stable normal exists.
    pub fn try_fit(points: &[Point3]) -> Result<Plane> {
        if points.len() < 3 {
            return Err(Error::InvalidPointCount {
                required: 3,
                found: points.len(),
            });
        }
        let centroid = points
            .iter()
            .fold(Vector3::zero(), |sum, pt| sum + pt.to_vec())
            / points.len() as f64;
        let centroid = Point3::from_vec(centroid);
        let mut normal = Vector3::zero();
        for i in 0..points.len() {
            let a = points[i] - centroid;
            let b = points[(i + 1) % points.len()] - centroid;
            normal += a.cross(b);
        }
        if normal.magnitude2().so_small2() {
            return Err(Error::Collinear);
        }
        let z_axis = normal.normalize();
        let x_axis = match (points[0] - centroid).magnitude2().so_small2() {
            true => arbitrary_perpendicular(z_axis),
            false => {
                let radial = points[0] - centroid;
                let rejection = radial - z_axis * radial.dot(z_axis);
                match rejection.magnitude2().so_small2() {
                    true => arbitrary_perpendicular(z_axis),
                    false => rejection.normalize(),
                }
            }
        };
        Ok(Plane {
            origin: centroid,
            x_axis,
            y_axis: z_axis.cross(x_axis),
            z_axis,
        })
    }

    /// Converts the unit patch `[0, 1] x [0, 1]` of the plane into a
    /// bilinear NURBS surface.
    pub fn to_nurbs(&self) -> NurbsSurface {
        NurbsSurface::from_corners(
            self.point_at(0.0, 0.0),
            self.point_at(1.0, 0.0),
            self.point_at(0.0, 1.0),
            self.point_at(1.0, 1.0),
        )
    }
}

impl Reversible for Plane {
    /// Flips the orientation, swapping the x- and y-axes.
    #[inline(always)]
    fn reversed(&self) -> Self {
        Plane {
            origin: self.origin,
            x_axis: self.y_axis,
            y_axis: self.x_axis,
            z_axis: -self.z_axis,
        }
    }
}

impl Transformable for Plane {
    fn transformed(&self, transform: Matrix4) -> Self {
        let origin = transform.transform_point(self.origin);
        let x_axis = transform.transform_vector(self.x_axis);
        let y_axis = transform.transform_vector(self.y_axis);
        Plane::try_new(origin, x_axis, y_axis)
            .unwrap_or_else(|_| Plane::new_unchecked(origin, x_axis, y_axis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_is_orthonormal() {
        let plane = Plane::from_three_points(
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(2.0, 1.0, 3.0),
            Point3::new(3.0, 4.0, -1.0),
        )
        .unwrap();
        f64::assert_near2(&plane.x_axis().magnitude(), &1.0);
        f64::assert_near2(&plane.y_axis().magnitude(), &1.0);
        f64::assert_near2(&plane.normal().magnitude(), &1.0);
        f64::assert_near2(&plane.x_axis().dot(plane.y_axis()), &0.0);
        f64::assert_near2(&plane.x_axis().dot(plane.normal()), &0.0);
    }

    #[test]
    fn collinear_points_are_rejected() {
        let result = Plane::from_three_points(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 2.0, 2.0),
        );
        assert_eq!(result, Err(Error::Collinear));
    }

    #[test]
    fn projection_round_trip() {
        let plane = Plane::from_three_points(
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(2.0, 1.0, 3.0),
            Point3::new(3.0, 4.0, -1.0),
        )
        .unwrap();
        let pt = Point3::new(2.1, -6.5, 4.7);
        let (u, v) = plane.closest_parameter(pt);
        let rev = plane.point_at(u, v) + plane.normal() * plane.signed_distance(pt);
        assert_near!(pt, rev);
    }

    #[test]
    fn unit_patch_reduction_matches_the_plane() {
        let plane = Plane::from_three_points(
            Point3::new(1.0, 0.0, 2.0),
            Point3::new(2.0, 1.0, 2.0),
            Point3::new(1.0, 1.0, 3.0),
        )
        .unwrap();
        let surface = plane.to_nurbs();
        for i in 0..=4 {
            for j in 0..=4 {
                let (u, v) = (i as f64 / 4.0, j as f64 / 4.0);
                assert_near!(surface.point_at(u, v), plane.point_at(u, v));
            }
        }
    }

    #[test]
    fn fitted_plane_contains_planar_points() {
        let plane = Plane::try_new(
            Point3::new(0.0, 1.0, 2.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        )
        .unwrap();
        let points: Vec<Point3> = (0..7)
            .map(|i| plane.point_at((i as f64).sin(), (i as f64).cos()))
            .collect();
        let fitted = Plane::try_fit(&points).unwrap();
        for pt in points {
            assert!(fitted.signed_distance(pt).abs() < 1.0e-9);
        }
    }
}
