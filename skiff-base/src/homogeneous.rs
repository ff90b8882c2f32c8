use cgmath::prelude::*;

/// redefinition, scalar = f64
type Vector3 = cgmath::Vector3<f64>;
/// redefinition, scalar = f64
type Vector4 = cgmath::Vector4<f64>;
/// redefinition, scalar = f64
type Point3 = cgmath::Point3<f64>;

/// Homogeneous coordinates of 3-dimensional Euclidean space.
///
/// Control points are stored pre-multiplied: a point `p` with weight `w` is
/// the vector `(w p_x, w p_y, w p_z, w)`. All internal spline arithmetic is
/// linear in this space; division by the weight happens only at evaluation
/// boundaries.
/// # Examples
/// ```
/// use skiff_base::cgmath64::*;
/// assert_eq!(Vector4::new(8.0, 6.0, 4.0, 2.0).truncate(), Vector3::new(8.0, 6.0, 4.0));
/// assert_eq!(Vector4::new(8.0, 6.0, 4.0, 2.0).weight(), 2.0);
/// assert_eq!(Vector4::new(8.0, 6.0, 4.0, 2.0).to_point(), Point3::new(4.0, 3.0, 2.0));
/// assert_eq!(Vector4::from_point(Point3::new(4.0, 3.0, 2.0)), Vector4::new(4.0, 3.0, 2.0, 1.0));
/// assert_eq!(
///     Vector4::from_point_weight(Point3::new(4.0, 3.0, 2.0), 2.0),
///     Vector4::new(8.0, 6.0, 4.0, 2.0),
/// );
/// ```
pub trait Homogeneous: Copy {
    /// Returns the first three components.
    fn truncate(self) -> Vector3;
    /// Returns the last component.
    fn weight(self) -> f64;
    /// Returns the homogeneous coordinate of a point with weight `1.0`.
    fn from_point(point: Point3) -> Self;
    /// Returns the pre-multiplied homogeneous coordinate `(w p, w)`.
    fn from_point_weight(point: Point3, weight: f64) -> Self;
    /// Returns the projection to the hyperplane whose last component is `1.0`.
    fn to_point(self) -> Point3;
    /// Returns the derivative of the projected curve.
    ///
    /// For a curve `c(t) = (c_0, c_1, c_2, c_3)(t)`, returns the derivative
    /// of `(c_0 / c_3, c_1 / c_3, c_2 / c_3)`.
    /// # Examples
    /// ```
    /// use skiff_base::cgmath64::*;
    /// let t = 1.5;
    /// // the curve: c(t) = (t^2, t^3, t^4, t)
    /// let pt = Vector4::new(t * t, t * t * t, t * t * t * t, t);
    /// let der = Vector4::new(2.0 * t, 3.0 * t * t, 4.0 * t * t * t, 1.0);
    /// // the projected curve: (t, t^2, t^3), derivative: (1, 2t, 3t^2)
    /// assert_eq!(pt.rat_der(der), Vector3::new(1.0, 2.0 * t, 3.0 * t * t));
    /// ```
    fn rat_der(self, der: Self) -> Vector3;
    /// Returns the 2nd-order derivative of the projected curve.
    fn rat_der2(self, der: Self, der2: Self) -> Vector3;
    /// Returns the mixed `uv`-derivative of the projected surface.
    fn rat_cross_der(self, uder: Self, vder: Self, uvder: Self) -> Vector3;
}

impl Homogeneous for Vector4 {
    #[inline(always)]
    fn truncate(self) -> Vector3 { Vector4::truncate(self) }
    #[inline(always)]
    fn weight(self) -> f64 { self.w }
    #[inline(always)]
    fn from_point(point: Point3) -> Self { point.to_homogeneous() }
    #[inline(always)]
    fn from_point_weight(point: Point3, weight: f64) -> Self {
        Vector4::new(point.x * weight, point.y * weight, point.z * weight, weight)
    }
    #[inline(always)]
    fn to_point(self) -> Point3 { Point3::from_vec(Vector4::truncate(self) / self.w) }
    #[inline(always)]
    fn rat_der(self, der: Self) -> Vector3 {
        let res = (der * self.w - self * der.w) / (self.w * self.w);
        Vector4::truncate(res)
    }
    #[inline(always)]
    fn rat_der2(self, der: Self, der2: Self) -> Vector3 {
        let pre_coef1 = der.w / (self.w * self.w);
        let coef1 = pre_coef1 + pre_coef1;
        let der_w2 = der.w * der.w;
        let coef2 = (der_w2 + der_w2 - der2.w * self.w) / (self.w * self.w * self.w);
        let res = der2 / self.w - der * coef1 + self * coef2;
        Vector4::truncate(res)
    }
    #[inline(always)]
    fn rat_cross_der(self, uder: Self, vder: Self, uvder: Self) -> Vector3 {
        let w2 = self.w * self.w;
        let coef1 = vder.w / w2;
        let coef2 = uder.w / w2;
        let der_w2 = uder.w * vder.w;
        let coef3 = (der_w2 + der_w2 - uvder.w * self.w) / (w2 * self.w);
        let res = uvder / self.w - uder * coef1 - vder * coef2 + self * coef3;
        Vector4::truncate(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_near2;

    #[test]
    fn rat_der2_against_polynomial() {
        let t = 1.5;
        // c(t) = (t^2, t^3, t^4, t), projected: (t, t^2, t^3)
        let pt = Vector4::new(t * t, t * t * t, t * t * t * t, t);
        let der = Vector4::new(2.0 * t, 3.0 * t * t, 4.0 * t * t * t, 1.0);
        let der2 = Vector4::new(2.0, 6.0 * t, 12.0 * t * t, 0.0);
        assert_near2!(pt.rat_der2(der, der2), Vector3::new(0.0, 2.0, 6.0 * t));
    }

    #[test]
    fn rat_cross_der_against_polynomial() {
        let (u, v) = (1.0, 2.0);
        // s(u, v) = (u^3 v^2, u^2 v^3, u v, u), projected: (u^2 v^2, u v^3, v)
        let pt = Vector4::new(u * u * u * v * v, u * u * v * v * v, u * v, u);
        let uder = Vector4::new(3.0 * u * u * v * v, 2.0 * u * v * v * v, v, 1.0);
        let vder = Vector4::new(2.0 * u * u * u * v, 3.0 * u * u * v * v, u, 0.0);
        let uvder = Vector4::new(6.0 * u * u * v, 6.0 * u * v * v, 1.0, 0.0);
        assert_near2!(
            pt.rat_cross_der(uder, vder, uvder),
            Vector3::new(4.0 * u * v, 3.0 * v * v, 0.0),
        );
    }
}
