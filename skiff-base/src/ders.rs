//! Recovery of rational (projected) derivatives of arbitrary order from
//! homogeneous ones, by the Leibniz rule.

use crate::cgmath64::*;
use crate::tables::binomial;

/// Returns the derivatives of the projected curve from the derivatives of
/// the homogeneous curve.
///
/// `ders[i]` is the `i`-th derivative of the homogeneous curve
/// `A(t) = (x, y, z, w)(t)`; the result holds the derivatives of
/// `A(t).truncate() / w(t)` up to the same order, by
/// `C^(k) = (A^(k) - sum_{i=1..k} C(k,i) w^(i) C^(k-i)) / w`.
/// # Examples
/// ```
/// use skiff_base::{cgmath64::*, ders::rat_ders};
/// let t = 1.5;
/// // the curve: c(t) = (t^2, t^3, t^4, t), projected: (t, t^2, t^3)
/// let ders = [
///     Vector4::new(t * t, t * t * t, t * t * t * t, t),
///     Vector4::new(2.0 * t, 3.0 * t * t, 4.0 * t * t * t, 1.0),
///     Vector4::new(2.0, 6.0 * t, 12.0 * t * t, 0.0),
///     Vector4::new(0.0, 6.0, 24.0 * t, 0.0),
/// ];
/// let rat = rat_ders(&ders);
/// assert_eq!(rat[1], Vector3::new(1.0, 2.0 * t, 3.0 * t * t));
/// assert_eq!(rat[2], Vector3::new(0.0, 2.0, 6.0 * t));
/// assert_eq!(rat[3], Vector3::new(0.0, 0.0, 6.0));
/// ```
pub fn rat_ders(ders: &[Vector4]) -> Vec<Vector3> {
    let w0 = ders[0].w;
    let mut evals: Vec<Vector3> = Vec::with_capacity(ders.len());
    for k in 0..ders.len() {
        let sum = (1..=k).fold(Vector3::zero(), |sum, i| {
            sum + evals[k - i] * (binomial(k, i) * ders[i].w)
        });
        evals.push((ders[k].truncate() - sum) / w0);
    }
    evals
}

/// Returns the mixed partial derivatives of the projected surface from the
/// homogeneous ones, by the bivariate Leibniz rule.
///
/// `ders[k][l]` is the derivative of the homogeneous surface differentiated
/// `k` times by `u` and `l` times by `v`; the result grid mirrors it for
/// the projected surface.
pub fn rat_surface_ders(ders: &[Vec<Vector4>]) -> Vec<Vec<Vector3>> {
    let w0 = ders[0][0].w;
    let rows = ders.len();
    let cols = ders[0].len();
    let mut skl = vec![vec![Vector3::zero(); cols]; rows];
    for k in 0..rows {
        for l in 0..cols {
            let mut v = ders[k][l].truncate();
            for j in 1..=l {
                v -= skl[k][l - j] * (binomial(l, j) * ders[0][j].w);
            }
            for i in 1..=k {
                v -= skl[k - i][l] * (binomial(k, i) * ders[i][0].w);
                let inner = (1..=l).fold(Vector3::zero(), |sum, j| {
                    sum + skl[k - i][l - j] * (binomial(l, j) * ders[i][j].w)
                });
                v -= inner * binomial(k, i);
            }
            skl[k][l] = v / w0;
        }
    }
    skl
}
