//! Curve fitting: global interpolation, interpolation with end tangents,
//! piecewise-cubic Bezier interpolation, and least-squares approximation.

use crate::errors::Error;
use crate::*;

/// Chord-length parameters of the sample points, normalized to `[0, 1]`.
fn chord_length_params(points: &[Point3]) -> Result<Vec<f64>> {
    let mut params = Vec::with_capacity(points.len());
    params.push(0.0);
    let mut acc = 0.0;
    for window in points.windows(2) {
        acc += window[0].distance(window[1]);
        params.push(acc);
    }
    if acc.so_small() {
        return Err(Error::InvalidPointCount {
            required: 2,
            found: 1,
        });
    }
    params.iter_mut().for_each(|u| *u /= acc);
    let last = params.len() - 1;
    params[last] = 1.0;
    Ok(params)
}

/// Gaussian elimination with partial pivoting over a vector-valued right
/// hand side; `None` for a numerically singular system.
fn solve_dense<V: VectorSpace<Scalar = f64>>(
    mut mat: Vec<Vec<f64>>,
    mut rhs: Vec<V>,
) -> Option<Vec<V>> {
    let n = mat.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|a, b| mat[*a][col].abs().partial_cmp(&mat[*b][col].abs()).unwrap())?;
        if mat[pivot][col].abs() < 1.0e-13 {
            return None;
        }
        mat.swap(col, pivot);
        rhs.swap(col, pivot);
        let pivot_row = mat[col].clone();
        let pivot_rhs = rhs[col];
        for row in (col + 1)..n {
            let factor = mat[row][col] / pivot_row[col];
            if factor == 0.0 {
                continue;
            }
            for j in col..n {
                mat[row][j] -= factor * pivot_row[j];
            }
            rhs[row] = rhs[row] - pivot_rhs * factor;
        }
    }
    let mut res = vec![V::zero(); n];
    for row in (0..n).rev() {
        let mut acc = rhs[row];
        for j in (row + 1)..n {
            acc = acc - res[j] * mat[row][j];
        }
        res[row] = acc * (1.0 / mat[row][row]);
    }
    Some(res)
}

/// Solves the square collocation system `N · P = data` for the control
/// values interpolating `data` at `params` on the given knot vector.
pub(crate) fn interpolate_values<V: VectorSpace<Scalar = f64>>(
    data: &[V],
    params: &[f64],
    knot_vec: &KnotVec,
    degree: usize,
) -> Result<Vec<V>> {
    let n = data.len();
    let mut mat = vec![vec![0.0; n]; n];
    for (k, u) in params.iter().enumerate() {
        let span = knot_vec.span(degree, *u);
        let basis = knot_vec.basis_functions(degree, span, *u);
        for (j, b) in basis.iter().enumerate() {
            mat[k][span - degree + j] = *b;
        }
    }
    solve_dense(mat, data.to_vec()).ok_or(Error::UnconvergedIteration)
}

/// Interpolates the points globally with a curve of the given degree:
/// chord-length parameters, an averaged knot vector, and a banded
/// collocation solve.
/// # Failures
/// * Returns [`Error::InvalidDegree`] for degree zero.
/// * Returns [`Error::InvalidPointCount`] for fewer than `degree + 1`
///   points or all-coincident points.
/// # Examples
/// ```
/// use skiff_geometry::*;
/// let points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 2.0, 0.0),
///     Point3::new(3.0, 1.0, 1.0),
///     Point3::new(4.0, 4.0, 0.0),
///     Point3::new(6.0, 0.0, 0.0),
/// ];
/// let curve = fitting::interpolate(&points, 3).unwrap();
/// for pt in &points {
///     let closest = curve.closest_point(*pt).unwrap();
///     assert!(closest.distance(*pt) < 1.0e-9);
/// }
/// ```
pub fn interpolate(points: &[Point3], degree: usize) -> Result<NurbsCurve> {
    if degree < 1 {
        return Err(Error::InvalidDegree {
            degree,
            num_ctrl: points.len(),
        });
    }
    if points.len() < degree + 1 {
        return Err(Error::InvalidPointCount {
            required: degree + 1,
            found: points.len(),
        });
    }
    let params = chord_length_params(points)?;
    let knot_vec = KnotVec::averaged_knot(&params, degree);
    let data: Vec<Vector3> = points.iter().map(|p| p.to_vec()).collect();
    let ctrl = interpolate_values(&data, &params, &knot_vec, degree)?;
    let control_points = ctrl
        .into_iter()
        .map(|v| Vector4::new(v.x, v.y, v.z, 1.0))
        .collect();
    Ok(NurbsCurve::debug_new(knot_vec, control_points))
}

/// Interpolates the points with a cubic curve whose end derivatives are the
/// prescribed tangents; two extra control points adjacent to the endpoints
/// encode the constraints.
/// # Examples
/// ```
/// use skiff_geometry::*;
/// let points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(2.0, 0.0, 0.0),
/// ];
/// let tangent = Vector3::new(0.0, 4.0, 0.0);
/// let curve = fitting::interpolate_with_tangents(&points, tangent, tangent).unwrap();
/// assert_near!(curve.start_point(), points[0]);
/// assert_near!(curve.end_point(), points[2]);
/// assert_near!(curve.derivative_at(0.0), tangent);
/// assert_near!(curve.derivative_at(1.0), tangent);
/// ```
pub fn interpolate_with_tangents(
    points: &[Point3],
    start_tangent: Vector3,
    end_tangent: Vector3,
) -> Result<NurbsCurve> {
    const DEGREE: usize = 3;
    if points.len() < 2 {
        return Err(Error::InvalidPointCount {
            required: 2,
            found: points.len(),
        });
    }
    let params = chord_length_params(points)?;
    let n = points.len() - 1;

    let mut knots = vec![0.0; DEGREE + 1];
    for j in 1..n {
        knots.push((params[j - 1] + params[j] + params[j + 1]) / 3.0);
    }
    knots.extend(std::iter::repeat(1.0).take(DEGREE + 1));
    let knot_vec = KnotVec::try_from(knots).unwrap();

    let size = n + 3;
    let mut mat = vec![vec![0.0; size]; size];
    let mut rhs = vec![Vector3::zero(); size];

    mat[0][0] = 1.0;
    rhs[0] = points[0].to_vec();

    let a0 = DEGREE as f64 / knot_vec[DEGREE + 1];
    mat[1][0] = -a0;
    mat[1][1] = a0;
    rhs[1] = start_tangent;

    for k in 1..n {
        let u = params[k];
        let span = knot_vec.span(DEGREE, u);
        let basis = knot_vec.basis_functions(DEGREE, span, u);
        for (j, b) in basis.iter().enumerate() {
            mat[k + 1][span - DEGREE + j] = *b;
        }
        rhs[k + 1] = points[k].to_vec();
    }

    let an = DEGREE as f64 / (1.0 - knot_vec[size - 1]);
    mat[size - 2][size - 2] = -an;
    mat[size - 2][size - 1] = an;
    rhs[size - 2] = end_tangent;

    mat[size - 1][size - 1] = 1.0;
    rhs[size - 1] = points[n].to_vec();

    let ctrl = solve_dense(mat, rhs).ok_or(Error::UnconvergedIteration)?;
    let control_points = ctrl
        .into_iter()
        .map(|v| Vector4::new(v.x, v.y, v.z, 1.0))
        .collect();
    Ok(NurbsCurve::debug_new(knot_vec, control_points))
}

/// Interpolates the points with C1 piecewise-cubic Bezier segments whose
/// interior handles are tied to central-difference tangent estimates.
/// # Examples
/// ```
/// use skiff_geometry::*;
/// let points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 2.0, 0.0),
///     Point3::new(3.0, 2.0, 1.0),
///     Point3::new(4.0, 0.0, 0.0),
/// ];
/// let curve = fitting::bezier_interpolation(&points).unwrap();
/// for (k, pt) in points.iter().enumerate() {
///     assert_near!(curve.point_at(k as f64), *pt);
/// }
/// ```
pub fn bezier_interpolation(points: &[Point3]) -> Result<NurbsCurve> {
    if points.len() < 2 {
        return Err(Error::InvalidPointCount {
            required: 2,
            found: points.len(),
        });
    }
    let n = points.len();
    let mut tangents = Vec::with_capacity(n);
    tangents.push(points[1] - points[0]);
    for i in 1..n - 1 {
        tangents.push((points[i + 1] - points[i - 1]) / 2.0);
    }
    tangents.push(points[n - 1] - points[n - 2]);

    let mut control_points = vec![Vector4::from_point(points[0])];
    for i in 0..n - 1 {
        control_points.push(Vector4::from_point(points[i] + tangents[i] / 3.0));
        control_points.push(Vector4::from_point(points[i + 1] - tangents[i + 1] / 3.0));
        control_points.push(Vector4::from_point(points[i + 1]));
    }

    let mut knots = vec![0.0; 4];
    for k in 1..n - 1 {
        knots.extend(std::iter::repeat(k as f64).take(3));
    }
    knots.extend(std::iter::repeat((n - 1) as f64).take(4));
    Ok(NurbsCurve::debug_new(
        KnotVec::try_from(knots).unwrap(),
        control_points,
    ))
}

/// Approximates the points in the least-squares sense with `n_ctrl`
/// control points of the given degree; the endpoints are pinned.
/// # Failures
/// * Returns [`Error::InvalidDegree`] when the degree does not fit the
///   control points.
/// * Returns [`Error::InvalidPointCount`] when no redundancy is left
///   (`points <= n_ctrl`).
/// # Examples
/// ```
/// use skiff_geometry::*;
/// // points on a straight line are reproduced exactly
/// let points: Vec<Point3> = (0..10)
///     .map(|i| Point3::new(i as f64, 2.0 * i as f64, 0.0))
///     .collect();
/// let curve = fitting::approximate(&points, 3, 5).unwrap();
/// assert_near!(curve.start_point(), points[0]);
/// assert_near!(curve.end_point(), points[9]);
/// for pt in &points {
///     let closest = curve.closest_point(*pt).unwrap();
///     assert!(closest.distance(*pt) < 1.0e-6);
/// }
/// ```
pub fn approximate(points: &[Point3], degree: usize, n_ctrl: usize) -> Result<NurbsCurve> {
    if degree < 1 || n_ctrl < degree + 1 {
        return Err(Error::InvalidDegree {
            degree,
            num_ctrl: n_ctrl,
        });
    }
    if points.len() <= n_ctrl {
        return Err(Error::InvalidPointCount {
            required: n_ctrl + 1,
            found: points.len(),
        });
    }
    let m = points.len() - 1;
    let n = n_ctrl - 1;
    let params = chord_length_params(points)?;

    let mut knots = vec![0.0; degree + 1];
    let d = (m + 1) as f64 / (n - degree + 1) as f64;
    for j in 1..=(n - degree) {
        let pos = j as f64 * d;
        let i = pos.floor() as usize;
        let alpha = pos - i as f64;
        knots.push((1.0 - alpha) * params[i - 1] + alpha * params[i]);
    }
    knots.extend(std::iter::repeat(1.0).take(degree + 1));
    let knot_vec = KnotVec::try_from(knots).unwrap();

    // rows of the collocation matrix at the interior parameters
    let mut rows = vec![vec![0.0; n + 1]; m + 1];
    for k in 0..=m {
        let span = knot_vec.span(degree, params[k]);
        let basis = knot_vec.basis_functions(degree, span, params[k]);
        for (j, b) in basis.iter().enumerate() {
            rows[k][span - degree + j] = *b;
        }
    }

    let q0 = points[0].to_vec();
    let qm = points[m].to_vec();
    let residual: Vec<Vector3> = (1..m)
        .map(|k| points[k].to_vec() - q0 * rows[k][0] - qm * rows[k][n])
        .collect();

    let mut normal = vec![vec![0.0; n - 1]; n - 1];
    let mut rhs = vec![Vector3::zero(); n - 1];
    for (k, res) in residual.iter().enumerate() {
        let row = &rows[k + 1];
        for j in 1..n {
            if row[j] == 0.0 {
                continue;
            }
            rhs[j - 1] += *res * row[j];
            for l in 1..n {
                normal[j - 1][l - 1] += row[j] * row[l];
            }
        }
    }
    let interior = solve_dense(normal, rhs).ok_or(Error::UnconvergedIteration)?;

    let mut control_points = Vec::with_capacity(n + 1);
    control_points.push(Vector4::from_point(points[0]));
    control_points.extend(
        interior
            .into_iter()
            .map(|v| Vector4::new(v.x, v.y, v.z, 1.0)),
    );
    control_points.push(Vector4::from_point(points[m]));
    Ok(NurbsCurve::debug_new(knot_vec, control_points))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolation_hits_the_samples_at_their_parameters() {
        let points = vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(3.0, 4.0, 1.0),
            Point3::new(-1.0, 4.0, 2.0),
            Point3::new(-4.0, 0.0, 2.0),
            Point3::new(-4.0, -3.0, 3.0),
        ];
        for degree in [1, 2, 3] {
            let curve = interpolate(&points, degree).unwrap();
            assert_near!(curve.start_point(), points[0]);
            assert_near!(curve.end_point(), points[4]);
            for pt in &points {
                let closest = curve.closest_point(*pt).unwrap();
                assert!(closest.distance(*pt) < 1.0e-6, "degree {degree}");
            }
        }
    }

    #[test]
    fn interpolation_rejects_degenerate_input() {
        let pt = Point3::new(1.0, 1.0, 1.0);
        assert!(interpolate(&[pt, pt, pt, pt], 3).is_err());
        assert!(interpolate(&[pt], 3).is_err());
    }

    #[test]
    fn tangent_interpolation_is_degree_three() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, -1.0, 0.0),
        ];
        let curve = fitting_with_unit_tangents(&points);
        assert_eq!(curve.degree(), 3);
        assert_eq!(curve.control_points().len(), points.len() + 2);
        for pt in &points {
            let closest = curve.closest_point(*pt).unwrap();
            assert!(closest.distance(*pt) < 1.0e-6);
        }
    }

    fn fitting_with_unit_tangents(points: &[Point3]) -> NurbsCurve {
        interpolate_with_tangents(points, Vector3::unit_x(), Vector3::unit_x()).unwrap()
    }

    #[test]
    fn bezier_interpolation_is_c1_at_the_joints() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(3.0, 2.0, 1.0),
            Point3::new(4.0, 0.0, 0.0),
        ];
        let curve = bezier_interpolation(&points).unwrap();
        const EPS: f64 = 1.0e-9;
        for k in 1..3 {
            let before = curve.derivative_at(k as f64 - EPS);
            let after = curve.derivative_at(k as f64 + EPS);
            assert!((before - after).magnitude() < 1.0e-6);
        }
    }

    #[test]
    fn approximation_smooths_noisy_samples() {
        let points: Vec<Point3> = (0..20)
            .map(|i| {
                let t = i as f64 / 19.0;
                let wiggle = if i % 2 == 0 { 0.01 } else { -0.01 };
                Point3::new(t * 10.0, t * t * 5.0 + wiggle, 0.0)
            })
            .collect();
        let curve = approximate(&points, 3, 8).unwrap();
        assert_near!(curve.start_point(), points[0]);
        assert_near!(curve.end_point(), points[19]);
        for pt in &points {
            let closest = curve.closest_point(*pt).unwrap();
            assert!(closest.distance(*pt) < 0.1);
        }
    }
}
