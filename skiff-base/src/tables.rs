//! Process-wide read-only numeric tables, initialized on first use.

use rustc_hash::FxHashMap;
use std::sync::{Mutex, OnceLock};

const BINOMIAL_ROWS: usize = 64;

/// Returns the binomial coefficient `C(n, k)` as `f64`.
///
/// The first rows of Pascal's triangle are memoized process-wide; larger
/// arguments fall back to the multiplicative formula.
/// # Examples
/// ```
/// use skiff_base::tables::binomial;
/// assert_eq!(binomial(5, 2), 10.0);
/// assert_eq!(binomial(7, 0), 1.0);
/// assert_eq!(binomial(3, 5), 0.0);
/// ```
pub fn binomial(n: usize, k: usize) -> f64 {
    static TABLE: OnceLock<Vec<Vec<f64>>> = OnceLock::new();
    if k > n {
        return 0.0;
    }
    let table = TABLE.get_or_init(|| {
        let mut rows: Vec<Vec<f64>> = Vec::with_capacity(BINOMIAL_ROWS);
        for n in 0..BINOMIAL_ROWS {
            let mut row = vec![1.0; n + 1];
            for k in 1..n {
                row[k] = rows[n - 1][k - 1] + rows[n - 1][k];
            }
            rows.push(row);
        }
        rows
    });
    match table.get(n) {
        Some(row) => row[k],
        None => (1..=k).fold(1.0, |acc, i| acc * (n - k + i) as f64 / i as f64),
    }
}

/// An abscissa/weight pair of a quadrature rule on `[-1, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadraturePoint {
    /// sample location in `[-1, 1]`
    pub abscissa: f64,
    /// quadrature weight
    pub weight: f64,
}

/// Returns the Gauss-Legendre nodes and weights of the given order.
///
/// Each order is computed once by Newton iteration on the Legendre
/// recurrence and cached process-wide; the returned slice is immutable for
/// the lifetime of the process.
/// # Panics
/// Panics if `order == 0`.
pub fn gauss_legendre(order: usize) -> &'static [QuadraturePoint] {
    assert!(order > 0, "quadrature order must be positive");
    static CACHE: OnceLock<Mutex<FxHashMap<usize, &'static [QuadraturePoint]>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(FxHashMap::default()));
    let mut map = cache.lock().expect("quadrature cache poisoned");
    if let Some(&pts) = map.get(&order) {
        return pts;
    }
    let pts: &'static [QuadraturePoint] = Box::leak(legendre_nodes(order).into_boxed_slice());
    map.insert(order, pts);
    pts
}

/// Legendre polynomial of degree `order` and its derivative at `x`, by the
/// three-term recurrence.
fn legendre_with_der(order: usize, x: f64) -> (f64, f64) {
    let (mut p0, mut p1) = (1.0, x);
    for n in 2..=order {
        let n = n as f64;
        let p2 = ((2.0 * n - 1.0) * x * p1 - (n - 1.0) * p0) / n;
        p0 = p1;
        p1 = p2;
    }
    let der = order as f64 * (x * p1 - p0) / (x * x - 1.0);
    (p1, der)
}

fn legendre_nodes(order: usize) -> Vec<QuadraturePoint> {
    let mut pts = Vec::with_capacity(order);
    for i in 1..=order {
        // Tricomi's initial guess, accurate enough for a handful of Newton steps
        let mut x = f64::cos(std::f64::consts::PI * (i as f64 - 0.25) / (order as f64 + 0.5));
        for _ in 0..100 {
            let (p, dp) = legendre_with_der(order, x);
            let dx = p / dp;
            x -= dx;
            if dx.abs() < 1.0e-15 {
                break;
            }
        }
        let (_, dp) = legendre_with_der(order, x);
        pts.push(QuadraturePoint {
            abscissa: x,
            weight: 2.0 / ((1.0 - x * x) * dp * dp),
        });
    }
    pts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_interval_length() {
        for order in [1, 2, 5, 13, 20] {
            let sum: f64 = gauss_legendre(order).iter().map(|pt| pt.weight).sum();
            assert!((sum - 2.0).abs() < 1.0e-12, "order {order}: {sum}");
        }
    }

    #[test]
    fn exact_for_low_degree_polynomials() {
        // order n integrates polynomials of degree 2n - 1 exactly
        let int: f64 = gauss_legendre(5)
            .iter()
            .map(|pt| pt.weight * pt.abscissa.powi(8))
            .sum();
        assert!((int - 2.0 / 9.0).abs() < 1.0e-12);
    }

    #[test]
    fn binomial_rows_beyond_table() {
        assert_eq!(binomial(70, 1), 70.0);
        assert!((binomial(70, 2) - 2415.0).abs() < 1.0e-6);
    }
}
