use crate::errors::Error;
use crate::*;

impl KnotVec {
    /// construct from `Vec<f64>`. does not sort, only checks the order.
    /// # Examples
    /// ```
    /// use skiff_geometry::KnotVec;
    /// assert!(KnotVec::try_from(vec![0.0, 1.0, 2.0]).is_ok());
    /// assert!(KnotVec::try_from(vec![1.0, 0.0, 2.0]).is_err());
    /// ```
    pub fn try_from(vec: Vec<f64>) -> Result<KnotVec> {
        match vec.windows(2).all(|pair| pair[0] <= pair[1]) {
            true => Ok(KnotVec(vec)),
            false => Err(Error::InvalidKnotVector),
        }
    }

    /// construct from single-multi description.
    /// # Examples
    /// ```
    /// use skiff_geometry::KnotVec;
    /// let knot_vec = KnotVec::from_single_multi(vec![0.0, 1.0, 2.0], vec![3, 1, 3]).unwrap();
    /// assert_eq!(knot_vec.as_slice(), &[0.0, 0.0, 0.0, 1.0, 2.0, 2.0, 2.0]);
    /// ```
    pub fn from_single_multi(knots: Vec<f64>, mults: Vec<usize>) -> Result<KnotVec> {
        let expanded = knots
            .iter()
            .zip(&mults)
            .flat_map(|(knot, mult)| std::iter::repeat(*knot).take(*mult))
            .collect();
        KnotVec::try_from(expanded)
    }

    /// Constructs the knot vector for a Bezier spline.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// assert_eq!(
    ///     KnotVec::bezier_knot(3).as_slice(),
    ///     &[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
    /// );
    /// ```
    pub fn bezier_knot(degree: usize) -> KnotVec {
        let knots = (0..2 * (degree + 1))
            .map(|i| if i <= degree { 0.0 } else { 1.0 })
            .collect();
        KnotVec(knots)
    }

    /// Constructs the clamped uniform knot vector with `division` spans.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// assert_eq!(
    ///     KnotVec::uniform_knot(2, 5).as_slice(),
    ///     &[0.0, 0.0, 0.0, 0.2, 0.4, 0.6, 0.8, 1.0, 1.0, 1.0],
    /// );
    /// ```
    pub fn uniform_knot(degree: usize, division: usize) -> KnotVec {
        let interior = (1..division).map(|i| i as f64 / division as f64);
        let knots = std::iter::repeat(0.0)
            .take(degree + 1)
            .chain(interior)
            .chain(std::iter::repeat(1.0).take(degree + 1))
            .collect();
        KnotVec(knots)
    }

    /// Constructs the uniform periodic knot vector over `n_ctrl` control
    /// points, active domain inside `[0, 1]`.
    pub fn periodic_uniform_knot(degree: usize, n_ctrl: usize) -> KnotVec {
        let m = n_ctrl + degree;
        KnotVec((0..=m).map(|i| i as f64 / m as f64).collect())
    }

    /// Constructs the averaged knot vector of the interpolation parameters
    /// `params` for the given degree: interior knots are running means of
    /// `degree` consecutive parameters.
    pub fn averaged_knot(params: &[f64], degree: usize) -> KnotVec {
        let n = params.len() - 1;
        let mut vec = vec![params[0]; degree + 1];
        for j in 1..=(n - degree) {
            let avg = params[j..j + degree].iter().sum::<f64>() / degree as f64;
            vec.push(avg);
        }
        vec.extend(std::iter::repeat(params[n]).take(degree + 1));
        KnotVec(vec)
    }

    /// Returns the length of the parameter axis covered by the whole
    /// sequence, zero when the sequence is empty.
    #[inline(always)]
    pub fn total_range(&self) -> f64 {
        match (self.0.first(), self.0.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// Returns whether two knot vectors parameterize the same interval,
    /// comparing both endpoints within the tolerance.
    #[inline(always)]
    pub fn shares_range(&self, other: &KnotVec) -> bool {
        match (self.0.first(), other.0.first()) {
            (Some(a), Some(b)) => {
                a.near(b) && self.0.last().unwrap().near(other.0.last().unwrap())
            }
            (None, None) => true,
            _ => false,
        }
    }

    /// Returns the index of the last knot not exceeding `x`, `None` when
    /// `x` precedes the whole sequence.
    /// # Examples
    /// ```
    /// use skiff_geometry::KnotVec;
    /// let knot_vec = KnotVec::try_from(vec![0.0, 0.0, 1.0, 2.0, 3.0, 3.0]).unwrap();
    /// assert_eq!(knot_vec.floor(1.5), Some(2));
    /// assert_eq!(knot_vec.floor(-1.0), None);
    /// ```
    #[inline(always)]
    pub fn floor(&self, x: f64) -> Option<usize> {
        // the sequence is sorted, so a binary partition finds the run
        self.0.partition_point(|knot| *knot <= x).checked_sub(1)
    }

    /// Inserts `knot` keeping the sequence sorted, and returns the index it
    /// landed at.
    /// # Examples
    /// ```
    /// use skiff_geometry::KnotVec;
    /// let mut knot_vec = KnotVec::try_from(vec![0.0, 0.0, 1.0, 2.0, 3.0, 3.0]).unwrap();
    /// assert_eq!(knot_vec.add_knot(1.5), 3);
    /// assert_eq!(knot_vec.add_knot(-1.0), 0);
    /// assert_eq!(knot_vec.as_slice(), &[-1.0, 0.0, 0.0, 1.0, 1.5, 2.0, 3.0, 3.0]);
    /// ```
    #[inline(always)]
    pub fn add_knot(&mut self, knot: f64) -> usize {
        let idx = self.0.partition_point(|u| *u <= knot);
        self.0.insert(idx, knot);
        idx
    }

    /// Returns the knot span index `i` with `self[i] <= t < self[i + 1]`
    /// for a curve of the given degree, by binary search.
    ///
    /// The parameter is snapped to the boundary spans: any `t` at or beyond
    /// the back of the active domain lands in the last non-empty span, so
    /// that callers can index `control_points[span - degree ..= span]`
    /// without going out of range.
    /// # Examples
    /// ```
    /// use skiff_geometry::KnotVec;
    /// let knot_vec = KnotVec::try_from(
    ///     vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 4.0, 4.0]
    /// ).unwrap();
    /// assert_eq!(knot_vec.span(2, 0.0), 2);
    /// assert_eq!(knot_vec.span(2, 2.5), 4);
    /// assert_eq!(knot_vec.span(2, 4.0), 5); // snapped to the last span
    /// ```
    pub fn span(&self, degree: usize, t: f64) -> usize {
        let n = self.len() - degree - 2;
        if t >= self[n + 1] {
            // skip over any repeated back knots into the last non-empty span
            let mut idx = n;
            while idx > degree && self[idx].near(&self[n + 1]) {
                idx -= 1;
            }
            return idx;
        }
        if t <= self[degree] {
            // symmetric skip over a repeated front value
            let mut idx = degree;
            while idx < n && self[idx + 1].near(&self[degree]) {
                idx += 1;
            }
            return idx;
        }
        let (mut low, mut high) = (degree, n + 1);
        let mut mid = (low + high) / 2;
        while t < self[mid] || t >= self[mid + 1] {
            if t < self[mid] {
                high = mid;
            } else {
                low = mid;
            }
            mid = (low + high) / 2;
        }
        mid
    }

    /// Returns the multiplicity of the knot value `x`, zero when `x` is not
    /// a knot.
    /// # Examples
    /// ```
    /// use skiff_geometry::KnotVec;
    /// let knot_vec = KnotVec::try_from(
    ///     vec![0.0, 0.0, 1.0, 2.0, 2.0, 2.0, 3.0, 3.0]
    /// ).unwrap();
    /// assert_eq!(knot_vec.multiplicity_of(2.0), 3);
    /// assert_eq!(knot_vec.multiplicity_of(1.5), 0);
    /// ```
    pub fn multiplicity_of(&self, x: f64) -> usize {
        // equal values form one contiguous run in the sorted sequence
        let run_start = self.0.partition_point(|knot| *knot < x - TOLERANCE);
        self.0[run_start..]
            .iter()
            .take_while(|knot| (*knot).near(&x))
            .count()
    }

    /// To single-multi description, i.e. decomposes into the vector of
    /// distinct knots and the vector of their multiplicities.
    /// # Examples
    /// ```
    /// use skiff_geometry::KnotVec;
    /// let knot_vec = KnotVec::try_from(
    ///     vec![0.0, 0.0, 0.0, 1.0, 2.0, 2.0, 2.0, 2.0, 3.0, 3.0]
    /// ).unwrap();
    /// let (knots, mults) = knot_vec.to_single_multi();
    /// assert_eq!(knots, vec![0.0, 1.0, 2.0, 3.0]);
    /// assert_eq!(mults, vec![3, 1, 4, 2]);
    /// ```
    pub fn to_single_multi(&self) -> (Vec<f64>, Vec<usize>) {
        let mut knots: Vec<f64> = Vec::new();
        let mut mults: Vec<usize> = Vec::new();
        for knot in &self.0 {
            match knots.last() {
                Some(last) if last.near(knot) => *mults.last_mut().unwrap() += 1,
                _ => {
                    knots.push(*knot);
                    mults.push(1);
                }
            }
        }
        (knots, mults)
    }

    /// Normalizes the knot vector: the first value becomes 0, the last 1.
    /// # Failures
    /// Returns [`Error::InvalidKnotVector`] when the sequence is empty or
    /// covers no range.
    /// # Examples
    /// ```
    /// use skiff_geometry::KnotVec;
    /// let mut knot_vec = KnotVec::try_from(vec![1.0, 1.0, 2.0, 3.0, 4.0, 5.0, 5.0]).unwrap();
    /// knot_vec.try_normalize().unwrap();
    /// assert_eq!(knot_vec.as_slice(), &[0.0, 0.0, 0.25, 0.5, 0.75, 1.0, 1.0]);
    /// ```
    pub fn try_normalize(&mut self) -> Result<&mut Self> {
        let scale = self.total_range();
        if scale.so_small() {
            return Err(Error::InvalidKnotVector);
        }
        let start = self[0];
        self.0
            .iter_mut()
            .for_each(|knot| *knot = (*knot - start) / scale);
        Ok(self)
    }

    /// Normalizes the knot vector.
    /// # Panics
    /// Panic occurs if the range of the knot vector is so small.
    #[inline(always)]
    pub fn normalize(&mut self) -> &mut Self {
        self.try_normalize()
            .unwrap_or_else(|error| panic!("{}", error))
    }

    /// translate the knot vector
    pub fn translate(&mut self, x: f64) -> &mut Self {
        self.0.iter_mut().for_each(|knot| *knot += x);
        self
    }

    /// Mirrors the knot pattern about the midpoint of its range: the domain
    /// endpoints swap roles while the interval itself is preserved.
    /// # Examples
    /// ```
    /// use skiff_geometry::KnotVec;
    /// let mut knot_vec = KnotVec::try_from(vec![1.0, 1.0, 1.0, 3.0, 5.0, 6.0]).unwrap();
    /// knot_vec.mirror();
    /// assert_eq!(knot_vec.as_slice(), &[1.0, 2.0, 4.0, 6.0, 6.0, 6.0]);
    /// ```
    pub fn mirror(&mut self) -> &mut Self {
        if self.0.is_empty() {
            return self;
        }
        let sum = self[0] + self[self.len() - 1];
        self.0.reverse();
        self.0.iter_mut().for_each(|knot| *knot = sum - *knot);
        self
    }

    /// determine the knot vector is clamped for the given degree.
    /// # Examples
    /// ```
    /// use skiff_geometry::KnotVec;
    /// let knot_vec = KnotVec::try_from(
    ///     vec![0.0, 0.0, 0.0, 0.25, 0.5, 0.75, 1.0, 1.0, 1.0]
    /// ).unwrap();
    /// assert!(knot_vec.is_clamped(2));
    /// assert!(!knot_vec.is_clamped(3));
    /// ```
    pub fn is_clamped(&self, degree: usize) -> bool {
        self.len() > degree
            && self.multiplicity_of(self[0]) > degree
            && self.multiplicity_of(self[self.len() - 1]) > degree
    }

    /// determine the knot vector is periodic for the given degree: the
    /// trailing `degree` knots repeat the pattern at the front of the
    /// active domain, shifted by the domain length.
    /// # Examples
    /// ```
    /// use skiff_geometry::KnotVec;
    /// let knot_vec = KnotVec::try_from(
    ///     vec![-2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
    /// ).unwrap();
    /// assert!(knot_vec.is_periodic(2));
    /// assert!(!knot_vec.is_clamped(2));
    /// ```
    pub fn is_periodic(&self, degree: usize) -> bool {
        let m = self.len() - 1;
        if m < 2 * degree + 2 {
            return false;
        }
        let period = self[m - degree] - self[degree];
        if period.so_small() {
            return false;
        }
        let front_wrap = (0..degree).all(|i| (self[i] + period).near(&self[m - 2 * degree + i]));
        let back_wrap =
            (0..degree).all(|i| (self[degree + 1 + i] + period).near(&self[m - degree + 1 + i]));
        front_wrap && back_wrap
    }

    /// determine the interior knots are equispaced within the tolerance.
    pub fn is_uniform(&self) -> bool {
        let (knots, _) = self.to_single_multi();
        if knots.len() < 3 {
            return true;
        }
        let step = knots[1] - knots[0];
        knots.windows(2).all(|pair| (pair[1] - pair[0]).near(&step))
    }

    /// Checks the invariants of a knot vector of the given degree over
    /// `n_ctrl` control points: the length relation, the ordering, and a
    /// valid clamped or periodic end pattern.
    pub fn is_valid(&self, degree: usize, n_ctrl: usize) -> bool {
        self.len() == n_ctrl + degree + 1
            && self.0.windows(2).all(|pair| pair[0] <= pair[1])
            && !self.total_range().so_small()
            && (self.is_clamped(degree) || self.is_periodic(degree))
    }

    /// Chains `other` onto the back of `self`: the closing clamp of `self`
    /// is dropped and the whole of `other` appended.
    /// # Failures
    /// * Returns [`Error::InvalidKnotVector`] when one of the operands is
    ///   not clamped.
    /// * Returns [`Error::NotAdjacent`] when the back of `self` and the
    ///   front of `other` differ.
    /// # Examples
    /// ```
    /// use skiff_geometry::KnotVec;
    /// let mut knot_vec0 = KnotVec::try_from(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
    /// let knot_vec1 = KnotVec::try_from(vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0]).unwrap();
    /// knot_vec0.try_concat(&knot_vec1, 2).unwrap();
    /// assert_eq!(knot_vec0.as_slice(), &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
    /// ```
    pub fn try_concat(&mut self, other: &KnotVec, degree: usize) -> Result<&mut Self> {
        if !self.is_clamped(degree) || !other.is_clamped(degree) {
            return Err(Error::InvalidKnotVector);
        }
        let seam = self[self.len() - 1];
        if !seam.near(&other[0]) {
            return Err(Error::NotAdjacent);
        }
        self.0.truncate(self.len() - (degree + 1));
        self.0.extend_from_slice(&other.0);
        Ok(self)
    }

    /// Calculates the non-vanishing B-spline basis functions at `t` on the
    /// given span, returning `degree + 1` values.
    ///
    /// The computation runs the two-array recurrence with
    /// `left[j] = t - knots[span + 1 - j]` and
    /// `right[j] = knots[span + j] - t`, overwriting a single working
    /// buffer.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// const N: usize = 100; // sample size in tests
    ///
    /// // a partition of unity on the active domain
    /// let knot_vec = KnotVec::try_from(
    ///     vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 4.0, 4.0]
    /// ).unwrap();
    /// let degree = 2;
    /// for i in 0..=N {
    ///     let t = 4.0 * (i as f64) / (N as f64);
    ///     let span = knot_vec.span(degree, t);
    ///     let res = knot_vec.basis_functions(degree, span, t);
    ///     let sum: f64 = res.iter().sum();
    ///     f64::assert_near2(&sum, &1.0);
    /// }
    /// ```
    /// ```
    /// use skiff_geometry::*;
    /// const N: usize = 100;
    ///
    /// // on a Bezier knot vector the basis coincides with the Bernstein polynomials
    /// let knot_vec = KnotVec::bezier_knot(3);
    /// for i in 0..=N {
    ///     let t = i as f64 / N as f64;
    ///     let span = knot_vec.span(3, t);
    ///     let res = knot_vec.basis_functions(3, span, t);
    ///     let ans = [
    ///         (1.0 - t) * (1.0 - t) * (1.0 - t),
    ///         3.0 * t * (1.0 - t) * (1.0 - t),
    ///         3.0 * t * t * (1.0 - t),
    ///         t * t * t,
    ///     ];
    ///     for i in 0..4 { f64::assert_near2(&res[i], &ans[i]); }
    /// }
    /// ```
    pub fn basis_functions(&self, degree: usize, span: usize, t: f64) -> Vec<f64> {
        let knots = &self.0;
        let mut res = vec![0.0; degree + 1];
        res[0] = 1.0;
        let mut left = vec![0.0; degree + 1];
        let mut right = vec![0.0; degree + 1];
        for j in 1..=degree {
            left[j] = t - knots[span + 1 - j];
            right[j] = knots[span + j] - t;
            let mut saved = 0.0;
            for r in 0..j {
                let temp = res[r] / (right[r + 1] + left[j - r]);
                res[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            res[j] = saved;
        }
        res
    }

    /// Calculates the non-vanishing basis functions and their derivatives
    /// up to `order` at `t` on the given span.
    ///
    /// Returns a `(order + 1) x (degree + 1)` table whose row `k` holds the
    /// `k`-th derivatives. Rows beyond the degree are zero.
    pub fn ders_basis_functions(
        &self,
        degree: usize,
        span: usize,
        t: f64,
        order: usize,
    ) -> Vec<Vec<f64>> {
        let knots = &self.0;
        let p = degree;
        let n = usize::min(order, p);

        let mut ndu = vec![vec![0.0; p + 1]; p + 1];
        ndu[0][0] = 1.0;
        let mut left = vec![0.0; p + 1];
        let mut right = vec![0.0; p + 1];
        for j in 1..=p {
            left[j] = t - knots[span + 1 - j];
            right[j] = knots[span + j] - t;
            let mut saved = 0.0;
            for r in 0..j {
                ndu[j][r] = right[r + 1] + left[j - r];
                let temp = ndu[r][j - 1] / ndu[j][r];
                ndu[r][j] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            ndu[j][j] = saved;
        }

        let mut ders = vec![vec![0.0; p + 1]; order + 1];
        for j in 0..=p {
            ders[0][j] = ndu[j][p];
        }

        // the two-row ping-pong over the a-coefficients
        let mut a = vec![vec![0.0; p + 1]; 2];
        for r in 0..=p {
            let (mut s1, mut s2) = (0, 1);
            a[0][0] = 1.0;
            a[1][0] = 0.0;
            for k in 1..=n {
                let mut d = 0.0;
                let rk = r as isize - k as isize;
                let pk = p - k;
                if r >= k {
                    a[s2][0] = a[s1][0] / ndu[pk + 1][rk as usize];
                    d = a[s2][0] * ndu[rk as usize][pk];
                }
                let j1 = if rk >= -1 { 1 } else { (-rk) as usize };
                let j2 = if r <= pk + 1 { k - 1 } else { p - r };
                for j in j1..=j2 {
                    let rkj = (rk + j as isize) as usize;
                    a[s2][j] = (a[s1][j] - a[s1][j - 1]) / ndu[pk + 1][rkj];
                    d += a[s2][j] * ndu[rkj][pk];
                }
                if r <= pk {
                    a[s2][k] = -a[s1][k - 1] / ndu[pk + 1][r];
                    d += a[s2][k] * ndu[r][pk];
                }
                ders[k][r] = d;
                std::mem::swap(&mut s1, &mut s2);
            }
        }

        let mut coef = p as f64;
        for k in 1..=n {
            for j in 0..=p {
                ders[k][j] *= coef;
            }
            coef *= (p - k) as f64;
        }
        ders
    }

    /// Evaluates a single basis function `N_{i, degree}` at `t`.
    ///
    /// Returns exactly `1.0` at the domain endpoints for the first and last
    /// basis function, where the half-open-interval convention would
    /// otherwise yield `0.0`.
    pub fn one_basis_function(&self, degree: usize, i: usize, t: f64) -> f64 {
        let knots = &self.0;
        let m = knots.len() - 1;
        if (i == 0 && t.near(&knots[0])) || (i == m - degree - 1 && t.near(&knots[m])) {
            return 1.0;
        }
        if t < knots[i] || t >= knots[i + degree + 1] {
            return 0.0;
        }
        let mut table = vec![0.0; degree + 1];
        for (j, entry) in table.iter_mut().enumerate() {
            *entry = if knots[i + j] <= t && t < knots[i + j + 1] {
                1.0
            } else {
                0.0
            };
        }
        for k in 1..=degree {
            let mut saved = if table[0] == 0.0 {
                0.0
            } else {
                (t - knots[i]) * table[0] / (knots[i + k] - knots[i])
            };
            for j in 0..=(degree - k) {
                let left = knots[i + j + 1];
                let right = knots[i + j + k + 1];
                if table[j + 1] == 0.0 {
                    table[j] = saved;
                    saved = 0.0;
                } else {
                    let temp = table[j + 1] / (right - left);
                    table[j] = saved + (right - t) * temp;
                    saved = (t - left) * temp;
                }
            }
        }
        table[0]
    }
}

impl std::ops::Deref for KnotVec {
    type Target = Vec<f64>;
    #[inline(always)]
    fn deref(&self) -> &Vec<f64> { &self.0 }
}

impl AsRef<[f64]> for KnotVec {
    #[inline(always)]
    fn as_ref(&self) -> &[f64] { &self.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_snaps_at_domain_ends() {
        let knot_vec =
            KnotVec::try_from(vec![0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 5.0, 5.0, 5.0])
                .unwrap();
        // 8 control points, degree 3
        assert_eq!(knot_vec.span(3, 0.0), 3);
        assert_eq!(knot_vec.span(3, 2.5), 5);
        assert_eq!(knot_vec.span(3, 5.0), 7);
        assert_eq!(knot_vec.span(3, 7.0), 7);
    }

    #[test]
    fn span_skips_saturated_back_knots() {
        // the back value carries more copies than a clamp needs; the
        // snapped span must still have a non-empty basis window
        let knot_vec =
            KnotVec::try_from(vec![0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0, 1.0]).unwrap();
        let span = knot_vec.span(2, 1.0);
        assert_eq!(span, 3);
        let basis = knot_vec.basis_functions(2, span, 1.0);
        let sum: f64 = basis.iter().sum();
        f64::assert_near2(&sum, &1.0);
    }

    #[test]
    fn floor_and_add_knot_agree_on_runs() {
        let mut knot_vec = KnotVec::try_from(vec![0.0, 0.0, 1.0, 1.0, 2.0]).unwrap();
        assert_eq!(knot_vec.floor(1.0), Some(3));
        assert_eq!(knot_vec.floor(0.5), Some(1));
        // insertion lands right behind the run of equal values
        assert_eq!(knot_vec.add_knot(1.0), 4);
        assert_eq!(knot_vec.multiplicity_of(1.0), 3);
    }

    #[test]
    fn ders_basis_row_zero_matches_basis() {
        let knot_vec =
            KnotVec::try_from(vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 4.0, 4.0]).unwrap();
        for i in 0..=20 {
            let t = 4.0 * i as f64 / 20.0;
            let span = knot_vec.span(2, t);
            let basis = knot_vec.basis_functions(2, span, t);
            let ders = knot_vec.ders_basis_functions(2, span, t, 2);
            for j in 0..=2 {
                f64::assert_near2(&basis[j], &ders[0][j]);
            }
            // first derivatives of a partition of unity sum to zero
            let sum: f64 = ders[1].iter().sum();
            f64::assert_near2(&sum, &0.0);
        }
    }

    #[test]
    fn derivative_basis_against_finite_difference() {
        let knot_vec =
            KnotVec::try_from(vec![0.0, 0.0, 0.0, 0.0, 0.3, 1.2, 2.0, 2.0, 2.0, 2.0]).unwrap();
        const EPS: f64 = 1.0e-6;
        for i in 1..20 {
            let t = 2.0 * i as f64 / 20.0;
            let span = knot_vec.span(3, t);
            if knot_vec.span(3, t - EPS) != span || knot_vec.span(3, t + EPS) != span {
                continue;
            }
            let ders = knot_vec.ders_basis_functions(3, span, t, 1);
            let lo = knot_vec.basis_functions(3, span, t - EPS);
            let hi = knot_vec.basis_functions(3, span, t + EPS);
            for j in 0..=3 {
                let fd = (hi[j] - lo[j]) / (2.0 * EPS);
                assert!((ders[1][j] - fd).abs() < 1.0e-4, "{} vs {}", ders[1][j], fd);
            }
        }
    }

    #[test]
    fn one_basis_endpoint_special_case() {
        let knot_vec = KnotVec::bezier_knot(2);
        assert_eq!(knot_vec.one_basis_function(2, 0, 0.0), 1.0);
        assert_eq!(knot_vec.one_basis_function(2, 2, 1.0), 1.0);
        f64::assert_near2(&knot_vec.one_basis_function(2, 1, 0.5), &0.5);
    }

    #[test]
    fn periodic_classification() {
        let uniform = KnotVec::periodic_uniform_knot(3, 8);
        assert!(uniform.is_periodic(3));
        assert!(uniform.is_uniform());
        let clamped = KnotVec::uniform_knot(3, 5);
        assert!(clamped.is_clamped(3));
        assert!(!clamped.is_periodic(3));
        assert!(clamped.is_valid(3, 8));
    }

    #[test]
    fn single_multi_round_trip() {
        let knot_vec =
            KnotVec::try_from(vec![0.0, 0.0, 0.0, 1.0, 2.0, 2.0, 2.0, 2.0, 3.0, 3.0]).unwrap();
        let (knots, mults) = knot_vec.to_single_multi();
        assert_eq!(knots, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(mults, vec![3, 1, 4, 2]);
        let rebuilt = KnotVec::from_single_multi(knots, mults).unwrap();
        assert_eq!(rebuilt, knot_vec);
        assert!(KnotVec::from_single_multi(vec![1.0, 0.0], vec![1, 1]).is_err());
    }

    #[test]
    fn mirror_preserves_the_interval() {
        let mut knot_vec = KnotVec::try_from(vec![0.0, 0.0, 0.0, 1.0, 4.0, 4.0, 4.0]).unwrap();
        knot_vec.mirror();
        assert_eq!(knot_vec.as_slice(), &[0.0, 0.0, 0.0, 3.0, 4.0, 4.0, 4.0]);
        assert_eq!(knot_vec.total_range(), 4.0);
        knot_vec.mirror();
        assert_eq!(knot_vec.as_slice(), &[0.0, 0.0, 0.0, 1.0, 4.0, 4.0, 4.0]);
    }

    #[test]
    fn averaged_knot_of_uniform_params() {
        let params = [0.0, 0.25, 0.5, 0.75, 1.0];
        let knot_vec = KnotVec::averaged_knot(&params, 2);
        assert_eq!(knot_vec.len(), 8);
        f64::assert_near2(&knot_vec[3], &0.375);
        f64::assert_near2(&knot_vec[4], &0.625);
    }
}
