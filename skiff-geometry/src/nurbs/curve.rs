use crate::errors::Error;
use crate::primitives::{arbitrary_perpendicular, Plane};
use crate::*;
use skiff_base::ders::rat_ders;

impl NurbsCurve {
    /// constructor.
    /// # Arguments
    /// * `knot_vec` - the knot vector
    /// * `control_points` - the control points in pre-multiplied homogeneous form
    /// # Panics
    /// Panics if the arguments violate the curve invariants; see
    /// [`NurbsCurve::try_new`].
    pub fn new(knot_vec: KnotVec, control_points: Vec<Vector4>) -> NurbsCurve {
        NurbsCurve::try_new(knot_vec, control_points).unwrap_or_else(|e| panic!("{}", e))
    }

    /// constructor.
    /// # Failures
    /// * Returns [`Error::InvalidPointCount`] if there are fewer than two
    ///   control points.
    /// * Returns [`Error::InvalidDegree`] if the knot relation
    ///   `knots = ctrl_pts + degree + 1` leaves no room for a degree in
    ///   `1..=ctrl_pts - 1`.
    /// * Returns [`Error::InvalidKnotVector`] if the knot vector is not
    ///   sorted, has zero range, or is neither clamped nor periodic.
    pub fn try_new(knot_vec: KnotVec, control_points: Vec<Vector4>) -> Result<NurbsCurve> {
        if control_points.len() < 2 {
            return Err(Error::InvalidPointCount {
                required: 2,
                found: control_points.len(),
            });
        }
        let num_ctrl = control_points.len();
        let degree = knot_vec.len() as isize - num_ctrl as isize - 1;
        if degree < 1 || degree as usize > num_ctrl - 1 {
            return Err(Error::InvalidDegree {
                degree: degree.max(0) as usize,
                num_ctrl,
            });
        }
        if !knot_vec.is_valid(degree as usize, num_ctrl) {
            return Err(Error::InvalidKnotVector);
        }
        Ok(NurbsCurve {
            knot_vec,
            control_points,
        })
    }

    /// constructor.
    /// # Remarks
    /// This method does NOT check the curve invariants. The caller must
    /// guarantee them; prepared for intermediate states of the modification
    /// algorithms.
    #[inline(always)]
    pub const fn new_unchecked(knot_vec: KnotVec, control_points: Vec<Vector4>) -> NurbsCurve {
        NurbsCurve {
            knot_vec,
            control_points,
        }
    }

    /// constructor. Checks the invariants only in debug builds.
    #[inline(always)]
    pub fn debug_new(knot_vec: KnotVec, control_points: Vec<Vector4>) -> NurbsCurve {
        match cfg!(debug_assertions) {
            true => Self::new(knot_vec, control_points),
            false => Self::new_unchecked(knot_vec, control_points),
        }
    }

    /// Constructs the curve through the given located points with a default
    /// clamped uniform knot vector and unit weights.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let pts = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 1.0, 0.0),
    ///     Point3::new(2.0, 0.0, 0.0),
    ///     Point3::new(3.0, 1.0, 0.0),
    /// ];
    /// let curve = NurbsCurve::from_points(&pts, 3).unwrap();
    /// assert_eq!(curve.degree(), 3);
    /// assert_near!(curve.start_point(), pts[0]);
    /// assert_near!(curve.end_point(), pts[3]);
    /// ```
    pub fn from_points(points: &[Point3], degree: usize) -> Result<NurbsCurve> {
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
        let knot_vec = KnotVec::uniform_knot(degree, points.len() - degree);
        let control_points = points.iter().map(|p| Vector4::from_point(*p)).collect();
        Ok(NurbsCurve::debug_new(knot_vec, control_points))
    }

    /// Returns the reference of the knot vector.
    #[inline(always)]
    pub fn knot_vec(&self) -> &KnotVec { &self.knot_vec }

    /// Returns the `idx`th knot.
    #[inline(always)]
    pub fn knot(&self, idx: usize) -> f64 { self.knot_vec[idx] }

    /// Returns the reference of the control points.
    #[inline(always)]
    pub fn control_points(&self) -> &Vec<Vector4> { &self.control_points }

    /// Returns the reference of the control point corresponding to the index `idx`.
    #[inline(always)]
    pub fn control_point(&self, idx: usize) -> &Vector4 { &self.control_points[idx] }

    /// Returns the mutable reference of the control point corresponding to index `idx`.
    #[inline(always)]
    pub fn control_point_mut(&mut self, idx: usize) -> &mut Vector4 {
        &mut self.control_points[idx]
    }

    /// Applies the given transformation to all control points.
    #[inline(always)]
    pub fn transform_control_points<F: FnMut(&mut Vector4)>(&mut self, f: F) {
        self.control_points.iter_mut().for_each(f)
    }

    /// Returns the degree of the curve.
    #[inline(always)]
    pub fn degree(&self) -> usize { self.knot_vec.len() - self.control_points.len() - 1 }

    /// Returns the weight sequence, a derived view of the control points.
    #[inline(always)]
    pub fn weights(&self) -> Vec<f64> { self.control_points.iter().map(|cp| cp.w).collect() }

    /// Returns the dehomogenized control points, a derived view.
    #[inline(always)]
    pub fn location_points(&self) -> Vec<Point3> {
        self.control_points.iter().map(|cp| cp.to_point()).collect()
    }

    /// Returns whether the knot vector is clamped or not.
    #[inline(always)]
    pub fn is_clamped(&self) -> bool { self.knot_vec.is_clamped(self.degree()) }

    /// Returns whether the knot vector is periodic or not.
    #[inline(always)]
    pub fn is_periodic(&self) -> bool { self.knot_vec.is_periodic(self.degree()) }

    /// Returns whether the two endpoints of the curve coincide.
    #[inline(always)]
    pub fn is_closed(&self) -> bool { self.start_point().near(&self.end_point()) }

    /// The active domain of the curve, `[knots[p], knots[n + 1]]`.
    #[inline(always)]
    pub fn domain(&self) -> Interval {
        let p = self.degree();
        Interval::new(self.knot_vec[p], self.knot_vec[self.control_points.len()])
    }

    /// Reverses the curve: the control points are reversed and the knot
    /// vector is mirrored so that the domain interval is preserved.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let curve = NurbsCurve::from_points(&[
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 2.0, 0.0),
    ///     Point3::new(2.0, 1.0, 1.0),
    ///     Point3::new(3.0, 0.0, 2.0),
    /// ], 2).unwrap();
    /// let mut reversed = curve.clone();
    /// reversed.reverse();
    ///
    /// const N: usize = 100;
    /// for i in 0..=N {
    ///     let t = (i as f64) / (N as f64);
    ///     assert_near2!(curve.point_at(t), reversed.point_at(1.0 - t));
    /// }
    /// ```
    #[inline(always)]
    pub fn reverse(&mut self) -> &mut Self {
        self.knot_vec.mirror();
        self.control_points.reverse();
        self
    }

    /// Normalizes the knot vector.
    #[inline(always)]
    pub fn knot_normalize(&mut self) -> &mut Self {
        self.knot_vec.try_normalize().unwrap();
        self
    }

    /// Translates the knot vector.
    #[inline(always)]
    pub fn knot_translate(&mut self, x: f64) -> &mut Self {
        self.knot_vec.translate(x);
        self
    }
}

impl NurbsCurve {
    /// Evaluates the homogeneous curve.
    ///
    /// The parameter is clamped into the active domain before the span
    /// search, so out-of-domain arguments evaluate to the boundary points.
    pub fn homogeneous_point_at(&self, t: f64) -> Vector4 {
        let p = self.degree();
        let t = self.domain().clamp(t);
        let span = self.knot_vec.span(p, t);
        let basis = self.knot_vec.basis_functions(p, span, t);
        basis
            .iter()
            .enumerate()
            .fold(Vector4::zero(), |sum, (j, b)| {
                sum + self.control_points[span - p + j] * *b
            })
    }

    /// Evaluates the curve.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// // a quarter circle as a rational Bezier
    /// let knot_vec = KnotVec::bezier_knot(2);
    /// let ctrl_pts = vec![
    ///     Vector4::new(1.0, 0.0, 0.0, 1.0),
    ///     Vector4::new(1.0, 1.0, 0.0, 1.0) * f64::sqrt(0.5),
    ///     Vector4::new(0.0, 1.0, 0.0, 1.0),
    /// ];
    /// let curve = NurbsCurve::new(knot_vec, ctrl_pts);
    /// const N: usize = 100;
    /// for i in 0..=N {
    ///     let t = (i as f64) / (N as f64);
    ///     let pt = curve.point_at(t);
    ///     f64::assert_near2(&(pt.to_vec().magnitude()), &1.0);
    /// }
    /// ```
    #[inline(always)]
    pub fn point_at(&self, t: f64) -> Point3 { self.homogeneous_point_at(t).to_point() }

    /// Returns the derivatives of the homogeneous curve up to `order`.
    pub fn homogeneous_derivatives(&self, t: f64, order: usize) -> Vec<Vector4> {
        let p = self.degree();
        let t = self.domain().clamp(t);
        let span = self.knot_vec.span(p, t);
        let basis_ders = self.knot_vec.ders_basis_functions(p, span, t, order);
        basis_ders
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold(Vector4::zero(), |sum, (j, b)| {
                        sum + self.control_points[span - p + j] * *b
                    })
            })
            .collect()
    }

    /// Returns the derivatives of the curve up to `order` (0th entry is the
    /// point as a vector). The rational derivatives are recovered from the
    /// homogeneous ones by the Leibniz formula; orders beyond the degree
    /// are zero vectors.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let curve = NurbsCurve::from_points(&[
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(0.5, 0.0, 0.0),
    ///     Point3::new(1.0, 1.0, 0.0),
    /// ], 2).unwrap();
    /// // the curve is (t, t^2, 0)
    /// const N: usize = 10;
    /// for i in 0..=N {
    ///     let t = (i as f64) / (N as f64);
    ///     let ders = curve.derivatives_at(t, 2);
    ///     assert_near2!(ders[1], Vector3::new(1.0, 2.0 * t, 0.0));
    ///     assert_near2!(ders[2], Vector3::new(0.0, 2.0, 0.0));
    /// }
    /// ```
    #[inline(always)]
    pub fn derivatives_at(&self, t: f64, order: usize) -> Vec<Vector3> {
        rat_ders(&self.homogeneous_derivatives(t, order))
    }

    /// Returns the first derivative of the curve at `t`.
    #[inline(always)]
    pub fn derivative_at(&self, t: f64) -> Vector3 {
        let ders = self.homogeneous_derivatives(t, 1);
        ders[0].rat_der(ders[1])
    }

    /// Returns the second derivative of the curve at `t`.
    #[inline(always)]
    pub fn second_derivative_at(&self, t: f64) -> Vector3 {
        let ders = self.homogeneous_derivatives(t, 2);
        ders[0].rat_der2(ders[1], ders[2])
    }

    /// Returns the unit tangent vector, the zero vector at a stationary
    /// point.
    #[inline(always)]
    pub fn tangent_at(&self, t: f64) -> Vector3 {
        let der = self.derivative_at(t);
        match der.magnitude2().so_small() {
            true => Vector3::zero(),
            false => der.normalize(),
        }
    }

    /// Returns the curvature at `t` by `|c' x c''| / |c'|^3`.
    pub fn curvature_at(&self, t: f64) -> f64 {
        let ders = self.derivatives_at(t, 2);
        let speed2 = ders[1].magnitude2();
        if speed2.so_small2() {
            return 0.0;
        }
        ders[1].cross(ders[2]).magnitude() / (speed2 * speed2.sqrt())
    }

    /// Returns the Frenet frame at `t` as a plane: the origin is the curve
    /// point, the x-axis the unit tangent, the y-axis the principal normal,
    /// and the z-axis the binormal.
    ///
    /// When the second derivative vanishes the principal normal is not
    /// defined; the frame falls back to an arbitrary perpendicular of the
    /// tangent so the result is always usable.
    pub fn frame_at(&self, t: f64) -> Plane {
        let ders = self.derivatives_at(t, 2);
        let origin = Point3::from_vec(ders[0]);
        let tangent = match ders[1].magnitude2().so_small() {
            true => Vector3::unit_x(),
            false => ders[1].normalize(),
        };
        let rejection = ders[2] - tangent * ders[2].dot(tangent);
        let normal = match rejection.magnitude2().so_small2() {
            true => arbitrary_perpendicular(tangent),
            false => rejection.normalize(),
        };
        Plane::new_unchecked(origin, tangent, normal)
    }

    /// Returns the closure of evaluation.
    #[inline(always)]
    pub fn get_closure(&self) -> impl Fn(f64) -> Point3 + '_ { move |t| self.point_at(t) }

    /// Returns whether all dehomogenized control points are the same.
    pub fn is_const(&self) -> bool {
        let pt = self.control_points[0].to_point();
        self.control_points
            .iter()
            .all(move |vec| vec.to_point().near(&pt))
    }

    pub(crate) fn sub_near_as_curve<F: Fn(&Point3, &Point3) -> bool>(
        &self,
        other: &NurbsCurve,
        ord: F,
    ) -> bool {
        if !self.knot_vec.shares_range(&other.knot_vec) {
            return false;
        }
        let division = 2 * usize::max(self.degree(), other.degree());
        for window in self.knot_vec.windows(2) {
            let step = (window[1] - window[0]) / division as f64;
            if step.so_small() {
                continue;
            }
            for j in 0..division {
                let t = window[0] + step * j as f64;
                if !ord(&self.point_at(t), &other.point_at(t)) {
                    return false;
                }
            }
        }
        true
    }

    /// Determines whether `self` and `other` are near as curves.
    ///
    /// Divides each knot interval into a number of equal parts and checks
    /// `|self(t) - other(t)| < TOLERANCE` at the division points.
    #[inline(always)]
    pub fn near_as_curve(&self, other: &NurbsCurve) -> bool {
        self.sub_near_as_curve(other, |x, y| x.near(y))
    }

    /// Determines whether `self` and `other` are near in square order as curves.
    #[inline(always)]
    pub fn near2_as_curve(&self, other: &NurbsCurve) -> bool {
        self.sub_near_as_curve(other, |x, y| x.near2(y))
    }
}

impl NurbsCurve {
    /// Inserts the knot `x` once and does not change `self` as a map.
    ///
    /// The fresh control points are built in one forward sweep: the window
    /// `[k - degree + 1, k]` around the insertion span blends each point
    /// with its predecessor by the local knot ratio, everything before the
    /// window is copied, and everything after shifts up by one. A knot
    /// ahead of (or behind) the whole sequence brings in one vanishing
    /// control point instead.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let curve = NurbsCurve::from_points(&[
    ///     Point3::new(-1.0, 1.0, 0.0),
    ///     Point3::new(0.0, -1.0, 0.0),
    ///     Point3::new(1.0, 1.0, 0.0),
    /// ], 2).unwrap();
    /// let mut refined = curve.clone();
    /// refined.add_knot(0.5).add_knot(0.5).add_knot(0.25).add_knot(0.75);
    /// assert_eq!(refined.knot_vec().len(), curve.knot_vec().len() + 4);
    /// assert!(refined.near2_as_curve(&curve));
    /// ```
    pub fn add_knot(&mut self, x: f64) -> &mut Self {
        if x < self.knot_vec[0] {
            self.knot_vec.add_knot(x);
            self.control_points.insert(0, Vector4::zero());
            return self;
        }

        let p = self.degree() as isize;
        let n = self.control_points.len() as isize - 1;
        let k = self.knot_vec.floor(x).unwrap() as isize;

        let fetch = |i: isize| match 0 <= i && i <= n {
            true => self.control_points[i as usize],
            false => Vector4::zero(),
        };
        let mut fresh = Vec::with_capacity(self.control_points.len() + 1);
        for i in 0..=(n + 1) {
            if i <= k - p {
                fresh.push(fetch(i));
            } else if i <= k {
                let denom = self.knot_vec[(i + p) as usize] - self.knot_vec[i as usize];
                let ratio = (x - self.knot_vec[i as usize]) * inv_or_zero(denom);
                fresh.push(fetch(i) * ratio + fetch(i - 1) * (1.0 - ratio));
            } else {
                fresh.push(fetch(i - 1));
            }
        }
        self.control_points = fresh;
        self.knot_vec.add_knot(x);
        self
    }

    /// Inserts the knot `t` with the given multiplicity.
    /// # Failures
    /// Returns [`Error::OutOfDomain`] when `t` lies outside the active
    /// domain.
    pub fn try_insert_knot(&mut self, t: f64, multiplicity: usize) -> Result<&mut Self> {
        if !self.domain().contains(t) {
            return Err(Error::OutOfDomain(t));
        }
        for _ in 0..multiplicity {
            self.add_knot(t);
        }
        Ok(self)
    }

    /// Inserts the sorted multiset `xs` of parameters in one sweep,
    /// allocating the destination arrays at their exact final sizes, and
    /// does not change `self` as a curve.
    /// # Failures
    /// Returns [`Error::OutOfDomain`] when a parameter lies outside the
    /// active domain.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let pts: Vec<_> = (0..8).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
    /// let curve = NurbsCurve::from_points(&pts, 3).unwrap();
    /// let mut refined = curve.clone();
    /// refined.try_refine_knots(&[0.3, 0.3, 0.3]).unwrap();
    /// assert_eq!(refined.control_points().len(), curve.control_points().len() + 3);
    /// assert!(refined.near2_as_curve(&curve));
    /// ```
    pub fn try_refine_knots(&mut self, xs: &[f64]) -> Result<&mut Self> {
        if xs.is_empty() {
            return Ok(self);
        }
        let mut xs = xs.to_vec();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let Interval { t0, t1 } = self.domain();
        if xs[0] < t0 {
            return Err(Error::OutOfDomain(xs[0]));
        }
        if t1 < xs[xs.len() - 1] {
            return Err(Error::OutOfDomain(xs[xs.len() - 1]));
        }

        let p = self.degree();
        let knots = &self.knot_vec;
        let n = self.control_points.len() - 1;
        let r = xs.len() - 1;
        let a = knots.span(p, xs[0]);
        let b = knots.span(p, xs[r]) + 1;

        let mut new_knots = vec![0.0; knots.len() + r + 1];
        let mut new_cps = vec![Vector4::zero(); n + r + 2];
        new_cps[0..=(a - p)].copy_from_slice(&self.control_points[0..=(a - p)]);
        for i in (b - 1)..=n {
            new_cps[i + r + 1] = self.control_points[i];
        }
        new_knots[0..=a].copy_from_slice(&knots[0..=a]);
        for i in (b + p)..knots.len() {
            new_knots[i + r + 1] = knots[i];
        }

        let mut i = b + p - 1;
        let mut k = b + p + r;
        for j in (0..=r).rev() {
            while xs[j] <= knots[i] && i > a {
                new_cps[k - p - 1] = self.control_points[i - p - 1];
                new_knots[k] = knots[i];
                k -= 1;
                i -= 1;
            }
            new_cps[k - p - 1] = new_cps[k - p];
            for l in 1..=p {
                let ind = k - p + l;
                let mut alfa = new_knots[k + l] - xs[j];
                if alfa.so_small() {
                    new_cps[ind - 1] = new_cps[ind];
                } else {
                    alfa /= new_knots[k + l] - knots[i - p + l];
                    new_cps[ind - 1] = new_cps[ind - 1] * alfa + new_cps[ind] * (1.0 - alfa);
                }
            }
            new_knots[k] = xs[j];
            k -= 1;
        }

        self.knot_vec = KnotVec::try_from(new_knots).unwrap();
        self.control_points = new_cps;
        Ok(self)
    }

    /// Removes one copy of the knot at the index `idx` if the curve shape
    /// survives the removal exactly.
    ///
    /// The affected control points are folded from both ends of the window
    /// toward its middle; the removal is accepted only when the two folds
    /// meet in agreement.
    /// # Failures
    /// Returns [`Error::InvalidKnotVector`] when the index addresses a
    /// clamp knot or the knot cannot be removed without changing the curve.
    pub fn try_remove_knot(&mut self, idx: usize) -> Result<&mut NurbsCurve> {
        let p = self.degree();
        let n = self.control_points.len();
        let knots = &self.knot_vec;

        if idx <= p || idx >= n {
            return Err(Error::InvalidKnotVector);
        }
        let u = knots[idx];
        let r = knots.floor(u).unwrap();
        let s = knots.multiplicity_of(u);
        if r >= n || s > r {
            return Err(Error::InvalidKnotVector);
        }
        let first = r - p;
        let last = r - s;
        let off = first - 1;

        let mut temp = vec![Vector4::zero(); p + 2];
        temp[0] = self.control_points[off];
        temp[last + 1 - off] = self.control_points[last + 1];
        let (mut i, mut j) = (first, last);
        let (mut ii, mut jj) = (1, last - off);
        while j > i {
            let alfi = (u - knots[i]) / (knots[i + p + 1] - knots[i]);
            let alfj = (u - knots[j]) / (knots[j + p + 1] - knots[j]);
            temp[ii] = (self.control_points[i] - temp[ii - 1] * (1.0 - alfi)) / alfi;
            temp[jj] = (self.control_points[j] - temp[jj + 1] * alfj) / (1.0 - alfj);
            i += 1;
            ii += 1;
            j -= 1;
            jj -= 1;
        }
        let removable = if j < i {
            temp[ii - 1].near(&temp[jj + 1])
        } else {
            let alfi = (u - knots[i]) / (knots[i + p + 1] - knots[i]);
            let blend = temp[jj + 1] * alfi + temp[ii - 1] * (1.0 - alfi);
            self.control_points[i].near(&blend)
        };
        if !removable {
            return Err(Error::InvalidKnotVector);
        }

        let (mut i, mut j) = (first, last);
        while j > i {
            self.control_points[i] = temp[i - off];
            self.control_points[j] = temp[j - off];
            i += 1;
            j -= 1;
        }
        self.control_points.remove((2 * r - s - p) / 2);
        self.knot_vec.0.remove(r);
        Ok(self)
    }

    /// Removes a knot if possible; does nothing when it cannot be removed.
    pub fn remove_knot(&mut self, idx: usize) -> &mut Self {
        let _ = self.try_remove_knot(idx);
        self
    }

    /// Removes every knot whose removal leaves the curve unchanged,
    /// sweeping from the back until a full pass removes nothing.
    pub fn optimize(&mut self) -> &mut Self {
        let mut stable = false;
        while !stable {
            stable = true;
            let mut idx = self.knot_vec.len();
            while idx > 0 {
                idx -= 1;
                if idx < self.knot_vec.len() && self.try_remove_knot(idx).is_ok() {
                    stable = false;
                }
            }
        }
        self
    }

    /// Makes the curve clamped by saturating the first and last knot
    /// values to multiplicity `degree + 1`.
    pub fn clamp(&mut self) -> &mut Self {
        let p = self.degree();
        let front = self.knot_vec[0];
        let deficit = (p + 1).saturating_sub(self.knot_vec.multiplicity_of(front));
        for _ in 0..deficit {
            self.add_knot(front);
        }
        let back = self.knot_vec[self.knot_vec.len() - 1];
        let deficit = (p + 1).saturating_sub(self.knot_vec.multiplicity_of(back));
        for _ in 0..deficit {
            self.add_knot(back);
        }
        self
    }

    /// Clamps a periodic curve at its domain endpoints: inserts each domain
    /// end to full multiplicity and discards the wrapped ends. A clamped
    /// curve is returned unchanged.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let knot_vec = KnotVec::periodic_uniform_knot(2, 6);
    /// let ctrl_pts: Vec<_> = (0..6)
    ///     .map(|i| {
    ///         let theta = std::f64::consts::PI * (i as f64) / 3.0;
    ///         Vector4::new(theta.cos(), theta.sin(), 0.0, 1.0)
    ///     })
    ///     .collect();
    /// let curve = NurbsCurve::new(knot_vec, ctrl_pts);
    /// let mut clamped = curve.clone();
    /// clamped.clamp_ends();
    /// assert!(clamped.is_clamped());
    /// let domain = curve.domain();
    /// assert_eq!(clamped.domain(), domain);
    /// assert_near!(clamped.point_at(domain.t0), curve.point_at(domain.t0));
    /// ```
    pub fn clamp_ends(&mut self) -> &mut Self {
        if self.is_clamped() {
            return self;
        }
        let Interval { t0, t1 } = self.domain();
        let latter = self.cut(t0);
        *self = latter;
        let _ = self.cut(t1);
        self
    }

    /// Closes the curve periodically: the first `degree` control points are
    /// appended after the last and the knot vector is replaced with a
    /// uniform periodic one of matching length.
    pub fn close(&mut self) -> &mut Self {
        let p = self.degree();
        let wrapped: Vec<Vector4> = self.control_points[..p].to_vec();
        self.control_points.extend(wrapped);
        self.knot_vec = KnotVec::periodic_uniform_knot(p, self.control_points.len());
        self
    }

    /// Cuts the curve into two at the parameter `t`. `self` becomes the
    /// former curve and the latter is returned.
    ///
    /// The cut parameter is refined to full multiplicity in one batch, then
    /// the knot and control-point buffers are split behind the saturated
    /// run.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let pts: Vec<_> = (0..5).map(|i| Point3::new(i as f64, (i * i) as f64, 0.0)).collect();
    /// let curve = NurbsCurve::from_points(&pts, 2).unwrap();
    /// let mut part0 = curve.clone();
    /// let part1 = part0.cut(0.56);
    /// const N: usize = 100;
    /// for i in 0..=N {
    ///     let t = 0.56 * (i as f64) / (N as f64);
    ///     assert_near2!(curve.point_at(t), part0.point_at(t));
    /// }
    /// for i in 0..=N {
    ///     let t = 0.56 + 0.44 * (i as f64) / (N as f64);
    ///     assert_near2!(curve.point_at(t), part1.point_at(t));
    /// }
    /// ```
    pub fn cut(&mut self, t: f64) -> NurbsCurve {
        let p = self.degree();
        let t = f64::max(t, self.knot_vec[0]);
        // snap onto an existing knot so the multiplicity count sees the run
        let t = match self.knot_vec.floor(t) {
            Some(idx) if t.near(&self.knot_vec[idx]) => self.knot_vec[idx],
            _ => t,
        };
        let missing = (p + 1).saturating_sub(self.knot_vec.multiplicity_of(t));
        if missing > 0 {
            self.try_refine_knots(&vec![t; missing]).unwrap();
        }

        let run_back = self.knot_vec.floor(t).unwrap();
        let boundary = run_back - p;
        let latter_points = self.control_points.split_off(boundary);
        let latter_knots = KnotVec::try_from(self.knot_vec[boundary..].to_vec()).unwrap();
        self.knot_vec.0.truncate(run_back + 1);
        NurbsCurve::new_unchecked(latter_knots, latter_points)
    }

    /// Splits the curve at `t`; the shared endpoint of the two halves is
    /// the curve point at `t`.
    /// # Failures
    /// Returns [`Error::OutOfDomain`] when `t` does not lie strictly inside
    /// the active domain; splitting does not clamp.
    pub fn try_split(&self, t: f64) -> Result<(NurbsCurve, NurbsCurve)> {
        let Interval { t0, t1 } = self.domain();
        if t <= t0 + TOLERANCE || t1 - TOLERANCE <= t {
            return Err(Error::OutOfDomain(t));
        }
        let mut former = self.clone();
        let latter = former.cut(t);
        Ok((former, latter))
    }

    /// Separates the curve into Bezier segments: every distinct interior
    /// breakpoint is refined to full multiplicity in a single batch, after
    /// which the control points slice into windows of `degree + 1` per
    /// span.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let pts: Vec<_> = (0..4).map(|i| Point3::new(i as f64, 1.0, 0.0)).collect();
    /// let curve = NurbsCurve::from_points(&pts, 2).unwrap();
    /// let beziers = curve.bezier_decomposition();
    /// assert_eq!(beziers.len(), 2);
    /// const N: usize = 100;
    /// for i in 0..=N {
    ///     let t = 0.5 * (i as f64) / (N as f64);
    ///     assert_near2!(curve.point_at(t), beziers[0].point_at(t));
    /// }
    /// ```
    pub fn bezier_decomposition(&self) -> Vec<NurbsCurve> {
        let p = self.degree();
        let mut curve = self.clone();
        curve.clamp();

        // saturate every interior breakpoint in one refinement batch
        let (distinct, mults) = curve.knot_vec.to_single_multi();
        let mut batch = Vec::new();
        for (knot, mult) in distinct[1..distinct.len() - 1]
            .iter()
            .zip(&mults[1..mults.len() - 1])
        {
            batch.extend(std::iter::repeat(*knot).take(p.saturating_sub(*mult)));
        }
        if !batch.is_empty() {
            curve.try_refine_knots(&batch).unwrap();
        }

        // slice the saturated net into one Bezier window per span
        let (distinct, mults) = curve.knot_vec.to_single_multi();
        let mut segments = Vec::with_capacity(distinct.len() - 1);
        let mut covered = 0;
        for s in 0..distinct.len() - 1 {
            covered += mults[s];
            let start = covered - 1 - p;
            let points = curve.control_points[start..=start + p].to_vec();
            let mut knots = vec![distinct[s]; p + 1];
            knots.extend(std::iter::repeat(distinct[s + 1]).take(p + 1));
            segments.push(NurbsCurve::new_unchecked(
                KnotVec::try_from(knots).unwrap(),
                points,
            ));
        }
        segments
    }

    /// Elevates one Bezier segment by the closed-form coefficient rule:
    /// the new interior points are the index-weighted averages of adjacent
    /// old points.
    fn elevate_degree_bezier(&mut self) -> &mut Self {
        let p = self.degree();
        let points = &self.control_points;
        let mut elevated = Vec::with_capacity(p + 2);
        elevated.push(points[0]);
        for i in 1..=p {
            let ratio = i as f64 / (p + 1) as f64;
            elevated.push(points[i - 1] * ratio + points[i] * (1.0 - ratio));
        }
        elevated.push(points[p]);

        let Interval { t0, t1 } = self.domain();
        let mut knots = vec![t0; p + 2];
        knots.extend(std::iter::repeat(t1).take(p + 2));
        self.knot_vec = KnotVec::try_from(knots).unwrap();
        self.control_points = elevated;
        self
    }

    fn rejoin_segments(segments: Vec<NurbsCurve>) -> NurbsCurve {
        let mut joined: Option<NurbsCurve> = None;
        for mut segment in segments {
            joined = Some(match joined {
                None => segment,
                Some(mut head) => {
                    head.concat(&mut segment);
                    head
                }
            });
        }
        joined.expect("empty decomposition")
    }

    fn drop_excess_interior_knots(&mut self, interior: &[(f64, usize)]) {
        for &(value, target) in interior {
            while self.knot_vec.multiplicity_of(value) > target {
                let idx = self.knot_vec.floor(value).unwrap();
                if self.try_remove_knot(idx).is_err() {
                    break;
                }
            }
        }
    }

    fn interior_multiplicities(&self) -> Vec<(f64, usize)> {
        let (knots, mults) = self.knot_vec.to_single_multi();
        knots[1..knots.len() - 1]
            .iter()
            .copied()
            .zip(mults[1..mults.len() - 1].iter().copied())
            .collect()
    }

    /// elevates 1 degree.
    ///
    /// Decomposes into Bezier segments, elevates each by the closed-form
    /// rule, and re-joins while removing the seam knots that the
    /// decomposition saturated. The domain is unchanged and so is the curve
    /// as a map.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let pts: Vec<_> = (0..5).map(|i| Point3::new(i as f64, (i % 2) as f64, 0.0)).collect();
    /// let curve = NurbsCurve::from_points(&pts, 2).unwrap();
    /// let mut elevated = curve.clone();
    /// elevated.elevate_degree();
    /// assert_eq!(elevated.degree(), 3);
    /// assert!(elevated.near2_as_curve(&curve));
    /// ```
    pub fn elevate_degree(&mut self) -> &mut Self {
        let interior: Vec<(f64, usize)> = self
            .interior_multiplicities()
            .into_iter()
            .map(|(knot, mult)| (knot, mult + 1))
            .collect();

        let mut segments = self.bezier_decomposition();
        segments.iter_mut().for_each(|segment| {
            segment.elevate_degree_bezier();
        });
        *self = NurbsCurve::rejoin_segments(segments);
        self.drop_excess_interior_knots(&interior);
        self
    }

    /// elevates the degree up to `degree`.
    pub fn elevate_degree_to(&mut self, degree: usize) -> &mut Self {
        while self.degree() < degree {
            self.elevate_degree();
        }
        self
    }

    /// Degree reduction of a single Bezier segment by the blended
    /// forward/backward recurrence; `None` when the pointwise deviation
    /// exceeds `tol`.
    fn reduced_bezier(&self, tol: f64) -> Option<NurbsCurve> {
        let p = self.degree();
        let q = p - 1;
        let b = &self.control_points;
        let Interval { t0, t1 } = self.domain();

        let mut forward = vec![Vector4::zero(); q + 1];
        forward[0] = b[0];
        for i in 1..=q {
            forward[i] = (b[i] * p as f64 - forward[i - 1] * i as f64) * (1.0 / (p - i) as f64);
        }
        let mut backward = vec![Vector4::zero(); q + 1];
        backward[q] = b[p];
        for i in (1..=q).rev() {
            backward[i - 1] = (b[i] * p as f64 - backward[i] * (p - i) as f64) * (1.0 / i as f64);
        }
        let split = q / 2;
        let reduced: Vec<Vector4> = (0..=q)
            .map(|i| if i <= split { forward[i] } else { backward[i] })
            .collect();

        let mut knots = vec![t0; q + 1];
        knots.extend(std::iter::repeat(t1).take(q + 1));
        let candidate = NurbsCurve::new_unchecked(KnotVec::try_from(knots).unwrap(), reduced);

        let samples = 2 * p + 1;
        let deviation = (0..=samples)
            .map(|i| {
                let t = t0 + (t1 - t0) * (i as f64) / (samples as f64);
                candidate.point_at(t).distance(self.point_at(t))
            })
            .fold(0.0, f64::max);
        match deviation <= tol {
            true => Some(candidate),
            false => None,
        }
    }

    /// Reduces the degree by one when every Bezier segment admits a
    /// reduction within `tol`; otherwise `self` is returned unchanged.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// // a degree-2 curve written with degree 3
    /// let mut curve = NurbsCurve::from_points(&[
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 1.0, 0.0),
    ///     Point3::new(2.0, 0.0, 0.0),
    /// ], 2).unwrap();
    /// let original = curve.clone();
    /// curve.elevate_degree();
    /// curve.reduce_degree(1.0e-6);
    /// assert_eq!(curve.degree(), 2);
    /// assert!(curve.near2_as_curve(&original));
    /// ```
    pub fn reduce_degree(&mut self, tol: f64) -> &mut Self {
        let p = self.degree();
        if p <= 1 {
            return self;
        }
        let q = p - 1;
        let interior: Vec<(f64, usize)> = self
            .interior_multiplicities()
            .into_iter()
            .map(|(knot, mult)| (knot, usize::min(mult, q)))
            .collect();

        let mut segments = Vec::new();
        for bezier in self.bezier_decomposition() {
            match bezier.reduced_bezier(tol) {
                Some(reduced) => segments.push(reduced),
                None => return self,
            }
        }
        *self = NurbsCurve::rejoin_segments(segments);
        self.drop_excess_interior_knots(&interior);
        self
    }

    /// Makes two curves have the same degree by elevating the lower one.
    pub fn syncro_degree(&mut self, other: &mut Self) {
        while self.degree() < other.degree() {
            self.elevate_degree();
        }
        while other.degree() < self.degree() {
            other.elevate_degree();
        }
    }

    /// Makes two clamped curves share the same normalized knot vector by
    /// refining both to the union of their breakpoint multisets.
    pub fn syncro_knots(&mut self, other: &mut NurbsCurve) {
        self.knot_normalize();
        other.knot_normalize();

        let mut union: Vec<(f64, usize)> = Vec::new();
        for curve in [&*self, &*other] {
            let (knots, mults) = curve.knot_vec.to_single_multi();
            for (knot, mult) in knots.into_iter().zip(mults) {
                match union.iter_mut().find(|(k, _)| k.near(&knot)) {
                    Some((_, m)) => *m = usize::max(*m, mult),
                    None => union.push((knot, mult)),
                }
            }
        }
        union.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

        for curve in [&mut *self, &mut *other] {
            for &(knot, mult) in &union {
                for _ in curve.knot_vec.multiplicity_of(knot)..mult {
                    curve.add_knot(knot);
                }
            }
        }
    }

    /// Concats two curves. The degrees are synchronized, both operands are
    /// clamped, and the weights of `other` are rescaled so that the shared
    /// homogeneous control point matches.
    /// # Failures
    /// Returns [`Error::NotAdjacent`] when the back knot of `self` and the
    /// front knot of `other` differ.
    pub fn try_concat(&mut self, other: &mut NurbsCurve) -> Result<&mut Self> {
        self.syncro_degree(other);
        self.clamp();
        other.clamp();
        let w0 = self.control_points[self.control_points.len() - 1].w;
        let w1 = other.control_points[0].w;
        let factor = w0 / w1;
        other.transform_control_points(|cp| *cp = *cp * factor);
        self.knot_vec.try_concat(&other.knot_vec, self.degree())?;
        self.control_points.extend_from_slice(&other.control_points);
        Ok(self)
    }

    /// Concats two curves.
    /// # Panics
    /// Panic occurs if the knot vectors are not adjacent.
    #[inline(always)]
    pub fn concat(&mut self, other: &mut Self) -> &mut Self {
        self.try_concat(other)
            .unwrap_or_else(|error| panic!("{}", error))
    }

    /// Joins an ordered sequence of curves into one. Every curve is
    /// elevated to the maximum degree of the input, the knot vectors are
    /// chained by translation, and the shared endpoint control point is
    /// deduplicated where the seam is exact.
    /// # Failures
    /// * Returns [`Error::InvalidPointCount`] when fewer than two curves
    ///   are supplied.
    /// * Returns [`Error::NotAdjacent`] when consecutive endpoints do not
    ///   match within the tolerance.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let line0 = Line::try_new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0))
    ///     .unwrap().to_nurbs();
    /// let line1 = Line::try_new(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0))
    ///     .unwrap().to_nurbs();
    /// let joined = NurbsCurve::join(&[line0, line1]).unwrap();
    /// assert_near!(joined.start_point(), Point3::new(0.0, 0.0, 0.0));
    /// assert_near!(joined.end_point(), Point3::new(1.0, 1.0, 0.0));
    /// ```
    pub fn join(curves: &[NurbsCurve]) -> Result<NurbsCurve> {
        if curves.len() < 2 {
            return Err(Error::InvalidPointCount {
                required: 2,
                found: curves.len(),
            });
        }
        let mut result = curves[0].clone();
        result.clamp();
        for curve in &curves[1..] {
            if !result.end_point().near(&curve.start_point()) {
                return Err(Error::NotAdjacent);
            }
            let mut curve = curve.clone();
            curve.clamp();
            let seam = *result.knot_vec.last().unwrap();
            curve.knot_translate(seam - curve.knot_vec[0]);
            result.try_concat(&mut curve)?;
            let idx = result.knot_vec.floor(seam).unwrap();
            result.remove_knot(idx);
        }
        Ok(result)
    }
}

impl NurbsCurve {
    /// Returns the bounding box including all control points; cheap and
    /// conservative.
    #[inline(always)]
    pub fn roughly_bounding_box(&self) -> BoundingBox<Point3> {
        self.control_points.iter().map(|cp| cp.to_point()).collect()
    }

    /// Returns the tight bounding box of the curve.
    ///
    /// A periodic curve is clamped first. The curve is decomposed into
    /// Bezier segments; for each segment and each coordinate the interior
    /// extrema are located at the roots of the scalar derivative
    /// polynomial (closed form up to the quadratic, dense sampling above
    /// that and for weighted segments) and the evaluated candidates are
    /// accumulated with the segment endpoints.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let curve = NurbsCurve::from_points(&[
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 2.0, 0.0),
    ///     Point3::new(2.0, 0.0, 0.0),
    /// ], 2).unwrap();
    /// let bdd = curve.bounding_box();
    /// assert_near!(*bdd.min(), Point3::new(0.0, 0.0, 0.0));
    /// assert_near!(*bdd.max(), Point3::new(2.0, 1.0, 0.0));
    /// ```
    pub fn bounding_box(&self) -> BoundingBox<Point3> {
        let mut curve = self.clone();
        if !curve.is_clamped() {
            curve.clamp_ends();
        }
        let mut bdd_box = BoundingBox::new();
        for bezier in curve.bezier_decomposition() {
            let Interval { t0, t1 } = bezier.domain();
            bdd_box.push(&bezier.point_at(t0));
            bdd_box.push(&bezier.point_at(t1));
            for axis in 0..3 {
                for t in bezier.axis_extrema(axis) {
                    bdd_box.push(&bezier.point_at(t));
                }
            }
        }
        bdd_box
    }

    /// Interior extremum candidates of one coordinate of a Bezier segment,
    /// as absolute parameters.
    fn axis_extrema(&self, axis: usize) -> Vec<f64> {
        let p = self.degree();
        let interval = self.domain();
        let rational = self.control_points.iter().any(|cp| !cp.w.near(&1.0));

        let mut locals = Vec::new();
        if rational || p > 3 {
            // no closed form; sample the segment densely
            let samples = 4 * p;
            locals.extend((1..samples).map(|i| i as f64 / samples as f64));
        } else {
            let coords: Vec<f64> = self.control_points.iter().map(|cp| cp[axis] / cp.w).collect();
            let diffs: Vec<f64> = coords.windows(2).map(|w| w[1] - w[0]).collect();
            match diffs.len() {
                2 => {
                    let (d0, d1) = (diffs[0], diffs[1]);
                    if !(d0 - d1).so_small() {
                        locals.push(d0 / (d0 - d1));
                    }
                }
                3 => {
                    let a = diffs[0] - 2.0 * diffs[1] + diffs[2];
                    let b = 2.0 * (diffs[1] - diffs[0]);
                    let c = diffs[0];
                    if a.so_small() {
                        if !b.so_small() {
                            locals.push(-c / b);
                        }
                    } else {
                        let disc = b * b - 4.0 * a * c;
                        if disc >= 0.0 {
                            let sqrt = disc.sqrt();
                            locals.push((-b + sqrt) / (2.0 * a));
                            locals.push((-b - sqrt) / (2.0 * a));
                        }
                    }
                }
                _ => {}
            }
        }
        locals
            .into_iter()
            .filter(|s| 0.0 < *s && *s < 1.0)
            .map(|s| interval.param_at(s))
            .collect()
    }
}

impl SpatialCurve for NurbsCurve {
    #[inline(always)]
    fn point_at(&self, t: f64) -> Point3 { self.point_at(t) }
    #[inline(always)]
    fn derivative_at(&self, t: f64) -> Vector3 { self.derivative_at(t) }
    #[inline(always)]
    fn second_derivative_at(&self, t: f64) -> Vector3 { self.second_derivative_at(t) }
    #[inline(always)]
    fn domain(&self) -> Interval { self.domain() }
}

impl Reversible for NurbsCurve {
    #[inline(always)]
    fn reversed(&self) -> Self {
        let mut curve = self.clone();
        curve.reverse();
        curve
    }
}

impl Transformable for NurbsCurve {
    #[inline(always)]
    fn transformed(&self, transform: Matrix4) -> Self {
        let control_points = self
            .control_points
            .iter()
            .map(|cp| transform * *cp)
            .collect();
        NurbsCurve::new_unchecked(self.knot_vec.clone(), control_points)
    }
}
