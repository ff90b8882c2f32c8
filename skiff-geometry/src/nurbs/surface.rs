use crate::errors::Error;
use crate::primitives::tangent_intersection;
use crate::*;
use skiff_base::ders::rat_surface_ders;

/// a parameter direction of a surface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceDirection {
    /// the first parameter
    U,
    /// the second parameter
    V,
}

impl NurbsSurface {
    /// constructor.
    /// # Arguments
    /// * `knot_vecs` - the knot vectors in the u- and v-directions
    /// * `control_points` - the control net in pre-multiplied homogeneous form,
    ///   rows along u and columns along v
    /// # Panics
    /// Panics if the arguments violate the surface invariants; see
    /// [`NurbsSurface::try_new`].
    pub fn new(
        knot_vecs: (KnotVec, KnotVec),
        control_points: ControlGrid<Vector4>,
    ) -> NurbsSurface {
        NurbsSurface::try_new(knot_vecs, control_points).unwrap_or_else(|e| panic!("{}", e))
    }

    /// constructor. The knot vectors are normalized to `[0, 1]` on
    /// construction.
    /// # Failures
    /// The invariants of [`NurbsCurve::try_new`] are checked in each
    /// direction.
    pub fn try_new(
        knot_vecs: (KnotVec, KnotVec),
        control_points: ControlGrid<Vector4>,
    ) -> Result<NurbsSurface> {
        let (rows, cols) = (control_points.rows(), control_points.cols());
        if rows < 2 || cols < 2 {
            return Err(Error::InvalidPointCount {
                required: 2,
                found: usize::min(rows, cols),
            });
        }
        let udegree = knot_vecs.0.len() as isize - rows as isize - 1;
        if udegree < 1 || udegree as usize > rows - 1 {
            return Err(Error::InvalidDegree {
                degree: udegree.max(0) as usize,
                num_ctrl: rows,
            });
        }
        let vdegree = knot_vecs.1.len() as isize - cols as isize - 1;
        if vdegree < 1 || vdegree as usize > cols - 1 {
            return Err(Error::InvalidDegree {
                degree: vdegree.max(0) as usize,
                num_ctrl: cols,
            });
        }
        if !knot_vecs.0.is_valid(udegree as usize, rows)
            || !knot_vecs.1.is_valid(vdegree as usize, cols)
        {
            return Err(Error::InvalidKnotVector);
        }
        let mut surface = NurbsSurface {
            knot_vecs,
            control_points,
        };
        surface.knot_vecs.0.try_normalize()?;
        surface.knot_vecs.1.try_normalize()?;
        Ok(surface)
    }

    /// constructor without the invariant checks.
    #[inline(always)]
    pub const fn new_unchecked(
        knot_vecs: (KnotVec, KnotVec),
        control_points: ControlGrid<Vector4>,
    ) -> NurbsSurface {
        NurbsSurface {
            knot_vecs,
            control_points,
        }
    }

    /// Constructs the bilinear surface through the four corners.
    /// # Examples
    /// ```
    /// use skiff_geometry::{nurbs::surface::*, *};
    /// let surface = NurbsSurface::from_corners(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 1.0),
    ///     Point3::new(1.0, 1.0, 1.0),
    /// );
    /// assert_near!(surface.point_at(0.5, 0.5), Point3::new(0.5, 0.5, 0.5));
    /// ```
    pub fn from_corners(p00: Point3, p10: Point3, p01: Point3, p11: Point3) -> NurbsSurface {
        let grid = ControlGrid::try_from_rows(vec![
            vec![Vector4::from_point(p00), Vector4::from_point(p01)],
            vec![Vector4::from_point(p10), Vector4::from_point(p11)],
        ])
        .unwrap();
        NurbsSurface::new_unchecked((KnotVec::bezier_knot(1), KnotVec::bezier_knot(1)), grid)
    }

    /// Constructs the surface through a rectangular grid of located points
    /// with clamped uniform knot vectors and unit weights.
    pub fn from_points_grid(
        points: Vec<Vec<Point3>>,
        udegree: usize,
        vdegree: usize,
    ) -> Result<NurbsSurface> {
        let rows = points.len();
        let cols = points.first().map(Vec::len).unwrap_or(0);
        if rows < udegree + 1 || cols < vdegree + 1 {
            return Err(Error::InvalidPointCount {
                required: usize::max(udegree, vdegree) + 1,
                found: usize::min(rows, cols),
            });
        }
        let homogeneous = points
            .into_iter()
            .map(|row| row.into_iter().map(Vector4::from_point).collect())
            .collect();
        let grid = ControlGrid::try_from_rows(homogeneous)?;
        NurbsSurface::try_new(
            (
                KnotVec::uniform_knot(udegree, rows - udegree),
                KnotVec::uniform_knot(vdegree, cols - vdegree),
            ),
            grid,
        )
    }

    /// Constructs the ruled surface between two section curves; `u` runs
    /// between the sections, `v` along them.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// let curve0 = NurbsCurve::from_points(&[
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 1.0, 0.0),
    ///     Point3::new(2.0, 0.0, 0.0),
    /// ], 2).unwrap();
    /// let curve1 = NurbsCurve::from_points(&[
    ///     Point3::new(0.0, 0.0, 3.0),
    ///     Point3::new(1.0, 1.0, 3.0),
    ///     Point3::new(2.0, 0.0, 3.0),
    /// ], 2).unwrap();
    /// let surface = NurbsSurface::ruled(&curve0, &curve1);
    /// assert_near!(surface.point_at(0.5, 0.5), Point3::new(1.0, 0.5, 1.5));
    /// ```
    pub fn ruled(curve0: &NurbsCurve, curve1: &NurbsCurve) -> NurbsSurface {
        let mut curve0 = curve0.clone();
        let mut curve1 = curve1.clone();
        curve0.clamp();
        curve1.clamp();
        curve0.syncro_degree(&mut curve1);
        curve0.syncro_knots(&mut curve1);
        let vknots = curve0.knot_vec().clone();
        let grid = ControlGrid::try_from_rows(vec![
            curve0.control_points().clone(),
            curve1.control_points().clone(),
        ])
        .unwrap();
        NurbsSurface::new_unchecked((KnotVec::bezier_knot(1), vknots), grid)
    }

    /// Constructs the lofted surface through the section curves; `u` runs
    /// across the sections, `v` along them. The sections are synchronized
    /// to a common degree and knot vector and their control points are
    /// interpolated across `u` with an averaged knot vector.
    /// # Failures
    /// Returns [`Error::InvalidPointCount`] when fewer than two sections
    /// are supplied.
    pub fn lofted(sections: &[NurbsCurve]) -> Result<NurbsSurface> {
        if sections.len() < 2 {
            return Err(Error::InvalidPointCount {
                required: 2,
                found: sections.len(),
            });
        }
        let mut sections: Vec<NurbsCurve> = sections.to_vec();
        let max_degree = sections.iter().map(NurbsCurve::degree).max().unwrap();
        sections.iter_mut().for_each(|c| {
            c.clamp().knot_normalize().elevate_degree_to(max_degree);
        });

        // refine every section to the union of the section knot vectors
        let mut union: Vec<(f64, usize)> = Vec::new();
        for section in &sections {
            let (knots, mults) = section.knot_vec().to_single_multi();
            for (knot, mult) in knots.into_iter().zip(mults) {
                match union.iter_mut().find(|(k, _)| k.near(&knot)) {
                    Some((_, m)) => *m = usize::max(*m, mult),
                    None => union.push((knot, mult)),
                }
            }
        }
        union.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        for section in &mut sections {
            for &(knot, mult) in &union {
                while section.knot_vec().multiplicity_of(knot) < mult {
                    section.add_knot(knot);
                }
            }
        }

        let rows = sections.len();
        let cols = sections[0].control_points().len();
        let udegree = usize::min(3, rows - 1);

        // averaged chord-length parameters over the section control points
        let mut params = vec![0.0; rows];
        let mut active_columns = 0;
        for j in 0..cols {
            let mut chords = Vec::with_capacity(rows - 1);
            for k in 1..rows {
                let prev = sections[k - 1].control_point(j).to_point();
                let next = sections[k].control_point(j).to_point();
                chords.push(next.distance(prev));
            }
            let total: f64 = chords.iter().sum();
            if total.so_small() {
                continue;
            }
            active_columns += 1;
            let mut acc = 0.0;
            for (k, chord) in chords.iter().enumerate() {
                acc += chord / total;
                params[k + 1] += acc;
            }
        }
        for (k, param) in params.iter_mut().enumerate() {
            match active_columns {
                0 => *param = k as f64 / (rows - 1) as f64,
                _ => *param /= active_columns as f64,
            }
            if k == rows - 1 {
                *param = 1.0;
            }
        }

        let uknots = KnotVec::averaged_knot(&params, udegree);
        let mut columns = Vec::with_capacity(cols);
        for j in 0..cols {
            let data: Vec<Vector4> = sections
                .iter()
                .map(|section| *section.control_point(j))
                .collect();
            let column = crate::fitting::interpolate_values(&data, &params, &uknots, udegree)?;
            columns.push(column);
        }
        let grid = ControlGrid::from_columns(columns);
        NurbsSurface::try_new((uknots, sections[0].knot_vec().clone()), grid)
    }

    /// Constructs the surface of revolution of `profile` around the axis
    /// through `origin` with direction `axis`, sweeping by `angle` radians.
    /// `u` runs along the sweep, `v` along the profile.
    /// # Failures
    /// Returns [`Error::InvalidPointCount`] for a degenerate axis.
    /// # Examples
    /// ```
    /// use skiff_geometry::*;
    /// use std::f64::consts::PI;
    /// // revolve a line into a cylinder patch
    /// let profile = Line::try_new(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 2.0))
    ///     .unwrap().to_nurbs();
    /// let surface = NurbsSurface::revolved(
    ///     &profile,
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Vector3::unit_z(),
    ///     2.0 * PI,
    /// ).unwrap();
    /// for i in 0..8 {
    ///     let u = i as f64 / 8.0;
    ///     let pt = surface.point_at(u, 0.5);
    ///     f64::assert_near(&Vector2::new(pt.x, pt.y).magnitude(), &1.0);
    ///     f64::assert_near(&pt.z, &1.0);
    /// }
    /// ```
    pub fn revolved(
        profile: &NurbsCurve,
        origin: Point3,
        axis: Vector3,
        angle: f64,
    ) -> Result<NurbsSurface> {
        if axis.magnitude2().so_small() {
            return Err(Error::InvalidPointCount {
                required: 2,
                found: 1,
            });
        }
        let axis = axis.normalize();
        let narcs = usize::max(1, (angle.abs() / std::f64::consts::FRAC_PI_2).ceil() as usize);
        let dtheta = angle / narcs as f64;
        let wm = (dtheta / 2.0).cos();

        // u-knot vector of degree 2 with doubled interior knots
        let mut uknots = vec![0.0; 3];
        for i in 1..narcs {
            let x = i as f64 / narcs as f64;
            uknots.push(x);
            uknots.push(x);
        }
        uknots.extend(std::iter::repeat(1.0).take(3));
        let uknots = KnotVec::try_from(uknots).unwrap();

        let cols = profile.control_points().len();
        let rows = 2 * narcs + 1;
        let mut grid = ControlGrid::new_unchecked(vec![Vector4::zero(); rows * cols], cols);
        for j in 0..cols {
            let cp = profile.control_point(j);
            let wj = cp.w;
            let pj = cp.to_point();
            let center = origin + axis * (pj - origin).dot(axis);
            let x_dir = pj - center;
            let radius = x_dir.magnitude();
            if radius.so_small() {
                for i in 0..rows {
                    grid[(i, j)] = *cp;
                }
                continue;
            }
            let x_dir = x_dir / radius;
            let y_dir = axis.cross(x_dir);

            let ring_point = |theta: f64| {
                center + x_dir * (radius * theta.cos()) + y_dir * (radius * theta.sin())
            };
            let ring_tangent =
                |theta: f64| (y_dir * theta.cos() - x_dir * theta.sin()).normalize();

            let mut p0 = ring_point(0.0);
            let mut t0 = ring_tangent(0.0);
            grid[(0, j)] = *cp;
            for i in 1..=narcs {
                let theta = dtheta * i as f64;
                let p2 = ring_point(theta);
                let t2 = ring_tangent(theta);
                let mid = tangent_intersection(p0, t0, p2, t2);
                grid[(2 * i - 1, j)] = Vector4::from_point_weight(mid, wm * wj);
                grid[(2 * i, j)] = Vector4::from_point_weight(p2, wj);
                p0 = p2;
                t0 = t2;
            }
        }
        NurbsSurface::try_new((uknots, profile.knot_vec().clone()), grid)
    }

    /// Returns the reference of the knot vectors.
    #[inline(always)]
    pub fn knot_vecs(&self) -> &(KnotVec, KnotVec) { &self.knot_vecs }

    /// Returns the u-knot vector.
    #[inline(always)]
    pub fn uknot_vec(&self) -> &KnotVec { &self.knot_vecs.0 }

    /// Returns the v-knot vector.
    #[inline(always)]
    pub fn vknot_vec(&self) -> &KnotVec { &self.knot_vecs.1 }

    /// Returns the control net.
    #[inline(always)]
    pub fn control_grid(&self) -> &ControlGrid<Vector4> { &self.control_points }

    /// Returns the control point at `(idx0, idx1)`.
    #[inline(always)]
    pub fn control_point(&self, idx0: usize, idx1: usize) -> &Vector4 {
        &self.control_points[(idx0, idx1)]
    }

    /// Returns the degree in the u-direction.
    #[inline(always)]
    pub fn udegree(&self) -> usize { self.knot_vecs.0.len() - self.control_points.rows() - 1 }

    /// Returns the degree in the v-direction.
    #[inline(always)]
    pub fn vdegree(&self) -> usize { self.knot_vecs.1.len() - self.control_points.cols() - 1 }

    /// Returns the degrees `(u, v)`.
    #[inline(always)]
    pub fn degrees(&self) -> (usize, usize) { (self.udegree(), self.vdegree()) }

    /// The active domain of the surface, one interval per direction.
    #[inline(always)]
    pub fn domain(&self) -> (Interval, Interval) {
        let (pu, pv) = self.degrees();
        (
            Interval::new(
                self.knot_vecs.0[pu],
                self.knot_vecs.0[self.control_points.rows()],
            ),
            Interval::new(
                self.knot_vecs.1[pv],
                self.knot_vecs.1[self.control_points.cols()],
            ),
        )
    }

    /// Swaps the u- and v-parameters.
    pub fn swap_axes(&mut self) -> &mut Self {
        let (uknots, vknots) = self.knot_vecs.clone();
        self.knot_vecs = (vknots, uknots);
        self.control_points = self.control_points.transpose();
        self
    }

    /// Substitutes to the homogeneous surface by row accumulation: for the
    /// v-span window the u-basis collapses each row to a temporary point,
    /// then the v-basis blends the temporaries.
    pub fn homogeneous_point_at(&self, u: f64, v: f64) -> Vector4 {
        let (pu, pv) = self.degrees();
        let (udom, vdom) = self.domain();
        let u = udom.clamp(u);
        let v = vdom.clamp(v);
        let uspan = self.knot_vecs.0.span(pu, u);
        let vspan = self.knot_vecs.1.span(pv, v);
        let ubasis = self.knot_vecs.0.basis_functions(pu, uspan, u);
        let vbasis = self.knot_vecs.1.basis_functions(pv, vspan, v);
        let mut res = Vector4::zero();
        for (l, nv) in vbasis.iter().enumerate() {
            let temp = ubasis
                .iter()
                .enumerate()
                .fold(Vector4::zero(), |sum, (x, nu)| {
                    sum + self.control_points[(uspan - pu + x, vspan - pv + l)] * *nu
                });
            res += temp * *nv;
        }
        res
    }

    /// Substitutes to the surface.
    #[inline(always)]
    pub fn point_at(&self, u: f64, v: f64) -> Point3 { self.homogeneous_point_at(u, v).to_point() }

    /// Returns the grid of homogeneous mixed partials up to `order` in each
    /// direction; entry `[k][l]` is differentiated `k` times by `u` and `l`
    /// times by `v`.
    pub fn homogeneous_derivatives(&self, u: f64, v: f64, order: usize) -> Vec<Vec<Vector4>> {
        let (pu, pv) = self.degrees();
        let (udom, vdom) = self.domain();
        let u = udom.clamp(u);
        let v = vdom.clamp(v);
        let uspan = self.knot_vecs.0.span(pu, u);
        let vspan = self.knot_vecs.1.span(pv, v);
        let uders = self.knot_vecs.0.ders_basis_functions(pu, uspan, u, order);
        let vders = self.knot_vecs.1.ders_basis_functions(pv, vspan, v, order);
        let mut res = vec![vec![Vector4::zero(); order + 1]; order + 1];
        for k in 0..=order {
            for l in 0..=order {
                let mut sum = Vector4::zero();
                for (x, nu) in uders[k].iter().enumerate() {
                    for (y, nv) in vders[l].iter().enumerate() {
                        sum += self.control_points[(uspan - pu + x, vspan - pv + y)] * (nu * nv);
                    }
                }
                res[k][l] = sum;
            }
        }
        res
    }

    /// Returns the mixed partial derivatives of the surface up to `order`
    /// in each direction, recovered from the homogeneous ones by the
    /// bivariate Leibniz rule.
    #[inline(always)]
    pub fn ders(&self, u: f64, v: f64, order: usize) -> Vec<Vec<Vector3>> {
        rat_surface_ders(&self.homogeneous_derivatives(u, v, order))
    }

    /// Returns the derivation by `u`.
    #[inline(always)]
    pub fn u_derivative_at(&self, u: f64, v: f64) -> Vector3 {
        let ders = self.homogeneous_derivatives(u, v, 1);
        ders[0][0].rat_der(ders[1][0])
    }

    /// Returns the derivation by `v`.
    #[inline(always)]
    pub fn v_derivative_at(&self, u: f64, v: f64) -> Vector3 {
        let ders = self.homogeneous_derivatives(u, v, 1);
        ders[0][0].rat_der(ders[0][1])
    }

    /// Returns the mixed `uv`-derivation.
    #[inline(always)]
    pub fn uv_derivative_at(&self, u: f64, v: f64) -> Vector3 {
        let ders = self.homogeneous_derivatives(u, v, 1);
        ders[0][0].rat_cross_der(ders[1][0], ders[0][1], ders[1][1])
    }

    /// Returns the unit normal vector, the zero vector at a degenerate
    /// point.
    pub fn normal(&self, u: f64, v: f64) -> Vector3 {
        let ders = self.homogeneous_derivatives(u, v, 1);
        let uder = ders[0][0].rat_der(ders[1][0]);
        let vder = ders[0][0].rat_der(ders[0][1]);
        let cross = uder.cross(vder);
        match cross.magnitude2().so_small2() {
            true => Vector3::zero(),
            false => cross.normalize(),
        }
    }

    /// Extracts the control curve along `v` at the row `row_idx`.
    pub fn row_curve(&self, row_idx: usize) -> NurbsCurve {
        NurbsCurve::new_unchecked(self.knot_vecs.1.clone(), self.control_points.row(row_idx))
    }

    /// Extracts the control curve along `u` at the column `column_idx`.
    pub fn column_curve(&self, column_idx: usize) -> NurbsCurve {
        NurbsCurve::new_unchecked(self.knot_vecs.0.clone(), self.control_points.column(column_idx))
    }

    /// Adds a u-knot without changing the surface as a map.
    pub fn add_uknot(&mut self, x: f64) -> &mut Self {
        let cols = self.control_points.cols();
        let mut columns = Vec::with_capacity(cols);
        let mut knots = self.knot_vecs.0.clone();
        for j in 0..cols {
            let mut curve =
                NurbsCurve::new_unchecked(self.knot_vecs.0.clone(), self.control_points.column(j));
            curve.add_knot(x);
            knots = curve.knot_vec().clone();
            columns.push(curve.control_points().clone());
        }
        self.knot_vecs.0 = knots;
        self.control_points = ControlGrid::from_columns(columns);
        self
    }

    /// Adds a v-knot without changing the surface as a map.
    pub fn add_vknot(&mut self, x: f64) -> &mut Self {
        let rows = self.control_points.rows();
        let mut new_rows = Vec::with_capacity(rows);
        let mut knots = self.knot_vecs.1.clone();
        for i in 0..rows {
            let mut curve =
                NurbsCurve::new_unchecked(self.knot_vecs.1.clone(), self.control_points.row(i));
            curve.add_knot(x);
            knots = curve.knot_vec().clone();
            new_rows.push(curve.control_points().clone());
        }
        self.knot_vecs.1 = knots;
        self.control_points = ControlGrid::try_from_rows(new_rows).unwrap();
        self
    }

    /// Extracts the isoparametric curve at the fixed parameter `t` in the
    /// given direction: `t` is inserted as a knot up to multiplicity
    /// `degree`, after which a single row or column of the refined net is
    /// the NURBS curve in the opposite direction.
    /// # Examples
    /// ```
    /// use skiff_geometry::{nurbs::surface::*, *};
    /// let surface = NurbsSurface::from_corners(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    ///     Point3::new(1.0, 1.0, 1.0),
    /// );
    /// let iso = surface.isocurve(0.25, SurfaceDirection::U);
    /// const N: usize = 16;
    /// for i in 0..=N {
    ///     let v = i as f64 / N as f64;
    ///     assert_near!(iso.point_at(v), surface.point_at(0.25, v));
    /// }
    /// ```
    pub fn isocurve(&self, t: f64, dir: SurfaceDirection) -> NurbsCurve {
        match dir {
            SurfaceDirection::U => {
                let pu = self.udegree();
                let (udom, _) = self.domain();
                if t.near(&udom.t0) {
                    return self.row_curve(0);
                }
                if t.near(&udom.t1) {
                    return self.row_curve(self.control_points.rows() - 1);
                }
                let mut surface = self.clone();
                let mult = surface.knot_vecs.0.multiplicity_of(t);
                for _ in mult..pu {
                    surface.add_uknot(t);
                }
                let row = surface.knot_vecs.0.span(pu, t) - pu;
                surface.row_curve(row)
            }
            SurfaceDirection::V => {
                let pv = self.vdegree();
                let (_, vdom) = self.domain();
                if t.near(&vdom.t0) {
                    return self.column_curve(0);
                }
                if t.near(&vdom.t1) {
                    return self.column_curve(self.control_points.cols() - 1);
                }
                let mut surface = self.clone();
                let mult = surface.knot_vecs.1.multiplicity_of(t);
                for _ in mult..pv {
                    surface.add_vknot(t);
                }
                let col = surface.knot_vecs.1.span(pv, t) - pv;
                surface.column_curve(col)
            }
        }
    }

    /// Splits the surface at `t` along the given direction. The two halves
    /// are re-normalized to the unit domain.
    /// # Failures
    /// Returns [`Error::OutOfDomain`] when `t` does not lie strictly inside
    /// the domain of that direction.
    pub fn try_split(
        &self,
        t: f64,
        dir: SurfaceDirection,
    ) -> Result<(NurbsSurface, NurbsSurface)> {
        let (udom, vdom) = self.domain();
        let Interval { t0, t1 } = match dir {
            SurfaceDirection::U => udom,
            SurfaceDirection::V => vdom,
        };
        if t <= t0 + TOLERANCE || t1 - TOLERANCE <= t {
            return Err(Error::OutOfDomain(t));
        }
        let (former, latter) = match dir {
            SurfaceDirection::U => {
                let cols = self.control_points.cols();
                let mut former_cols = Vec::with_capacity(cols);
                let mut latter_cols = Vec::with_capacity(cols);
                let mut former_knots = KnotVec::default();
                let mut latter_knots = KnotVec::default();
                for j in 0..cols {
                    let mut former_curve = NurbsCurve::new_unchecked(
                        self.knot_vecs.0.clone(),
                        self.control_points.column(j),
                    );
                    let latter_curve = former_curve.cut(t);
                    former_knots = former_curve.knot_vec().clone();
                    latter_knots = latter_curve.knot_vec().clone();
                    former_cols.push(former_curve.control_points().clone());
                    latter_cols.push(latter_curve.control_points().clone());
                }
                (
                    NurbsSurface::new_unchecked(
                        (former_knots, self.knot_vecs.1.clone()),
                        ControlGrid::from_columns(former_cols),
                    ),
                    NurbsSurface::new_unchecked(
                        (latter_knots, self.knot_vecs.1.clone()),
                        ControlGrid::from_columns(latter_cols),
                    ),
                )
            }
            SurfaceDirection::V => {
                let mut swapped = self.clone();
                swapped.swap_axes();
                let (former, latter) = swapped.try_split(t, SurfaceDirection::U)?;
                let mut former = former;
                let mut latter = latter;
                former.swap_axes();
                latter.swap_axes();
                (former, latter)
            }
        };
        let mut former = former;
        let mut latter = latter;
        former.knot_vecs.0.try_normalize().ok();
        former.knot_vecs.1.try_normalize().ok();
        latter.knot_vecs.0.try_normalize().ok();
        latter.knot_vecs.1.try_normalize().ok();
        Ok((former, latter))
    }

    /// Returns the bounding box including all control points.
    #[inline(always)]
    pub fn roughly_bounding_box(&self) -> BoundingBox<Point3> {
        self.control_points
            .as_slice()
            .iter()
            .map(|cp| cp.to_point())
            .collect()
    }
}

impl Transformable for NurbsSurface {
    #[inline(always)]
    fn transformed(&self, transform: Matrix4) -> Self {
        let mut surface = self.clone();
        surface
            .control_points
            .transform_points(|pt| *pt = transform * *pt);
        surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_surface() -> NurbsSurface {
        // a quarter cylinder: rational in u, polynomial in v
        let w = f64::sqrt(0.5);
        let grid = ControlGrid::try_from_rows(vec![
            vec![
                Vector4::new(1.0, 0.0, 0.0, 1.0),
                Vector4::new(1.0, 0.0, 2.0, 1.0),
            ],
            vec![
                Vector4::new(w, w, 0.0, w),
                Vector4::new(w, w, 2.0 * w, w),
            ],
            vec![
                Vector4::new(0.0, 1.0, 0.0, 1.0),
                Vector4::new(0.0, 1.0, 2.0, 1.0),
            ],
        ])
        .unwrap();
        NurbsSurface::new((KnotVec::bezier_knot(2), KnotVec::bezier_knot(1)), grid)
    }

    #[test]
    fn rough_bounding_box_contains_samples() {
        let surface = example_surface();
        let bdd = surface.roughly_bounding_box();
        for i in 0..=5 {
            for j in 0..=5 {
                let pt = surface.point_at(i as f64 / 5.0, j as f64 / 5.0);
                assert!(bdd.contains(&pt, TOLERANCE));
            }
        }
    }

    #[test]
    fn quarter_cylinder_lies_on_the_cylinder() {
        let surface = example_surface();
        for i in 0..=10 {
            for j in 0..=10 {
                let (u, v) = (i as f64 / 10.0, j as f64 / 10.0);
                let pt = surface.point_at(u, v);
                f64::assert_near2(&Vector2::new(pt.x, pt.y).magnitude(), &1.0);
                f64::assert_near2(&pt.z, &(2.0 * v));
            }
        }
    }

    #[test]
    fn ders_agree_with_finite_differences() {
        let surface = example_surface();
        const EPS: f64 = 1.0e-5;
        for i in 1..10 {
            for j in 1..10 {
                let (u, v) = (i as f64 / 10.0, j as f64 / 10.0);
                let uder = surface.u_derivative_at(u, v);
                let fd = (surface.point_at(u + EPS, v) - surface.point_at(u - EPS, v)) / (2.0 * EPS);
                assert!((uder - fd).magnitude() < 1.0e-4);
                let vder = surface.v_derivative_at(u, v);
                let fd = (surface.point_at(u, v + EPS) - surface.point_at(u, v - EPS)) / (2.0 * EPS);
                assert!((vder - fd).magnitude() < 1.0e-4);
            }
        }
    }

    #[test]
    fn normal_is_radial_on_the_cylinder() {
        let surface = example_surface();
        for i in 0..=8 {
            let u = i as f64 / 8.0;
            let pt = surface.point_at(u, 0.5);
            let normal = surface.normal(u, 0.5);
            let radial = Vector3::new(pt.x, pt.y, 0.0).normalize();
            assert!(normal.cross(radial).magnitude() < 1.0e-9);
        }
    }

    #[test]
    fn isocurves_match_the_surface() {
        let surface = example_surface();
        let iso_u = surface.isocurve(0.3, SurfaceDirection::U);
        let iso_v = surface.isocurve(0.7, SurfaceDirection::V);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert_near!(iso_u.point_at(t), surface.point_at(0.3, t));
            assert_near!(iso_v.point_at(t), surface.point_at(t, 0.7));
        }
    }

    #[test]
    fn split_covers_the_surface() {
        let surface = example_surface();
        let (former, latter) = surface.try_split(0.4, SurfaceDirection::U).unwrap();
        for i in 0..=5 {
            for j in 0..=5 {
                let (s, v) = (i as f64 / 5.0, j as f64 / 5.0);
                // the halves are re-normalized to the unit domain
                assert_near!(former.point_at(s, v), surface.point_at(0.4 * s, v));
                assert_near!(latter.point_at(s, v), surface.point_at(0.4 + 0.6 * s, v));
            }
        }
        assert!(surface.try_split(1.2, SurfaceDirection::V).is_err());
    }

    #[test]
    fn swap_axes_transposes_evaluation() {
        let surface = example_surface();
        let mut swapped = surface.clone();
        swapped.swap_axes();
        for i in 0..=5 {
            for j in 0..=5 {
                let (u, v) = (i as f64 / 5.0, j as f64 / 5.0);
                assert_near!(swapped.point_at(v, u), surface.point_at(u, v));
            }
        }
    }
}
