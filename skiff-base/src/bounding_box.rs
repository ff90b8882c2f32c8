use cgmath::*;
use serde::*;
use std::ops::Index;

/// axis-aligned bounding box
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct BoundingBox<V>(V, V);

/// The trait for the corner types of a bounding box
pub trait Bounded<S>: Sized {
    /// the result of subtraction
    type Vector;
    #[doc(hidden)]
    const DIM: usize;
    #[doc(hidden)]
    fn infinity() -> Self;
    #[doc(hidden)]
    fn neg_infinity() -> Self;
    #[doc(hidden)]
    fn max(&self, other: &Self) -> Self;
    #[doc(hidden)]
    fn min(&self, other: &Self) -> Self;
    #[doc(hidden)]
    fn max_component(one: Self::Vector) -> S;
    #[doc(hidden)]
    fn diagonal(self, other: Self) -> Self::Vector;
    #[doc(hidden)]
    fn mid(self, other: Self) -> Self;
}

macro_rules! pr2 {
    ($a: expr, $b: expr) => {
        $b
    };
}
macro_rules! impl_bounded {
        ($typename: ident, $vectortype: ident, $dim: expr, $($num: expr),*) => {
            impl<S: BaseFloat> Bounded<S> for $typename<S> {
                type Vector = $vectortype<S>;
                const DIM: usize = $dim;
                fn infinity() -> $typename<S> {
                    $typename::new($(pr2!($num, S::infinity())),*)
                }
                fn neg_infinity() -> $typename<S> {
                    $typename::new($(pr2!($num, S::neg_infinity())),*)
                }
                fn max(&self, other: &Self) -> Self {
                    $typename::new(
                        $(
                            if self[$num] < other[$num] {
                                other[$num]
                            } else {
                                self[$num]
                            }
                        ),*
                    )
                }
                fn min(&self, other: &Self) -> Self {
                    $typename::new(
                        $(
                            if self[$num] > other[$num] {
                                other[$num]
                            } else {
                                self[$num]
                            }
                        ),*
                    )
                }
                fn max_component(one: Self::Vector) -> S {
                    let mut max = S::neg_infinity();
                    $(if max < one[$num] { max = one[$num] })*
                    max
                }
                fn diagonal(self, other: Self) -> Self::Vector { self - other }
                fn mid(self, other: Self) -> Self {
                    self + (other - self) / (S::one() + S::one())
                }
            }
        };
    }
impl_bounded!(Vector2, Vector2, 2, 0, 1);
impl_bounded!(Point2, Vector2, 2, 0, 1);
impl_bounded!(Vector3, Vector3, 3, 0, 1, 2);
impl_bounded!(Point3, Vector3, 3, 0, 1, 2);

impl<F, V> Default for BoundingBox<V>
where
    F: BaseFloat,
    V: MetricSpace<Metric = F> + Index<usize, Output = F> + Bounded<F> + Copy,
{
    #[inline(always)]
    fn default() -> Self { BoundingBox(V::infinity(), V::neg_infinity()) }
}

impl<F, V> BoundingBox<V>
where
    F: BaseFloat,
    V: MetricSpace<Metric = F> + Index<usize, Output = F> + Bounded<F> + Copy,
{
    /// Creates an empty bounding box.
    #[inline(always)]
    pub fn new() -> Self { Self::default() }

    /// Adds a point to the bounding box.
    /// # Examples
    /// ```
    /// use skiff_base::{cgmath64::*, bounding_box::*};
    /// let mut bdd_box = BoundingBox::new();
    /// bdd_box.push(&Point3::new(-1.0, 1.0, 0.0));
    /// bdd_box.push(&Point3::new(1.0, -1.0, 2.0));
    /// assert_eq!(bdd_box.min(), &Point3::new(-1.0, -1.0, 0.0));
    /// assert_eq!(bdd_box.max(), &Point3::new(1.0, 1.0, 2.0));
    /// ```
    /// # Remarks
    /// If the added point has a NAN component, then the point is not added.
    #[inline(always)]
    pub fn push(&mut self, point: &V) {
        self.0 = self.0.min(point);
        self.1 = self.1.max(point);
    }

    /// Returns whether the bounding box is empty or not.
    #[inline(always)]
    pub fn is_empty(&self) -> bool { self.0[0] > self.1[0] }

    /// Returns the reference to the maximal corner. If the bounding box is
    /// empty, the corner consists of `NEG_INFINITY` components.
    #[inline(always)]
    pub fn max(&self) -> &V { &self.1 }

    /// Returns the reference to the minimal corner. If the bounding box is
    /// empty, the corner consists of `INFINITY` components.
    #[inline(always)]
    pub fn min(&self) -> &V { &self.0 }

    /// Returns the diagonal vector.
    #[inline(always)]
    pub fn diagonal(&self) -> V::Vector { self.1.diagonal(self.0) }

    /// Returns the diameter of the bounding box, `NEG_INFINITY` when empty.
    #[inline(always)]
    pub fn diameter(&self) -> F {
        if self.is_empty() {
            F::neg_infinity()
        } else {
            self.0.distance(self.1)
        }
    }

    /// Returns the maximum length of the edges of the bounding box.
    #[inline(always)]
    pub fn size(&self) -> F { V::max_component(self.diagonal()) }

    /// Returns the center of the bounding box.
    #[inline(always)]
    pub fn center(&self) -> V { self.0.mid(self.1) }

    /// Returns whether `point` lies inside the bounding box, within `margin`
    /// on every axis.
    pub fn contains(&self, point: &V, margin: F) -> bool {
        (0..V::DIM)
            .all(|i| self.0[i] - margin <= point[i] && point[i] <= self.1[i] + margin)
    }

    /// Returns whether `self` and `other` have no overlap, with the boxes
    /// inflated by `margin` on every axis.
    /// # Examples
    /// ```
    /// use skiff_base::{cgmath64::*, bounding_box::*};
    /// let bdd_box0: BoundingBox<Point3> =
    ///     [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)].iter().collect();
    /// let bdd_box1: BoundingBox<Point3> =
    ///     [Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0)].iter().collect();
    /// assert!(bdd_box0.is_disjoint(&bdd_box1, 0.0));
    /// assert!(!bdd_box0.is_disjoint(&bdd_box1, 2.0));
    /// ```
    pub fn is_disjoint(&self, other: &Self, margin: F) -> bool {
        (0..V::DIM)
            .any(|i| self.1[i] + margin < other.0[i] || other.1[i] + margin < self.0[i])
    }
}

impl<'a, F, V> FromIterator<&'a V> for BoundingBox<V>
where
    F: BaseFloat,
    V: MetricSpace<Metric = F> + Copy + Index<usize, Output = F> + Bounded<F>,
{
    fn from_iter<I: IntoIterator<Item = &'a V>>(iter: I) -> BoundingBox<V> {
        let mut bdd_box = BoundingBox::new();
        let bdd_box_mut = &mut bdd_box;
        iter.into_iter().for_each(move |pt| bdd_box_mut.push(pt));
        bdd_box
    }
}

impl<F, V> FromIterator<V> for BoundingBox<V>
where
    F: BaseFloat,
    V: MetricSpace<Metric = F> + Copy + Index<usize, Output = F> + Bounded<F>,
{
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> BoundingBox<V> {
        let mut bdd_box = BoundingBox::new();
        let bdd_box_mut = &mut bdd_box;
        iter.into_iter().for_each(move |pt| bdd_box_mut.push(&pt));
        bdd_box
    }
}

impl<F, V> std::ops::AddAssign<&BoundingBox<V>> for BoundingBox<V>
where
    F: BaseFloat,
    V: MetricSpace<Metric = F> + Copy + Index<usize, Output = F> + Bounded<F>,
{
    /// Puts the points in `other` into `self`.
    #[inline(always)]
    fn add_assign(&mut self, other: &BoundingBox<V>) {
        self.0 = self.0.min(&other.0);
        self.1 = self.1.max(&other.1);
    }
}

impl<F, V> std::ops::AddAssign<BoundingBox<V>> for BoundingBox<V>
where
    F: BaseFloat,
    V: MetricSpace<Metric = F> + Copy + Index<usize, Output = F> + Bounded<F>,
{
    #[inline(always)]
    fn add_assign(&mut self, other: BoundingBox<V>) { *self += &other; }
}

impl<F, V> std::ops::Add<&BoundingBox<V>> for BoundingBox<V>
where
    F: BaseFloat,
    V: MetricSpace<Metric = F> + Copy + Index<usize, Output = F> + Bounded<F>,
{
    type Output = BoundingBox<V>;
    /// Returns the smallest box containing both operands.
    #[inline(always)]
    fn add(mut self, other: &BoundingBox<V>) -> BoundingBox<V> {
        self += other;
        self
    }
}
