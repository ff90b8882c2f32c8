use thiserror::Error;

/// Error handler for [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Geometrical errors
///
/// A single taxonomy shared by every fallible constructor and iterative
/// algorithm of the crate. Intersections with no solution return an empty
/// collection instead of an error; evaluators clamp parameters into the
/// active domain instead of failing.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    /// The degree must be at least one and leave room for the control
    /// points: `1 <= degree <= num_ctrl - 1`.
    /// # Examples
    /// ```
    /// use skiff_geometry::{errors::Error, *};
    /// let knot_vec = KnotVec::bezier_knot(3);
    /// let ctrl_pts = vec![Vector4::unit_w(), Vector4::unit_w()];
    /// assert_eq!(
    ///     NurbsCurve::try_new(knot_vec, ctrl_pts),
    ///     Err(Error::InvalidDegree { degree: 5, num_ctrl: 2 }),
    /// );
    /// ```
    #[error("The degree {degree} cannot be represented by {num_ctrl} control points.")]
    InvalidDegree {
        /// the offending degree
        degree: usize,
        /// the number of control points supplied
        num_ctrl: usize,
    },
    /// The knot vector violates the length, ordering, clamping, or
    /// multiplicity rules.
    /// # Examples
    /// ```
    /// use skiff_geometry::{errors::Error, *};
    /// assert_eq!(
    ///     KnotVec::try_from(vec![1.0, 0.0, 2.0, 3.0]),
    ///     Err(Error::InvalidKnotVector),
    /// );
    /// ```
    #[error("This knot vector violates the length, ordering, or multiplicity rules.")]
    InvalidKnotVector,
    /// Fewer points than the construction requires: two for a line or a
    /// polyline, three for a polygon or an arc, `degree + 1` for a curve.
    #[error("{found} points were supplied where at least {required} are required.")]
    InvalidPointCount {
        /// the minimum number of points for the construction
        required: usize,
        /// the number of points supplied
        found: usize,
    },
    /// The polygon vertices deviate from their fitted plane by more than
    /// the coarse tolerance.
    #[error("The points do not lie on a common plane.")]
    NonPlanar,
    /// Three points given for an arc or a plane are collinear.
    #[error("The given points are collinear.")]
    Collinear,
    /// The parameter lies outside the active domain of an operation that
    /// does not clamp.
    #[error("The parameter {0} lies outside the active domain.")]
    OutOfDomain(f64),
    /// The endpoints of the curves to be joined do not match.
    #[error("The curves are not adjacent at their endpoints.")]
    NotAdjacent,
    /// A Newton or bisection iteration exceeded its cap before converging.
    #[error("The iteration exceeded its cap before converging.")]
    UnconvergedIteration,
    /// The intersection has no unique solution.
    #[error("The entities are parallel; the intersection has no unique solution.")]
    ParallelConfiguration,
}
