//! Basic structs and traits for the skiff geometry kernel: f64-specialized
//! cgmath types, tolerance discipline, homogeneous coordinates, bounding
//! boxes, a small Newton solver, and the process-wide numeric tables.

#![warn(
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

/// bounding box
pub mod bounding_box;
/// re-export cgmath with f64 type aliases
pub mod cgmath64;
/// rational derivative recovery of arbitrary order
pub mod ders;
/// the curve evaluation contract and the reversal/transform capabilities
pub mod geom_traits;
/// homogeneous coordinates
pub mod homogeneous;
/// closed parameter intervals
pub mod interval;
/// Newton's method with iteration caps
pub mod newton;
/// process-wide read-only tables: binomial coefficients, Gauss-Legendre nodes
pub mod tables;
/// tolerance constants, traits and assertion macros
pub mod tolerance;
