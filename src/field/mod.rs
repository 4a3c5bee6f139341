pub mod lattice;
pub mod radial;
pub use lattice::*;
pub use radial::*;

use nalgebra::{Point2, Vector2};

use crate::{control_point::ControlPoint, error::WarpResult, misc::FloatingPoint};

#[cfg(test)]
mod tests;

/// A displacement field over the warp domain
pub trait WarpField<T: FloatingPoint> {
    /// Displaced position of `point`
    fn evaluate(&self, point: &Point2<T>) -> Point2<T>;

    /// Displacement at `point`, `evaluate(point) - point`
    fn displacement(&self, point: &Point2<T>) -> Vector2<T> {
        self.evaluate(point) - point
    }
}

/// A strategy computing a warp field from control points.
///
/// Only committed control points are consumed; pending ones are skipped.
pub trait WarpSolver<T: FloatingPoint> {
    type Field: WarpField<T>;

    /// Solve the field interpolating the requested displacements
    fn solve(&self, control_points: &[ControlPoint<T>]) -> WarpResult<Self::Field>;
}

/// The no-op field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdentityField;

impl<T: FloatingPoint> WarpField<T> for IdentityField {
    fn evaluate(&self, point: &Point2<T>) -> Point2<T> {
        *point
    }
}

impl<T: FloatingPoint, F: WarpField<T> + ?Sized> WarpField<T> for Box<F> {
    fn evaluate(&self, point: &Point2<T>) -> Point2<T> {
        self.as_ref().evaluate(point)
    }
}
