use std::fmt;

use nalgebra::{Point2, Vector2};
use simba::scalar::SupersetOf;

use crate::{
    error::{WarpError, WarpResult},
    misc::FloatingPoint,
};

/// A user specified correspondence between a source position (`begin`)
/// and a target position (`end`).
///
/// A point is created pending with only `begin` set, and becomes committed
/// once its `end` is set. Solvers only consume committed points.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlPoint<T: FloatingPoint> {
    begin: Point2<T>,
    end: Option<Point2<T>>,
}

impl<T: FloatingPoint> ControlPoint<T> {
    /// Create a pending control point at `begin`
    pub fn new(begin: Point2<T>) -> Self {
        Self { begin, end: None }
    }

    /// Create a committed control point moving `begin` to `end`
    /// # Example
    /// ```
    /// use gridwarp::prelude::*;
    /// use nalgebra::{Point2, Vector2};
    ///
    /// let cp = ControlPoint::committed(Point2::new(0.0, 0.0), Point2::new(0.5, 0.0));
    /// assert!(cp.is_committed());
    /// assert_eq!(cp.displacement(), Some(Vector2::new(0.5, 0.0)));
    /// ```
    pub fn committed(begin: Point2<T>, end: Point2<T>) -> Self {
        Self {
            begin,
            end: Some(end),
        }
    }

    /// Set the end position. It can only be set once.
    pub fn commit(&mut self, end: Point2<T>) -> WarpResult<()> {
        if self.end.is_some() {
            return Err(WarpError::AlreadyCommitted);
        }
        self.end = Some(end);
        Ok(())
    }

    pub fn begin(&self) -> &Point2<T> {
        &self.begin
    }

    pub fn end(&self) -> Option<&Point2<T>> {
        self.end.as_ref()
    }

    pub fn is_committed(&self) -> bool {
        self.end.is_some()
    }

    /// Requested displacement `end - begin`, `None` while pending
    pub fn displacement(&self) -> Option<Vector2<T>> {
        self.end.map(|end| end - self.begin)
    }

    /// Requested displacement, failing for pending points
    pub fn try_displacement(&self) -> WarpResult<Vector2<T>> {
        self.displacement()
            .ok_or(WarpError::UncommittedControlPoint)
    }

    /// Whether `begin == end`, which makes the point a no-op for every solver
    pub fn is_degenerate(&self) -> bool {
        self.end.is_some_and(|end| end == self.begin)
    }

    /// Cast the control point to another floating point type.
    pub fn cast<F: FloatingPoint + SupersetOf<T>>(&self) -> ControlPoint<F> {
        ControlPoint {
            begin: self.begin.cast(),
            end: self.end.map(|end| end.cast()),
        }
    }
}

impl<T: FloatingPoint + fmt::Display> fmt::Display for ControlPoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.begin;
        match &self.end {
            Some(e) => write!(f, "{:6.3},{:6.3} - {:6.3},{:6.3}", b.x, b.y, e.x, e.y),
            None => write!(f, "{:6.3},{:6.3} - pending", b.x, b.y),
        }
    }
}
