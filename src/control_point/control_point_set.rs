use nalgebra::Point2;

use crate::{domain::Domain, misc::FloatingPoint};

use super::ControlPoint;

/// Why a pending control point was dropped on release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The release position is outside the domain
    OutOfDomain,
    /// The release position equals the press position
    Degenerate,
}

/// Result of finishing a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Committed,
    Discarded(DiscardReason),
    /// There was no pending point to finish
    Ignored,
}

/// Ordered collection of control points fed by pointer press/release events.
#[derive(Clone, Debug)]
pub struct ControlPointSet<T: FloatingPoint> {
    points: Vec<ControlPoint<T>>,
}

impl<T: FloatingPoint> ControlPointSet<T> {
    pub fn new() -> Self {
        Self { points: vec![] }
    }

    /// Start dragging a new control point at `position`.
    pub fn press(&mut self, position: Point2<T>) {
        self.points.push(ControlPoint::new(position));
    }

    /// Finish the pending drag at `position`.
    ///
    /// The pending point is discarded when `position` leaves the domain
    /// or when it did not move.
    /// # Example
    /// ```
    /// use gridwarp::prelude::*;
    /// use nalgebra::Point2;
    ///
    /// let domain = Domain::try_new(-0.95, 0.95, 20).unwrap();
    /// let mut points = ControlPointSet::new();
    ///
    /// points.press(Point2::new(0.0, 0.0));
    /// assert_eq!(points.release(Point2::new(0.2, 0.1), &domain), ReleaseOutcome::Committed);
    ///
    /// points.press(Point2::new(0.5, 0.5));
    /// assert_eq!(
    ///     points.release(Point2::new(0.99, 0.5), &domain),
    ///     ReleaseOutcome::Discarded(DiscardReason::OutOfDomain)
    /// );
    /// assert_eq!(points.len(), 1);
    /// ```
    pub fn release(&mut self, position: Point2<T>, domain: &Domain<T>) -> ReleaseOutcome {
        let pending = match self.points.last() {
            Some(last) if !last.is_committed() => last,
            _ => return ReleaseOutcome::Ignored,
        };

        let reason = if !domain.contains(&position) {
            Some(DiscardReason::OutOfDomain)
        } else if *pending.begin() == position {
            Some(DiscardReason::Degenerate)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                self.points.pop();
                log::warn!("Discarding control point: {:?}", reason);
                ReleaseOutcome::Discarded(reason)
            }
            None => match self.points.last_mut().map(|last| last.commit(position)) {
                Some(Ok(())) => ReleaseOutcome::Committed,
                _ => ReleaseOutcome::Ignored,
            },
        }
    }

    /// Iterate over the committed points only
    pub fn committed(&self) -> impl Iterator<Item = &ControlPoint<T>> {
        self.points.iter().filter(|p| p.is_committed())
    }

    pub fn push(&mut self, point: ControlPoint<T>) {
        self.points.push(point);
    }

    pub fn pop(&mut self) -> Option<ControlPoint<T>> {
        self.points.pop()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[ControlPoint<T>] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ControlPoint<T>> {
        self.points.iter()
    }
}

impl<T: FloatingPoint> Default for ControlPointSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FloatingPoint> FromIterator<ControlPoint<T>> for ControlPointSet<T> {
    fn from_iter<I: IntoIterator<Item = ControlPoint<T>>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Convert a pointer position in window pixels into normalized device
/// coordinates in `[-1, 1]`, with y pointing up.
pub fn window_to_domain<T: FloatingPoint>(x: T, y: T, width: T, height: T) -> Point2<T> {
    let two = T::constant(2.0);
    Point2::new(x / width * two - T::one(), T::one() - y / height * two)
}
