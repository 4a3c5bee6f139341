use nalgebra::{convert, Point2, Vector2};
use simba::scalar::SupersetOf;

use crate::{
    error::{WarpError, WarpResult},
    misc::FloatingPoint,
};


/// Square warp domain `[min, max] x [min, max]` subdivided into
/// `resolution x resolution` cells.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Domain<T> {
    min: T,
    max: T,
    resolution: usize,
}

impl<T: FloatingPoint> Domain<T> {
    /// Create a domain, validating `min < max` and `resolution >= 1`
    /// # Example
    /// ```
    /// use gridwarp::prelude::*;
    ///
    /// let domain = Domain::try_new(-1.0, 1.0, 4).unwrap();
    /// assert_eq!(domain.vertex_count(), 25);
    /// assert_eq!(domain.step(), 0.5);
    ///
    /// assert!(Domain::try_new(1.0, -1.0, 4).is_err());
    /// assert!(Domain::try_new(-1.0, 1.0, 0).is_err());
    /// ```
    pub fn try_new(min: T, max: T, resolution: usize) -> WarpResult<Self> {
        let valid = min.is_finite() && max.is_finite() && min < max && resolution >= 1;
        if !valid {
            return Err(WarpError::InvalidDomain {
                min: min.to_f64().unwrap_or(f64::NAN),
                max: max.to_f64().unwrap_or(f64::NAN),
                resolution,
            });
        }
        Ok(Self {
            min,
            max,
            resolution,
        })
    }

    pub fn min(&self) -> T {
        self.min
    }

    pub fn max(&self) -> T {
        self.max
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Side length of the domain
    pub fn extent(&self) -> T {
        self.max - self.min
    }

    /// Distance between two neighbouring grid vertices
    pub fn step(&self) -> T {
        self.extent() / T::from_usize(self.resolution).unwrap()
    }

    pub fn cell_count(&self) -> usize {
        self.resolution * self.resolution
    }

    /// Number of vertices of the regular grid, `(resolution + 1)^2`
    pub fn vertex_count(&self) -> usize {
        (self.resolution + 1) * (self.resolution + 1)
    }

    /// Check if the point lies inside the closed domain.
    pub fn contains(&self, point: &Point2<T>) -> bool {
        let inside = |v: T| self.min <= v && v <= self.max;
        inside(point.x) && inside(point.y)
    }

    /// Fail with `OutOfDomain` when the point lies outside the domain.
    pub fn ensure_contains(&self, point: &Point2<T>) -> WarpResult<()> {
        if self.contains(point) {
            Ok(())
        } else {
            Err(WarpError::OutOfDomain {
                x: point.x.to_f64().unwrap_or(f64::NAN),
                y: point.y.to_f64().unwrap_or(f64::NAN),
            })
        }
    }

    /// Base position of the grid vertex at (`row`, `col`).
    /// Rows run along y, columns along x.
    pub fn vertex(&self, row: usize, col: usize) -> Point2<T> {
        let step = self.step();
        Point2::new(
            self.min + step * T::from_usize(col).unwrap(),
            self.min + step * T::from_usize(row).unwrap(),
        )
    }

    /// Map a domain point into the unit square.
    pub fn to_unit(&self, point: &Point2<T>) -> Vector2<T> {
        let extent = self.extent();
        Vector2::new(
            (point.x - self.min) / extent,
            (point.y - self.min) / extent,
        )
    }

    /// Map a unit square coordinate back into the domain.
    pub fn from_unit(&self, uv: &Vector2<T>) -> Point2<T> {
        let extent = self.extent();
        Point2::new(self.min + uv.x * extent, self.min + uv.y * extent)
    }

    /// Cast the domain to another floating point type.
    pub fn cast<F: FloatingPoint + SupersetOf<T>>(&self) -> Domain<F> {
        Domain {
            min: convert(self.min),
            max: convert(self.max),
            resolution: self.resolution,
        }
    }
}

impl<T: FloatingPoint> Default for Domain<T> {
    fn default() -> Self {
        Self {
            min: T::constant(-0.95),
            max: T::constant(0.95),
            resolution: 50,
        }
    }
}
