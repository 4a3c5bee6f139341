//! Free-form deformation over a uniform cubic B-spline knot lattice.

use itertools::iproduct;
use nalgebra::{Point2, Vector2};

use crate::{
    basis::{cubic_bspline_basis, tensor_basis},
    control_point::ControlPoint,
    domain::Domain,
    error::{WarpError, WarpResult},
    misc::FloatingPoint,
};

use super::{WarpField, WarpSolver};

/// Default number of knot intervals across the domain
pub const DEFAULT_KNOT_COUNT: usize = 8;

/// Position of a domain point inside the lattice.
///
/// `i` and `j` are 1-based cell indices (offset by the padding knot) along x and y,
/// `s` and `t` the fractional offsets inside the cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Embedding<T> {
    pub i: usize,
    pub j: usize,
    pub s: T,
    pub t: T,
}

/// Knot lattice of `(K + 3) x (K + 3)` displacement vectors covering the domain
/// with one padding knot on each side.
///
/// Knot `(a, b)` sits at `(min + (a - 1) * step, min + (b - 1) * step)`.
/// Each knot stores the weighted mean of the contributions of every control
/// point touching it, using the squared tensor basis weights.
#[derive(Clone, Debug)]
pub struct Lattice<T: FloatingPoint> {
    domain: Domain<T>,
    knot_count: usize,
    knots: Vec<Vector2<T>>,
    numerators: Vec<Vector2<T>>,
    denominators: Vec<T>,
}

impl<T: FloatingPoint> Lattice<T> {
    /// Create a zero lattice with `knot_count` intervals over the domain bounds
    pub fn new(domain: Domain<T>, knot_count: usize) -> WarpResult<Self> {
        if knot_count == 0 {
            return Err(WarpError::InvalidKnotCount);
        }
        let side = knot_count + 3;
        Ok(Self {
            domain,
            knot_count,
            knots: vec![Vector2::zeros(); side * side],
            numerators: vec![Vector2::zeros(); side * side],
            denominators: vec![T::zero(); side * side],
        })
    }

    pub fn domain(&self) -> &Domain<T> {
        &self.domain
    }

    pub fn knot_count(&self) -> usize {
        self.knot_count
    }

    /// Number of knots along one axis, `K + 3`
    pub fn side(&self) -> usize {
        self.knot_count + 3
    }

    /// Distance between two knots
    pub fn knot_step(&self) -> T {
        self.domain.extent() / T::from_usize(self.knot_count).unwrap()
    }

    /// Displacement stored at knot (`i`, `j`)
    pub fn knot(&self, i: usize, j: usize) -> &Vector2<T> {
        &self.knots[self.index(i, j)]
    }

    pub fn knots(&self) -> &[Vector2<T>] {
        &self.knots
    }

    /// Zero every knot
    pub fn reset(&mut self) {
        self.knots.fill(Vector2::zeros());
        self.numerators.fill(Vector2::zeros());
        self.denominators.fill(T::zero());
    }

    fn index(&self, i: usize, j: usize) -> usize {
        i * self.side() + j
    }

    /// Map a domain point to its lattice cell and fractional offsets.
    ///
    /// The upper domain edge is folded into the last cell with an offset of one,
    /// so neighbour indices always stay within `[0, K + 2]`.
    /// # Example
    /// ```
    /// use gridwarp::prelude::*;
    /// use nalgebra::Point2;
    ///
    /// let domain = Domain::try_new(-1.0, 1.0, 4).unwrap();
    /// let lattice = Lattice::new(domain, 4).unwrap();
    ///
    /// let e = lattice.embedding(&Point2::new(0.25, -1.0)).unwrap();
    /// assert_eq!((e.i, e.j), (3, 1));
    /// assert_eq!((e.s, e.t), (0.5, 0.0));
    ///
    /// let e = lattice.embedding(&Point2::new(1.0, 1.0)).unwrap();
    /// assert_eq!((e.i, e.j), (4, 4));
    /// assert_eq!((e.s, e.t), (1.0, 1.0));
    ///
    /// assert!(lattice.embedding(&Point2::new(1.5, 0.0)).is_err());
    /// ```
    pub fn embedding(&self, point: &Point2<T>) -> WarpResult<Embedding<T>> {
        self.domain.ensure_contains(point)?;

        let step = self.knot_step();
        let last = self.knot_count - 1;
        let axis = |v: T| {
            let u = (v - self.domain.min()) / step;
            let cell = u.floor().to_usize().unwrap_or(0).min(last);
            let s = (u - T::from_usize(cell).unwrap()).clamp(T::zero(), T::one());
            (cell + 1, s)
        };

        let (i, s) = axis(point.x);
        let (j, t) = axis(point.y);
        Ok(Embedding { i, j, s, t })
    }

    /// Blend the displacement of a committed control point into the 16 knots
    /// around its source position.
    ///
    /// A single point alone is reproduced exactly at its own location.
    /// Points with `begin == end` leave the lattice untouched.
    pub fn accumulate(&mut self, control_point: &ControlPoint<T>) -> WarpResult<()> {
        let displacement = control_point.try_displacement()?;
        if let Some(end) = control_point.end() {
            self.domain.ensure_contains(end)?;
        }
        let e = self.embedding(control_point.begin())?;

        if control_point.is_degenerate() {
            return Ok(());
        }

        let w = tensor_basis(&cubic_bspline_basis(e.s), &cubic_bspline_basis(e.t));
        let sum_sq = w
            .iter()
            .flatten()
            .fold(T::zero(), |acc, wkl| acc + *wkl * *wkl);

        log::trace!(
            "accumulate control point into cell ({}, {}), sum of squared weights {:?}",
            e.i,
            e.j,
            sum_sq
        );

        for (k, l) in iproduct!(0..4, 0..4) {
            let wkl = w[k][l];
            let w2 = wkl * wkl;
            if w2 <= T::zero() {
                continue;
            }
            let phi = displacement * (wkl / sum_sq);
            let idx = self.index(e.i + k - 1, e.j + l - 1);
            self.numerators[idx] += phi * w2;
            self.denominators[idx] += w2;
            self.knots[idx] = self.numerators[idx] / self.denominators[idx];
        }

        Ok(())
    }
}

impl<T: FloatingPoint> WarpField<T> for Lattice<T> {
    /// Tensor product B-spline blend of the 4x4 knots around the point.
    /// Points outside the domain are not displaced.
    fn evaluate(&self, point: &Point2<T>) -> Point2<T> {
        let Ok(e) = self.embedding(point) else {
            return *point;
        };

        let bs = cubic_bspline_basis(e.s);
        let bt = cubic_bspline_basis(e.t);

        let mut offset = Vector2::zeros();
        for l in 0..4 {
            // sample the x isoline
            let mut temp = Vector2::zeros();
            for k in 0..4 {
                temp += self.knot(e.i + k - 1, e.j + l - 1) * bs[k];
            }
            offset += temp * bt[l];
        }

        point + offset
    }
}

/// Free-form deformation solver
#[derive(Clone, Debug)]
pub struct LatticeSolver<T: FloatingPoint> {
    domain: Domain<T>,
    knot_count: usize,
}

impl<T: FloatingPoint> LatticeSolver<T> {
    pub fn new(domain: Domain<T>, knot_count: usize) -> WarpResult<Self> {
        if knot_count == 0 {
            return Err(WarpError::InvalidKnotCount);
        }
        Ok(Self { domain, knot_count })
    }

    pub fn domain(&self) -> &Domain<T> {
        &self.domain
    }

    pub fn knot_count(&self) -> usize {
        self.knot_count
    }
}

impl<T: FloatingPoint> WarpSolver<T> for LatticeSolver<T> {
    type Field = Lattice<T>;

    /// Accumulate every committed control point into a fresh lattice
    /// # Example
    /// ```
    /// use gridwarp::prelude::*;
    /// use nalgebra::Point2;
    /// use approx::assert_relative_eq;
    ///
    /// let domain = Domain::try_new(-1.0, 1.0, 4).unwrap();
    /// let solver = LatticeSolver::new(domain, 8).unwrap();
    /// let cps = vec![ControlPoint::committed(Point2::new(0.1, 0.2), Point2::new(0.3, 0.1))];
    ///
    /// let lattice = solver.solve(&cps).unwrap();
    /// assert_relative_eq!(lattice.evaluate(&Point2::new(0.1, 0.2)), Point2::new(0.3, 0.1), epsilon = 1e-12);
    /// ```
    fn solve(&self, control_points: &[ControlPoint<T>]) -> WarpResult<Self::Field> {
        let mut lattice = Lattice::new(self.domain, self.knot_count)?;
        let mut count = 0;
        for cp in control_points.iter().filter(|cp| cp.is_committed()) {
            lattice.accumulate(cp)?;
            count += 1;
        }
        log::debug!(
            "accumulated {} control points into a {}x{} lattice",
            count,
            lattice.side(),
            lattice.side()
        );
        Ok(lattice)
    }
}
