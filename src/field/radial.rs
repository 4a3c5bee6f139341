use nalgebra::{DMatrix, DVector, Point2, Vector2};

use crate::{
    basis::RadialKernel,
    control_point::ControlPoint,
    error::{WarpError, WarpResult},
    misc::FloatingPoint,
};

use super::{WarpField, WarpSolver};

/// Symmetric kernel matrix `A[i][j] = entry(centres[i], centres[j])`.
///
/// Only the upper triangle is evaluated and mirrored, so the matrix is exactly symmetric.
/// # Example
/// ```
/// use gridwarp::prelude::*;
/// use nalgebra::Point2;
///
/// let centres = vec![Point2::new(0.0, 0.0), Point2::new(0.5, 0.0), Point2::new(0.0, -0.3)];
/// let a = kernel_matrix(&RadialKernel::ThinPlate, &centres);
/// assert_eq!(a.nrows(), 3);
/// assert_eq!(a, a.transpose());
/// // (1 - 0.5^2)^2 / 2
/// assert_eq!(a[(1, 1)], 0.28125);
/// ```
pub fn kernel_matrix<T: FloatingPoint>(
    kernel: &RadialKernel<T>,
    centres: &[Point2<T>],
) -> DMatrix<T> {
    let n = centres.len();
    let mut a = DMatrix::<T>::zeros(n, n);
    for i in 0..n {
        a[(i, i)] = kernel.entry(&centres[i], &centres[i]);
        for j in (i + 1)..n {
            let v = kernel.entry(&centres[i], &centres[j]);
            a[(i, j)] = v;
            a[(j, i)] = v;
        }
    }
    a
}

/// Smallest over largest absolute pivot of an upper triangular factor
fn pivot_ratio<T: FloatingPoint>(u: &DMatrix<T>) -> T {
    let diagonal = u.diagonal();
    let mut pivots = diagonal.iter().map(|v| v.abs());
    let Some(first) = pivots.next() else {
        return T::zero();
    };
    let (lo, hi) = pivots.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if hi > T::zero() {
        lo / hi
    } else {
        T::zero()
    }
}

/// Radial basis / thin-plate spline solver.
///
/// Solves `A w = d` per axis where `A` is the kernel matrix of the
/// committed control point sources and `d` their displacements.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RadialSolver<T> {
    kernel: RadialKernel<T>,
    /// Minimum accepted ratio between the smallest and the largest LU pivot
    singular_tolerance: T,
}

impl<T: FloatingPoint> RadialSolver<T> {
    pub fn new(kernel: RadialKernel<T>) -> Self {
        Self {
            kernel,
            singular_tolerance: default_singular_tolerance(),
        }
    }

    pub fn with_singular_tolerance(mut self, tolerance: T) -> Self {
        self.singular_tolerance = tolerance;
        self
    }

    pub fn kernel(&self) -> &RadialKernel<T> {
        &self.kernel
    }

    pub fn singular_tolerance(&self) -> T {
        self.singular_tolerance
    }
}

impl<T: FloatingPoint> Default for RadialSolver<T> {
    fn default() -> Self {
        Self::new(RadialKernel::default())
    }
}

/// Default pivot ratio below which the kernel matrix is treated as singular
pub fn default_singular_tolerance<T: FloatingPoint>() -> T {
    T::default_epsilon() * T::constant(1e3)
}

impl<T: FloatingPoint> WarpSolver<T> for RadialSolver<T> {
    type Field = RadialField<T>;

    /// Solve the per-axis weights.
    ///
    /// Points with `begin == end` are committed but do not contribute a centre.
    /// They are dropped from the system, so they do not pin the field at their
    /// sources: add a small displacement instead to anchor a region.
    /// # Example
    /// ```
    /// use gridwarp::prelude::*;
    /// use nalgebra::Point2;
    /// use approx::assert_relative_eq;
    ///
    /// let cps = vec![
    ///     ControlPoint::committed(Point2::new(-0.5, 0.0), Point2::new(-0.4, 0.1)),
    ///     ControlPoint::committed(Point2::new(0.5, 0.2), Point2::new(0.3, 0.2)),
    /// ];
    /// let field = RadialSolver::new(RadialKernel::gaussian()).solve(&cps).unwrap();
    /// for cp in cps.iter() {
    ///     assert_relative_eq!(field.evaluate(cp.begin()), *cp.end().unwrap(), epsilon = 1e-9);
    /// }
    ///
    /// let empty: Vec<ControlPoint<f64>> = vec![];
    /// assert_eq!(RadialSolver::default().solve(&empty).unwrap_err(), WarpError::NoControlPoints);
    /// ```
    fn solve(&self, control_points: &[ControlPoint<T>]) -> WarpResult<Self::Field> {
        let committed = control_points
            .iter()
            .filter(|cp| cp.is_committed())
            .collect::<Vec<_>>();
        if committed.is_empty() {
            return Err(WarpError::NoControlPoints);
        }

        let (centres, displacements): (Vec<_>, Vec<_>) = committed
            .iter()
            .filter(|cp| !cp.is_degenerate())
            .filter_map(|cp| cp.displacement().map(|d| (*cp.begin(), d)))
            .unzip();

        let n = centres.len();
        if n == 0 {
            log::debug!("all committed control points are degenerate, identity field");
            return Ok(RadialField {
                kernel: self.kernel,
                centres,
                weights: vec![],
            });
        }

        let a = kernel_matrix(&self.kernel, &centres);
        let lu = a.lu();

        let ratio = pivot_ratio(&lu.u());
        let ratio_f64 = ratio.to_f64().unwrap_or(0.0);
        if ratio < self.singular_tolerance {
            log::warn!(
                "kernel matrix of {} centres is singular (pivot ratio {:e})",
                n,
                ratio_f64
            );
            return Err(WarpError::SingularSystem(ratio_f64));
        }

        let mut weights = vec![Vector2::<T>::zeros(); n];
        for axis in 0..2 {
            let b = DVector::from_iterator(n, displacements.iter().map(|d| d[axis]));
            let x = lu.solve(&b).ok_or(WarpError::SingularSystem(ratio_f64))?;
            if x.iter().any(|v| !v.is_finite()) {
                log::warn!("non-finite weights along axis {}", axis);
                return Err(WarpError::SingularSystem(ratio_f64));
            }
            for (w, v) in weights.iter_mut().zip(x.iter()) {
                w[axis] = *v;
            }
        }

        log::debug!(
            "solved {:?} weights for {} centres (pivot ratio {:e})",
            self.kernel,
            n,
            ratio_f64
        );

        Ok(RadialField {
            kernel: self.kernel,
            centres,
            weights,
        })
    }
}

/// Radial warp field `p + sum_i w_i * entry(p, c_i)`
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RadialField<T: FloatingPoint> {
    kernel: RadialKernel<T>,
    centres: Vec<Point2<T>>,
    weights: Vec<Vector2<T>>,
}

impl<T: FloatingPoint> RadialField<T> {
    pub fn kernel(&self) -> &RadialKernel<T> {
        &self.kernel
    }

    /// Source positions of the contributing control points
    pub fn centres(&self) -> &[Point2<T>] {
        &self.centres
    }

    /// Per-centre (x, y) weights
    pub fn weights(&self) -> &[Vector2<T>] {
        &self.weights
    }
}

impl<T: FloatingPoint> WarpField<T> for RadialField<T> {
    fn evaluate(&self, point: &Point2<T>) -> Point2<T> {
        let offset = self
            .centres
            .iter()
            .zip(self.weights.iter())
            .fold(Vector2::zeros(), |acc, (c, w)| {
                acc + w * self.kernel.entry(point, c)
            });
        point + offset
    }
}
