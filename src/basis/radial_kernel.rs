use nalgebra::Point2;

use crate::misc::FloatingPoint;

use super::thin_plate::{is_coincident, tps_coincident_limit, tps_green};

/// Default decay constant of the Gaussian and inverse multiquadric kernels
pub const DEFAULT_KERNEL_DECAY: f64 = 10.0;

/// Gaussian kernel `exp(-rsq * k)` of a squared distance
pub fn gaussian<T: FloatingPoint>(rsq: T, decay: T) -> T {
    (-rsq * decay).exp()
}

/// Inverse multiquadric kernel `1 / sqrt(1 + rsq * k)` of a squared distance
pub fn inverse_multiquadric<T: FloatingPoint>(rsq: T, decay: T) -> T {
    T::one() / (T::one() + rsq * decay).sqrt()
}

/// Interpolation kernel of the radial solver
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RadialKernel<T> {
    Gaussian { decay: T },
    InverseMultiquadric { decay: T },
    /// Thin-plate spline Green's function
    ThinPlate,
}

impl<T: FloatingPoint> RadialKernel<T> {
    pub fn gaussian() -> Self {
        Self::Gaussian {
            decay: T::constant(DEFAULT_KERNEL_DECAY),
        }
    }

    pub fn inverse_multiquadric() -> Self {
        Self::InverseMultiquadric {
            decay: T::constant(DEFAULT_KERNEL_DECAY),
        }
    }

    /// Raw kernel value between two points
    pub fn value(&self, p1: &Point2<T>, p2: &Point2<T>) -> T {
        match self {
            Self::Gaussian { decay } => gaussian((p1 - p2).norm_squared(), *decay),
            Self::InverseMultiquadric { decay } => {
                inverse_multiquadric((p1 - p2).norm_squared(), *decay)
            }
            Self::ThinPlate => tps_green(p1, p2),
        }
    }

    /// Value at a point coinciding with `centre`, the continuous limit of [`Self::value`].
    /// The raw thin-plate Green's function is zero there, so it takes `(1 - |c|^2)^2 / 2`.
    pub fn self_value(&self, centre: &Point2<T>) -> T {
        match self {
            Self::Gaussian { .. } | Self::InverseMultiquadric { .. } => T::one(),
            Self::ThinPlate => tps_coincident_limit(centre),
        }
    }

    /// Kernel entry shared by the linear system and the field evaluation:
    /// the limit value for coincident points, the kernel value otherwise.
    /// # Example
    /// ```
    /// use gridwarp::prelude::*;
    /// use nalgebra::Point2;
    ///
    /// let p = Point2::new(0.25, -0.5);
    /// let tps = RadialKernel::<f64>::ThinPlate;
    /// assert_eq!(tps.value(&p, &p), 0.0);
    /// assert_eq!(tps.entry(&p, &p), 0.236328125);
    /// assert_eq!(RadialKernel::<f64>::gaussian().entry(&p, &p), 1.0);
    /// ```
    pub fn entry(&self, p1: &Point2<T>, p2: &Point2<T>) -> T {
        if is_coincident(p1, p2) {
            self.self_value(p2)
        } else {
            self.value(p1, p2)
        }
    }
}

impl<T: FloatingPoint> Default for RadialKernel<T> {
    fn default() -> Self {
        Self::ThinPlate
    }
}
