use nalgebra::Point2;

use crate::misc::FloatingPoint;

/// Whether two points are closer than the scalar epsilon
pub fn is_coincident<T: FloatingPoint>(p1: &Point2<T>, p2: &Point2<T>) -> bool {
    (p1 - p2).norm_squared() <= T::default_epsilon()
}

/// Conformal factor of the thin-plate Green's function on the unit disk
///
/// `A(p1, p2) = sqrt(|p1|^2 |p2|^2 - 2 <p1, p2> + 1) / |p1 - p2|`
///
/// The radicand is clamped to the scalar epsilon, which keeps the factor
/// finite for pairs on opposite sides of the unit circle.
/// Coincident points have no finite factor and return `None`.
pub fn tps_conformal_factor<T: FloatingPoint>(p1: &Point2<T>, p2: &Point2<T>) -> Option<T> {
    if is_coincident(p1, p2) {
        return None;
    }
    Some(tps_radicand(p1, p2).sqrt() / (p1 - p2).norm())
}

/// `|p1|^2 |p2|^2 - 2 <p1, p2> + 1`, clamped to the scalar epsilon
fn tps_radicand<T: FloatingPoint>(p1: &Point2<T>, p2: &Point2<T>) -> T {
    let a = p1.coords;
    let b = p2.coords;
    let radicand = a.norm_squared() * b.norm_squared() - T::constant(2.0) * a.dot(&b) + T::one();
    radicand.max(T::default_epsilon())
}

/// Limit of the Green's function as both arguments approach `centre`
///
/// The `ln` term vanishes with the squared distance, leaving half the radicand,
/// `(1 - |c|^2)^2 / 2`.
/// # Example
/// ```
/// use gridwarp::prelude::*;
/// use nalgebra::{Point2, Vector2};
/// use approx::assert_relative_eq;
///
/// let c = Point2::new(0.3, -0.4);
/// assert_relative_eq!(tps_coincident_limit(&c), 0.28125);
/// let near = c + Vector2::new(1e-6, 0.0);
/// assert_relative_eq!(tps_green(&near, &c), tps_coincident_limit(&c), epsilon = 1e-5);
/// ```
pub fn tps_coincident_limit<T: FloatingPoint>(centre: &Point2<T>) -> T {
    tps_radicand(centre, centre) / T::constant(2.0)
}

/// Thin-plate Green's function `G = |p1 - p2|^2 ((A^2 - 1) / 2 - ln A)`
///
/// Returns exactly zero for coincident points instead of evaluating `ln` of
/// an infinite factor.
/// # Example
/// ```
/// use gridwarp::prelude::*;
/// use nalgebra::Point2;
/// use approx::assert_relative_eq;
///
/// let origin = Point2::<f64>::origin();
/// assert_eq!(tps_green(&origin, &origin), 0.0);
///
/// // vanishes on the unit circle around the origin
/// assert_relative_eq!(tps_green(&origin, &Point2::new(1.0, 0.0)), 0.0);
/// ```
pub fn tps_green<T: FloatingPoint>(p1: &Point2<T>, p2: &Point2<T>) -> T {
    match tps_conformal_factor(p1, p2) {
        Some(a) => {
            let d2 = (p1 - p2).norm_squared();
            d2 * ((a * a - T::one()) / T::constant(2.0) - a.ln())
        }
        None => T::zero(),
    }
}
