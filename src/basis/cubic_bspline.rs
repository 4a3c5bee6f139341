use crate::misc::FloatingPoint;

/// Uniform cubic B-spline blending weights for a fractional offset `s` inside a cell.
///
/// The four weights belong to the knots at cell offsets -1, 0, 1 and 2.
/// They are non-negative and sum to one for `s` in `[0, 1]`; the polynomial
/// coefficients assume that range, so `s` must be normalized by the caller.
/// # Example
/// ```
/// use gridwarp::prelude::*;
/// use approx::assert_relative_eq;
///
/// let b = cubic_bspline_basis(0.0_f64);
/// assert_relative_eq!(b[0], 1.0 / 6.0);
/// assert_relative_eq!(b[1], 4.0 / 6.0);
/// assert_relative_eq!(b[2], 1.0 / 6.0);
/// assert_eq!(b[3], 0.0);
/// ```
pub fn cubic_bspline_basis<T: FloatingPoint>(s: T) -> [T; 4] {
    debug_assert!(
        s >= T::zero() && s <= T::one(),
        "basis parameter must be normalized into [0, 1]"
    );

    let one = T::one();
    let three = T::constant(3.0);
    let sixth = one / T::constant(6.0);

    let s2 = s * s;
    let s3 = s2 * s;
    let is = one - s;

    [
        is * is * is * sixth,
        (three * s3 - T::constant(6.0) * s2 + T::constant(4.0)) * sixth,
        (-three * s3 + three * s2 + three * s + one) * sixth,
        s3 * sixth,
    ]
}

/// Tensor product of two basis vectors, `w[k][l] = bs[k] * bt[l]`
pub fn tensor_basis<T: FloatingPoint>(bs: &[T; 4], bt: &[T; 4]) -> [[T; 4]; 4] {
    let mut w = [[T::zero(); 4]; 4];
    for k in 0..4 {
        for l in 0..4 {
            w[k][l] = bs[k] * bt[l];
        }
    }
    w
}
