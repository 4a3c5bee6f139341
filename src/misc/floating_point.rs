use nalgebra::RealField;
use num_traits::ToPrimitive;

/// Trait for floating point types (f32, f64)
/// Mainly used to identify the scalar of the warp domain in nalgebra
pub trait FloatingPoint: RealField + ToPrimitive + Copy {
    /// Convert a constant into the scalar type
    fn constant(value: f64) -> Self {
        Self::from_f64(value).unwrap_or_else(Self::zero)
    }
}

impl FloatingPoint for f32 {}
impl FloatingPoint for f64 {}
