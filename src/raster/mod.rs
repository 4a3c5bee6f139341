//! RGB8 images and their resampling through a warp field.

pub mod buffer;
pub mod resample;

pub use buffer::*;
pub use image::{Rgb, RgbImage};
pub use resample::*;
