use image::{imageops, RgbImage};

use crate::error::{WarpError, WarpResult};

/// Number of channels of an RGB8 pixel
pub const CHANNELS: usize = 3;

/// Wrap a bottom-up RGB8 buffer, checking its length against the dimensions.
///
/// Row 0 is the bottom scanline (`y = min` in domain space), the texture
/// convention of the warp grid.
/// # Example
/// ```
/// use gridwarp::prelude::*;
///
/// let image = rgb_image_from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap();
/// assert_eq!(image.get_pixel(1, 0), &Rgb([0, 255, 0]));
///
/// assert_eq!(
///     rgb_image_from_raw(2, 2, vec![0; 6]).unwrap_err(),
///     WarpError::ImageSizeMismatch { expected: 12, actual: 6 }
/// );
/// ```
pub fn rgb_image_from_raw(width: u32, height: u32, data: Vec<u8>) -> WarpResult<RgbImage> {
    if width == 0 || height == 0 {
        return Err(WarpError::EmptyImage);
    }
    let expected = width as usize * height as usize * CHANNELS;
    let actual = data.len();
    if actual != expected {
        return Err(WarpError::ImageSizeMismatch { expected, actual });
    }
    RgbImage::from_raw(width, height, data).ok_or(WarpError::ImageSizeMismatch { expected, actual })
}

/// Wrap a top-down buffer, as decoders emit them, flipping the scanlines
/// into bottom-up order.
pub fn rgb_image_from_top_down(width: u32, height: u32, data: Vec<u8>) -> WarpResult<RgbImage> {
    let mut image = rgb_image_from_raw(width, height, data)?;
    imageops::flip_vertical_in_place(&mut image);
    Ok(image)
}
