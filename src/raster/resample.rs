use image::{Rgb, RgbImage};
use itertools::iproduct;
use nalgebra::{Point2, Vector2};

use crate::{
    domain::Domain,
    error::{WarpError, WarpResult},
    field::WarpField,
    misc::FloatingPoint,
};

/// Background fill, the dark blue clear colour of the viewer
pub const DEFAULT_BACKGROUND: Rgb<u8> = Rgb([0, 0, 51]);

/// How a destination pixel is traced back into the source image
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MappingDirection {
    /// Subtract the forward displacement: content moves from `begin` towards `end`
    #[default]
    Inverse,
    /// Add the forward displacement
    Forward,
}

/// Domain coordinate of the centre of pixel (`x`, `y`) of a `width x height` image
pub fn pixel_to_domain<T: FloatingPoint>(
    domain: &Domain<T>,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Point2<T> {
    let half = T::constant(0.5);
    let u = (T::from_u32(x).unwrap() + half) / T::from_u32(width).unwrap();
    let v = (T::from_u32(y).unwrap() + half) / T::from_u32(height).unwrap();
    domain.from_unit(&Vector2::new(u, v))
}

/// Pixel containing a domain point, `None` outside the domain
pub fn domain_to_pixel<T: FloatingPoint>(
    domain: &Domain<T>,
    point: &Point2<T>,
    width: u32,
    height: u32,
) -> Option<(u32, u32)> {
    if !domain.contains(point) {
        return None;
    }
    let uv = domain.to_unit(point);
    let index = |t: T, n: u32| {
        let i = (t * T::from_u32(n).unwrap()).floor().to_u32().unwrap_or(0);
        i.min(n - 1)
    };
    Some((index(uv.x, width), index(uv.y, height)))
}

/// Resample `src` through `field` into `dst` with nearest-neighbour lookup.
///
/// Every destination pixel centre is mapped into the domain, displaced along
/// `direction` and read back from the source pixel containing it. Positions
/// leaving the domain receive `background`.
/// Returns the number of background pixels.
/// # Example
/// ```
/// use gridwarp::prelude::*;
///
/// let domain = Domain::try_new(-1.0, 1.0, 4).unwrap();
/// let src = RgbImage::from_fn(8, 8, |x, y| Rgb([x as u8, y as u8, 0]));
/// let mut dst = RgbImage::new(8, 8);
///
/// let filled = resample_image(&src, &mut dst, &domain, &IdentityField, MappingDirection::Inverse, DEFAULT_BACKGROUND).unwrap();
/// assert_eq!(filled, 0);
/// assert_eq!(src, dst);
/// ```
pub fn resample_image<T, F>(
    src: &RgbImage,
    dst: &mut RgbImage,
    domain: &Domain<T>,
    field: &F,
    direction: MappingDirection,
    background: Rgb<u8>,
) -> WarpResult<usize>
where
    T: FloatingPoint,
    F: WarpField<T> + ?Sized,
{
    if src.dimensions() != dst.dimensions() {
        return Err(WarpError::ImageSizeMismatch {
            expected: src.as_raw().len(),
            actual: dst.as_raw().len(),
        });
    }

    let (width, height) = src.dimensions();
    let mut filled = 0;

    for (y, x) in iproduct!(0..height, 0..width) {
        let p = pixel_to_domain(domain, x, y, width, height);
        let d = field.displacement(&p);
        let source = match direction {
            MappingDirection::Inverse => p - d,
            MappingDirection::Forward => p + d,
        };

        let pixel = domain_to_pixel(domain, &source, width, height)
            .and_then(|(sx, sy)| src.get_pixel_checked(sx, sy));
        match pixel {
            Some(px) => dst.put_pixel(x, y, *px),
            None => {
                dst.put_pixel(x, y, background);
                filled += 1;
            }
        }
    }

    log::debug!(
        "resampled {}x{} image, {} background pixels",
        width,
        height,
        filled
    );

    Ok(filled)
}
