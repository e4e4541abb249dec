use super::ComposeError;
use crate::segmentation::Mask;
use image::{Rgba, RgbaImage, RgbImage};

/// Apply a foreground mask to a photo, producing a background-removed RGBA image
///
/// Output RGB equals the photo's RGB at every coordinate; output alpha equals
/// the mask value. Pure transform; the photo is not mutated.
///
/// Fails with [`ComposeError::DimensionMismatch`] when the mask was produced
/// for a photo of different dimensions.
pub fn apply_mask(photo: &RgbImage, mask: &Mask) -> Result<RgbaImage, ComposeError> {
    let (width, height) = photo.dimensions();
    if mask.dimensions() != (width, height) {
        return Err(ComposeError::DimensionMismatch {
            width,
            height,
            mask_width: mask.width(),
            mask_height: mask.height(),
        });
    }

    let alpha = mask.data();
    let mut out = RgbaImage::new(width, height);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let src = photo.get_pixel(x, y);
        let a = alpha[(y * width + x) as usize];
        *pixel = Rgba([src[0], src[1], src[2], a]);
    }

    Ok(out)
}
