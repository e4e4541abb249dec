use super::types::Mask;
use image::{imageops, RgbImage};
use ndarray::Array4;

/// Preprocessor for converting photos to model input tensors
pub struct Preprocessor {
    target_width: u32,
    target_height: u32,
}

impl Preprocessor {
    pub fn new(target_width: u32, target_height: u32) -> Self {
        Self {
            target_width,
            target_height,
        }
    }

    /// Preprocess a photo into a normalized NCHW tensor
    ///
    /// Steps:
    /// 1. Resize to the model's input dimensions
    /// 2. Convert to float and normalize to [-1, 1] (MODNet convention)
    /// 3. Transpose from HWC to NCHW format
    ///
    /// Returns: Array4<f32> with shape [1, 3, height, width]
    pub fn preprocess(&self, photo: &RgbImage) -> Array4<f32> {
        let _span = tracing::debug_span!("preprocess").entered();

        // Resize if needed
        let resized = if photo.dimensions() != (self.target_width, self.target_height) {
            imageops::resize(
                photo,
                self.target_width,
                self.target_height,
                imageops::FilterType::Lanczos3,
            )
        } else {
            photo.clone()
        };

        let (width, height) = resized.dimensions();
        let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

        for y in 0..height {
            for x in 0..width {
                let pixel = resized.get_pixel(x, y);

                // Normalize to [-1, 1]
                let r = pixel[0] as f32 / 127.5 - 1.0;
                let g = pixel[1] as f32 / 127.5 - 1.0;
                let b = pixel[2] as f32 / 127.5 - 1.0;

                tensor[[0, 0, y as usize, x as usize]] = r;
                tensor[[0, 1, y as usize, x as usize]] = g;
                tensor[[0, 2, y as usize, x as usize]] = b;
            }
        }

        tensor
    }

    /// Postprocess a model output matte into a photo-resolution [`Mask`]
    ///
    /// # Arguments
    /// * `matte` - Flattened matte at model resolution, values 0.0-1.0
    /// * `matte_width` - Width of the matte
    /// * `matte_height` - Height of the matte
    /// * `target_width` - Photo width
    /// * `target_height` - Photo height
    pub fn postprocess_matte(
        matte: &[f32],
        matte_width: u32,
        matte_height: u32,
        target_width: u32,
        target_height: u32,
    ) -> Mask {
        let _span = tracing::debug_span!("postprocess").entered();

        // Quantize to one opacity byte per pixel
        let gray = image::GrayImage::from_fn(matte_width, matte_height, |x, y| {
            let idx = (y * matte_width + x) as usize;
            let value = (matte[idx] * 255.0).clamp(0.0, 255.0) as u8;
            image::Luma([value])
        });

        // If dimensions match, no resize needed
        if matte_width == target_width && matte_height == target_height {
            return Mask::new(target_width, target_height, gray.into_raw());
        }

        let resized = imageops::resize(
            &gray,
            target_width,
            target_height,
            imageops::FilterType::Lanczos3,
        );

        Mask::new(target_width, target_height, resized.into_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_normalizes_to_symmetric_range() {
        let photo = RgbImage::from_pixel(4, 4, image::Rgb([255, 0, 128]));
        let tensor = Preprocessor::new(4, 4).preprocess(&photo);

        assert_eq!(tensor.shape(), &[1, 3, 4, 4]);
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 1, 0, 0]] + 1.0).abs() < 1e-6);
        assert!(tensor[[0, 2, 0, 0]].abs() < 0.01);
    }

    #[test]
    fn postprocess_quantizes_without_resize() {
        let matte = vec![0.0, 0.25, 0.5, 1.0];
        let mask = Preprocessor::postprocess_matte(&matte, 2, 2, 2, 2);

        assert_eq!(mask.dimensions(), (2, 2));
        assert_eq!(mask.get(0, 0), Some(0));
        assert_eq!(mask.get(1, 1), Some(255));
    }

    #[test]
    fn postprocess_resizes_to_photo_resolution() {
        let matte = vec![1.0; 16];
        let mask = Preprocessor::postprocess_matte(&matte, 4, 4, 8, 6);

        assert_eq!(mask.dimensions(), (8, 6));
        assert_eq!(mask.get(4, 3), Some(255));
    }
}
