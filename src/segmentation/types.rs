use image::RgbImage;
use thiserror::Error;

/// Errors from the segmentation boundary. Both variants are recoverable:
/// the caller degrades the preview instead of failing the whole try-on.
#[derive(Debug, Error)]
pub enum SegmentationError {
    /// The model has not finished loading, or its load failed.
    #[error("segmentation model unavailable: {0}")]
    ModelUnavailable(String),

    /// The model errored on an otherwise valid input.
    #[error("segmentation failed: {0}")]
    Inference(String),
}

/// Foreground mask: one byte per pixel in row-major order,
/// 0 = background, 255 = fully foreground.
/// Dimensions always match the photo the mask was produced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Mask {
    /// Wrap raw mask bytes. `data.len()` must equal `width * height`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width * height) as usize);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Foreground opacity at pixel (x, y), or `None` outside the mask.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) as usize;
        self.data.get(idx).copied()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Trait for person segmentation models
/// Allows swapping between different backends (MODNet, U2Net, RVM, etc.)
pub trait SegmentationModel {
    /// Run person matting on a photo.
    ///
    /// The returned mask has the same dimensions as `photo`. Output is
    /// deterministic for a fixed model file and input.
    fn segment(&mut self, photo: &RgbImage) -> Result<Mask, SegmentationError>;

    /// Get the model's preferred input dimensions
    ///
    /// Returns (width, height)
    fn input_size(&self) -> (u32, u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_get_is_bounds_checked() {
        let mask = Mask::new(2, 2, vec![0, 64, 128, 255]);
        assert_eq!(mask.get(0, 0), Some(0));
        assert_eq!(mask.get(1, 1), Some(255));
        assert_eq!(mask.get(2, 0), None);
        assert_eq!(mask.get(0, 2), None);
    }
}
