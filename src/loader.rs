use image::{DynamicImage, RgbImage, RgbaImage};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode error: {0}")]
    Decode(String),
}

/// Default bound on the longest photo edge. Segmentation cost scales with
/// resolution, so larger uploads are downscaled rather than rejected.
pub const DEFAULT_MAX_PHOTO_EDGE: u32 = 2048;

fn open(path: &Path) -> Result<DynamicImage, LoadError> {
    image::open(path).map_err(|e| match e {
        image::ImageError::IoError(io) => LoadError::Io(io),
        other => LoadError::Decode(other.to_string()),
    })
}

/// Decode a user photo, downscaling so neither dimension exceeds `max_edge`.
pub fn load_photo<P: AsRef<Path>>(path: P, max_edge: u32) -> Result<RgbImage, LoadError> {
    let decoded = open(path.as_ref())?;

    let (width, height) = (decoded.width(), decoded.height());
    let decoded = if width > max_edge || height > max_edge {
        tracing::info!(
            "Downscaling {}x{} photo to fit the {}px bound",
            width,
            height,
            max_edge
        );
        decoded.thumbnail(max_edge, max_edge)
    } else {
        decoded
    };

    Ok(decoded.to_rgb8())
}

/// Decode a garment image, keeping its alpha channel for compositing.
pub fn load_garment<P: AsRef<Path>>(path: P) -> Result<RgbaImage, LoadError> {
    Ok(open(path.as_ref())?.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn oversized_photo_is_bounded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.png");
        RgbImage::from_pixel(64, 32, image::Rgb([9, 9, 9]))
            .save(&path)
            .unwrap();

        let photo = load_photo(&path, 16).expect("load");
        assert!(photo.width() <= 16 && photo.height() <= 16);
        // Aspect ratio survives the downscale
        assert_eq!(photo.width(), 16);
        assert_eq!(photo.height(), 8);
    }

    #[test]
    fn small_photo_is_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("small.png");
        RgbImage::from_pixel(10, 12, image::Rgb([1, 2, 3]))
            .save(&path)
            .unwrap();

        let photo = load_photo(&path, 2048).expect("load");
        assert_eq!(photo.dimensions(), (10, 12));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = load_photo(dir.path().join("nope.png"), 2048).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
