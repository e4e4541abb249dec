use super::placement::{compute_rect, Placement};
use super::ComposeError;
use image::{imageops, RgbaImage};
use std::io::Cursor;

/// Draw a garment over a masked photo at the placement rectangle
///
/// The canvas takes the masked photo's dimensions: the user photo defines
/// the output frame, never the garment asset. The garment is resized into
/// the rectangle (aspect preserved by construction) and drawn source-over,
/// so transparent garment pixels expose the photo beneath. Parts of the
/// rectangle outside the canvas are clipped.
///
/// Pure value-producing transform: identical inputs yield byte-identical
/// output, and neither input is mutated.
pub fn compose(masked: &RgbaImage, garment: &RgbaImage, placement: Placement) -> RgbaImage {
    let _span = tracing::debug_span!("compose").entered();

    let (canvas_width, canvas_height) = masked.dimensions();
    let (garment_width, garment_height) = garment.dimensions();
    let aspect = garment_width as f32 / garment_height as f32;

    let rect = compute_rect(canvas_width, canvas_height, aspect, placement);

    // Base layer: the masked photo at full-canvas scale
    let mut canvas = masked.clone();

    let overlay_width = rect.width.round().max(1.0) as u32;
    let overlay_height = rect.height.round().max(1.0) as u32;
    let scaled = if garment.dimensions() == (overlay_width, overlay_height) {
        garment.clone()
    } else {
        imageops::resize(
            garment,
            overlay_width,
            overlay_height,
            imageops::FilterType::Lanczos3,
        )
    };

    // overlay clips the parts that fall outside the canvas
    imageops::overlay(
        &mut canvas,
        &scaled,
        rect.x.round() as i64,
        rect.y.round() as i64,
    );

    canvas
}

/// Encode a composite as PNG
///
/// The masked layer depends on alpha fidelity, so persisted output is always
/// a lossless-alpha format; a lossy encode would destroy the segmentation
/// edge.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ComposeError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| ComposeError::Encode(e.to_string()))?;
    Ok(buf)
}
