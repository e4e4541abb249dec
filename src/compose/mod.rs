mod compositor;
mod masking;
mod placement;

pub use compositor::{compose, encode_png};
pub use masking::apply_mask;
pub use placement::{compute_rect, OverlayRect, Placement};

use thiserror::Error;

/// Errors from the masking and compositing stages.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Mask and photo are produced by independently-timed asynchronous
    /// steps and can fall out of sync; the masking stage validates instead
    /// of assuming.
    #[error("mask dimensions {mask_width}x{mask_height} do not match photo {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        mask_width: u32,
        mask_height: u32,
    },

    #[error("encode error: {0}")]
    Encode(String),
}
