/// User-tunable garment placement, each value a fraction of the canvas
/// dimensions. Values are clamped to their declared ranges before use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Garment width as a fraction of canvas width, in [0.5, 1.2]
    pub scale: f32,
    /// Garment top edge as a fraction of canvas height, in [0.1, 0.5]
    pub offset_y: f32,
    /// Horizontal shift from center as a fraction of canvas width, in [-0.2, 0.2]
    pub offset_x: f32,
}

impl Placement {
    pub const SCALE_MIN: f32 = 0.5;
    pub const SCALE_MAX: f32 = 1.2;
    pub const OFFSET_Y_MIN: f32 = 0.1;
    pub const OFFSET_Y_MAX: f32 = 0.5;
    pub const OFFSET_X_MIN: f32 = -0.2;
    pub const OFFSET_X_MAX: f32 = 0.2;

    pub fn new(scale: f32, offset_y: f32, offset_x: f32) -> Self {
        Self {
            scale,
            offset_y,
            offset_x,
        }
        .clamped()
    }

    /// Clamp every parameter to its declared range
    ///
    /// The geometry has no invalid region, only unintended ones, so
    /// out-of-range values are pulled back rather than rejected.
    pub fn clamped(self) -> Self {
        Self {
            scale: self.scale.clamp(Self::SCALE_MIN, Self::SCALE_MAX),
            offset_y: self.offset_y.clamp(Self::OFFSET_Y_MIN, Self::OFFSET_Y_MAX),
            offset_x: self.offset_x.clamp(Self::OFFSET_X_MIN, Self::OFFSET_X_MAX),
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            scale: 0.8,
            offset_y: 0.25,
            offset_x: 0.0,
        }
    }
}

/// Destination rectangle for the garment overlay, in canvas pixels.
/// May extend past the canvas edge; rendering clips rather than rejecting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Compute the garment's destination rectangle on the canvas
///
/// `aspect` is garment width / height; the overlay height follows from the
/// width, so the garment is never independently stretched vertically.
/// `aspect` must be positive and finite; a decoded garment image always is.
pub fn compute_rect(
    canvas_width: u32,
    canvas_height: u32,
    aspect: f32,
    placement: Placement,
) -> OverlayRect {
    let p = placement.clamped();
    let canvas_w = canvas_width as f32;
    let canvas_h = canvas_height as f32;

    let width = canvas_w * p.scale;
    let height = width / aspect;

    // Centered horizontally, shifted by the offsets
    let x = (canvas_w - width) / 2.0 + p.offset_x * canvas_w;
    let y = canvas_h * p.offset_y;

    OverlayRect {
        x,
        y,
        width,
        height,
    }
}
