mod modnet;
mod preprocess;
pub mod types;

pub use modnet::PortraitMatting;
pub use preprocess::Preprocessor;
pub use types::{Mask, SegmentationError, SegmentationModel};

use std::path::Path;

/// Load the default portrait matting model (MODNet)
pub fn load_default_model<P: AsRef<Path>>(
    model_path: P,
) -> Result<Box<dyn SegmentationModel>, SegmentationError> {
    let model = PortraitMatting::load(model_path)?;
    Ok(Box::new(model))
}
