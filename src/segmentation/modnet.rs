use super::preprocess::Preprocessor;
use super::types::{Mask, SegmentationError, SegmentationModel};
use image::RgbImage;
use ort::{GraphOptimizationLevel, Session};
use std::path::Path;

/// MODNet portrait matting model
///
/// Single forward pass per photo: one `src` input, one alpha matte output.
/// Unlike video matting models there is no temporal state to carry between
/// calls, so inference is a pure function of the model file and the photo.
pub struct PortraitMatting {
    session: Session,
    preprocessor: Preprocessor,
    width: u32,
    height: u32,
}

impl PortraitMatting {
    /// Load a MODNet-style model from an ONNX file
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file
    ///
    /// # Default Configuration
    /// - Input size: 512x512 (can be adjusted for performance/quality tradeoff)
    ///
    /// Dropping the returned value releases the ONNX Runtime session and any
    /// memory the model holds.
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self, SegmentationError> {
        let path = model_path.as_ref();

        tracing::info!("Loading matting model from {}", path.display());

        let session = build_session(path).map_err(|e| {
            SegmentationError::ModelUnavailable(format!(
                "failed to load model from {}: {e}",
                path.display()
            ))
        })?;

        tracing::info!("Matting model loaded successfully");

        // 512x512 is a good balance of edge quality and latency for portraits
        let width = 512;
        let height = 512;

        let preprocessor = Preprocessor::new(width, height);

        Ok(Self {
            session,
            preprocessor,
            width,
            height,
        })
    }
}

fn build_session(path: &Path) -> Result<Session, ort::Error> {
    Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(4)?
        .commit_from_file(path)
}

impl SegmentationModel for PortraitMatting {
    fn segment(&mut self, photo: &RgbImage) -> Result<Mask, SegmentationError> {
        let _span = tracing::debug_span!("portrait_matting").entered();

        // Preprocess photo to NCHW tensor
        let input_tensor = self.preprocessor.preprocess(photo);

        // Run inference
        let _infer_span = tracing::debug_span!("inference").entered();
        let inputs = ort::inputs![input_tensor.view()]
            .map_err(|e| SegmentationError::Inference(e.to_string()))?;
        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| SegmentationError::Inference(e.to_string()))?;
        drop(_infer_span);

        // The matte is the sole output, shape [1, 1, H, W]
        let matte = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| SegmentationError::Inference(e.to_string()))?
            .view()
            .to_owned();

        let shape = matte.shape();
        if shape.len() != 4 {
            return Err(SegmentationError::Inference(format!(
                "unexpected matte shape {shape:?}"
            )));
        }
        let matte_height = shape[2];
        let matte_width = shape[3];

        let matte_flat: Vec<f32> = matte.iter().copied().collect();

        // Postprocess: resize back to photo dimensions
        let (photo_width, photo_height) = photo.dimensions();
        Ok(Preprocessor::postprocess_matte(
            &matte_flat,
            matte_width as u32,
            matte_height as u32,
            photo_width,
            photo_height,
        ))
    }

    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
