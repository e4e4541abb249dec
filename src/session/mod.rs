use crate::catalog::ClothingItem;
use crate::compose::{apply_mask, compose, Placement};
use crate::segmentation::{Mask, SegmentationError, SegmentationModel};
use image::{RgbImage, RgbaImage};

/// Lifecycle of one segmentation + composite cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingState {
    /// No photo submitted yet
    Idle,
    /// Model loading, or segmentation in flight
    Loading,
    /// Masked (and possibly combined) image available
    Ready,
    /// Model load or segmentation failed; preview degrades to the best
    /// available prior image
    Error,
}

/// A catalog item paired with its decoded image, ready to composite.
pub struct Garment {
    pub item: ClothingItem,
    pub image: RgbaImage,
}

/// Segmentation work handed to the driver. The photo buffer is the cycle's
/// own copy; concurrent cycles never share buffers.
pub struct SegmentationRequest {
    pub generation: u64,
    pub photo: RgbImage,
}

/// Best available preview, in degradation order.
pub enum Preview<'a> {
    Combined(&'a RgbaImage),
    Masked(&'a RgbaImage),
    Source(&'a RgbImage),
    /// Nothing to show yet; callers render a placeholder
    Empty,
}

enum ModelStatus {
    Loading,
    Ready,
    Failed,
}

/// Recomputation controller for one try-on view
///
/// An explicit state machine replaces the reactive effect chains such UIs
/// usually grow: every input change (photo, model readiness, garment
/// selection, placement) is an event, and a monotonically increasing
/// generation counter decides whether an asynchronous segmentation result
/// is still current when it arrives. Segmentation always runs strictly
/// before any composite that depends on it, and only the newest photo's
/// output is ever shown.
///
/// The session is sans-IO: it never calls the model itself. It emits
/// [`SegmentationRequest`]s for a driver to execute (see [`execute`]) and
/// consumes completions through [`TryOnSession::complete_segmentation`], so
/// completion ordering is owned by the driver and the staleness check here
/// is the single defense.
pub struct TryOnSession {
    generation: u64,
    model: ModelStatus,
    source: Option<RgbImage>,
    awaiting_model: bool,
    masked: Option<RgbaImage>,
    combined: Option<RgbaImage>,
    garment: Option<Garment>,
    placement: Placement,
    state: ProcessingState,
}

impl TryOnSession {
    pub fn new() -> Self {
        Self {
            generation: 0,
            model: ModelStatus::Loading,
            source: None,
            awaiting_model: false,
            masked: None,
            combined: None,
            garment: None,
            placement: Placement::default(),
            state: ProcessingState::Idle,
        }
    }

    /// Submit a new user photo
    ///
    /// The photo becomes the newest generation; everything derived from the
    /// previous photo is invalidated. Returns the segmentation request to
    /// run if the model is ready; with the model still loading the photo
    /// pends until [`TryOnSession::model_ready`].
    pub fn submit_photo(&mut self, photo: RgbImage) -> Option<SegmentationRequest> {
        self.generation += 1;
        tracing::debug!(generation = self.generation, "photo submitted");

        self.source = Some(photo);
        self.masked = None;
        self.combined = None;

        match self.model {
            ModelStatus::Ready => self.begin_cycle(),
            ModelStatus::Loading => {
                self.awaiting_model = true;
                self.state = ProcessingState::Loading;
                None
            }
            ModelStatus::Failed => {
                self.awaiting_model = false;
                self.state = ProcessingState::Error;
                None
            }
        }
    }

    /// Mark the segmentation model loaded. Starts the cycle for a photo
    /// that arrived while the model was still loading.
    pub fn model_ready(&mut self) -> Option<SegmentationRequest> {
        self.model = ModelStatus::Ready;
        tracing::info!("Segmentation model ready");

        if self.awaiting_model {
            self.begin_cycle()
        } else {
            None
        }
    }

    /// Mark the segmentation model as failed to load. A pending photo
    /// degrades to the raw-source preview.
    pub fn model_failed(&mut self) {
        self.model = ModelStatus::Failed;
        self.awaiting_model = false;
        tracing::warn!("Segmentation model unavailable; previews degrade to the raw photo");

        if self.source.is_some() {
            self.state = ProcessingState::Error;
        }
    }

    fn begin_cycle(&mut self) -> Option<SegmentationRequest> {
        let photo = self.source.as_ref()?.clone();
        self.awaiting_model = false;
        self.state = ProcessingState::Loading;
        Some(SegmentationRequest {
            generation: self.generation,
            photo,
        })
    }

    /// Feed back the result of a segmentation request
    ///
    /// Results for superseded generations are discarded untouched: a newer
    /// photo has been submitted since, and its cycle owns the display.
    pub fn complete_segmentation(
        &mut self,
        generation: u64,
        result: Result<Mask, SegmentationError>,
    ) {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "discarding stale segmentation result"
            );
            return;
        }

        let mask = match result {
            Ok(mask) => mask,
            Err(e) => {
                tracing::warn!("segmentation failed: {e}");
                self.state = ProcessingState::Error;
                return;
            }
        };

        let Some(source) = self.source.as_ref() else {
            tracing::debug!("segmentation completed with no source photo");
            return;
        };

        match apply_mask(source, &mask) {
            Ok(masked) => {
                self.masked = Some(masked);
                self.recompose();
                self.state = ProcessingState::Ready;
            }
            Err(e) => {
                tracing::warn!("masking failed: {e}");
                self.state = ProcessingState::Error;
            }
        }
    }

    /// Change the garment selection. Re-runs only the compositor;
    /// segmentation is never repeated for a selection change.
    pub fn select_garment(&mut self, garment: Option<Garment>) {
        match &garment {
            Some(g) => tracing::debug!(item = %g.item.id, "garment selected"),
            None => tracing::debug!("garment selection cleared"),
        }
        self.garment = garment;
        self.recompose();
    }

    /// Adjust the placement parameters (clamped to their ranges).
    /// Re-runs only the compositor.
    pub fn set_placement(&mut self, placement: Placement) {
        self.placement = placement.clamped();
        self.recompose();
    }

    /// Re-run the compositor from current inputs. Compositing requires a
    /// masked image and a garment; otherwise the combined image is cleared
    /// and the preview falls back.
    fn recompose(&mut self) {
        self.combined = match (self.masked.as_ref(), self.garment.as_ref()) {
            (Some(masked), Some(garment)) => {
                Some(compose(masked, &garment.image, self.placement))
            }
            _ => None,
        };
    }

    /// Best available preview: combined, then masked, then the raw photo.
    pub fn preview(&self) -> Preview<'_> {
        if let Some(combined) = &self.combined {
            Preview::Combined(combined)
        } else if let Some(masked) = &self.masked {
            Preview::Masked(masked)
        } else if let Some(source) = &self.source {
            Preview::Source(source)
        } else {
            Preview::Empty
        }
    }

    pub fn state(&self) -> ProcessingState {
        self.state
    }

    pub fn is_processing(&self) -> bool {
        self.state == ProcessingState::Loading
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn garment(&self) -> Option<&Garment> {
        self.garment.as_ref()
    }

    pub fn combined(&self) -> Option<&RgbaImage> {
        self.combined.as_ref()
    }

    pub fn masked(&self) -> Option<&RgbaImage> {
        self.masked.as_ref()
    }
}

impl Default for TryOnSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a segmentation request against a model and feed the result back
///
/// Completion is synchronous here; the session's generation check makes the
/// outcome identical under any completion ordering.
pub fn execute(
    session: &mut TryOnSession,
    model: &mut dyn SegmentationModel,
    request: SegmentationRequest,
) {
    let result = model.segment(&request.photo);
    session.complete_segmentation(request.generation, result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    /// Stub model: constant-opacity mask, call counting for assertions.
    struct StubModel {
        calls: usize,
        opacity: u8,
    }

    impl StubModel {
        fn new(opacity: u8) -> Self {
            Self { calls: 0, opacity }
        }
    }

    impl SegmentationModel for StubModel {
        fn segment(&mut self, photo: &RgbImage) -> Result<Mask, SegmentationError> {
            self.calls += 1;
            let (w, h) = photo.dimensions();
            Ok(Mask::new(w, h, vec![self.opacity; (w * h) as usize]))
        }

        fn input_size(&self) -> (u32, u32) {
            (512, 512)
        }
    }

    fn photo(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, image::Rgb([40, 50, 60]))
    }

    fn garment(width: u32, height: u32) -> Garment {
        Garment {
            item: ClothingItem {
                id: "item-1".to_string(),
                name: "Blue T-Shirt".to_string(),
                category: "T-Shirts".to_string(),
                image_path: "garments/item-1.png".into(),
                created_at: Utc::now(),
            },
            image: RgbaImage::from_pixel(width, height, image::Rgba([200, 0, 0, 255])),
        }
    }

    fn ready_session(model: &mut StubModel, width: u32, height: u32) -> TryOnSession {
        let mut session = TryOnSession::new();
        session.model_ready();
        let request = session.submit_photo(photo(width, height)).expect("request");
        execute(&mut session, model, request);
        assert_eq!(session.state(), ProcessingState::Ready);
        session
    }

    #[test]
    fn photo_before_model_ready_is_deferred() {
        let mut model = StubModel::new(255);
        let mut session = TryOnSession::new();

        assert!(session.submit_photo(photo(4, 4)).is_none());
        assert!(session.is_processing());

        let request = session.model_ready().expect("deferred request");
        execute(&mut session, &mut model, request);

        assert_eq!(session.state(), ProcessingState::Ready);
        assert!(matches!(session.preview(), Preview::Masked(_)));
        assert_eq!(model.calls, 1);
    }

    #[test]
    fn no_garment_previews_the_masked_photo() {
        let mut model = StubModel::new(128);
        let session = ready_session(&mut model, 6, 6);

        match session.preview() {
            Preview::Masked(masked) => {
                assert_eq!(masked.dimensions(), (6, 6));
                assert_eq!(masked.get_pixel(0, 0).0[3], 128);
            }
            _ => panic!("expected masked preview"),
        }
        assert!(session.combined().is_none());
    }

    #[test]
    fn adjustments_rerun_only_the_compositor() {
        let mut model = StubModel::new(255);
        let mut session = ready_session(&mut model, 40, 60);

        session.select_garment(Some(garment(10, 10)));
        let before = session.combined().expect("combined").clone();

        let shifted = Placement {
            offset_x: Placement::OFFSET_X_MAX,
            ..Placement::default()
        };
        session.set_placement(shifted);
        let after = session.combined().expect("combined");

        assert_eq!(model.calls, 1);
        assert_ne!(before.as_raw(), after.as_raw());
        assert_eq!(session.state(), ProcessingState::Ready);
    }

    #[test]
    fn selection_change_reruns_only_the_compositor() {
        let mut model = StubModel::new(255);
        let mut session = ready_session(&mut model, 40, 60);

        session.select_garment(Some(garment(10, 10)));
        assert!(session.combined().is_some());

        session.select_garment(None);
        assert!(session.combined().is_none());
        assert!(matches!(session.preview(), Preview::Masked(_)));
        assert_eq!(model.calls, 1);
    }

    #[test]
    fn stale_segmentation_result_is_discarded() {
        let mut session = TryOnSession::new();
        session.model_ready();

        let request_a = session.submit_photo(photo(4, 4)).expect("request a");
        let request_b = session.submit_photo(photo(6, 6)).expect("request b");

        // A's result arrives after B was submitted: discarded
        let stale = Mask::new(4, 4, vec![200; 16]);
        session.complete_segmentation(request_a.generation, Ok(stale));
        assert!(session.masked().is_none());
        assert!(session.is_processing());

        let current = Mask::new(6, 6, vec![100; 36]);
        session.complete_segmentation(request_b.generation, Ok(current));

        let masked = session.masked().expect("masked from B");
        assert_eq!(masked.dimensions(), (6, 6));
        assert_eq!(masked.get_pixel(0, 0).0[3], 100);
        assert_eq!(session.state(), ProcessingState::Ready);
    }

    #[test]
    fn late_failure_for_superseded_generation_is_ignored() {
        let mut session = TryOnSession::new();
        session.model_ready();

        let request_a = session.submit_photo(photo(4, 4)).expect("request a");
        let request_b = session.submit_photo(photo(6, 6)).expect("request b");

        session.complete_segmentation(
            request_b.generation,
            Ok(Mask::new(6, 6, vec![255; 36])),
        );
        assert_eq!(session.state(), ProcessingState::Ready);

        session.complete_segmentation(
            request_a.generation,
            Err(SegmentationError::Inference("boom".to_string())),
        );
        assert_eq!(session.state(), ProcessingState::Ready);
        assert!(session.masked().is_some());
    }

    #[test]
    fn new_photo_invalidates_previous_composite() {
        let mut model = StubModel::new(255);
        let mut session = ready_session(&mut model, 40, 60);
        session.select_garment(Some(garment(10, 10)));
        assert!(session.combined().is_some());

        let request = session.submit_photo(photo(32, 48)).expect("request");
        assert!(session.combined().is_none());
        assert!(session.masked().is_none());
        assert!(matches!(session.preview(), Preview::Source(_)));

        // Segmentation completes, then the composite comes back for the
        // kept garment selection
        execute(&mut session, &mut model, request);
        let combined = session.combined().expect("recomposited");
        assert_eq!(combined.dimensions(), (32, 48));
    }

    #[test]
    fn segmentation_failure_degrades_to_raw_photo() {
        let mut session = TryOnSession::new();
        session.model_ready();

        let request = session.submit_photo(photo(8, 8)).expect("request");
        session.complete_segmentation(
            request.generation,
            Err(SegmentationError::Inference("malformed input".to_string())),
        );

        assert_eq!(session.state(), ProcessingState::Error);
        assert!(matches!(session.preview(), Preview::Source(_)));
    }

    #[test]
    fn mismatched_mask_degrades_to_raw_photo() {
        let mut session = TryOnSession::new();
        session.model_ready();

        let request = session.submit_photo(photo(8, 8)).expect("request");
        session.complete_segmentation(request.generation, Ok(Mask::new(4, 4, vec![255; 16])));

        assert_eq!(session.state(), ProcessingState::Error);
        assert!(matches!(session.preview(), Preview::Source(_)));
    }

    #[test]
    fn model_failure_with_pending_photo_degrades() {
        let mut session = TryOnSession::new();
        assert!(session.submit_photo(photo(8, 8)).is_none());

        session.model_failed();
        assert_eq!(session.state(), ProcessingState::Error);
        assert!(matches!(session.preview(), Preview::Source(_)));
    }

    #[test]
    fn empty_session_previews_nothing() {
        let session = TryOnSession::new();
        assert_eq!(session.state(), ProcessingState::Idle);
        assert!(matches!(session.preview(), Preview::Empty));
    }
}
