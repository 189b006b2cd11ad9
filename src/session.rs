//! One image at a time: supersession and serialized surface access.
//!
//! A [`MaskSession`] holds the surface of the most recently submitted image
//! behind a single async mutex. Every mutation (the pipeline's compositing
//! pass and every brush stroke) happens under that lock. Detection runs
//! without the lock; when it finishes, the run checks that its image is still
//! the current one and otherwise drops its result.

use image::RgbaImage;
use log::{debug, warn};
use tokio::sync::Mutex;

use crate::compositor::paint_brush;
use crate::error::{Error, Result};
use crate::pipeline::{MaskOutcome, MaskPipeline};
use crate::provider::LandmarkProvider;
use crate::surface::RasterSurface;
use crate::types::{Color, Point};

/// Everything behind the session lock. `latest` counts submissions, so a
/// generation and the slot it names are always updated together.
#[derive(Debug, Default)]
struct State {
    latest: u64,
    slot: Option<Slot>,
}

#[derive(Debug)]
struct Slot {
    generation: u64,
    surface: RasterSurface,
    color: Option<Color>,
}

pub struct MaskSession<P> {
    pipeline: MaskPipeline<P>,
    state: Mutex<State>,
}

impl<P: LandmarkProvider> MaskSession<P> {
    pub fn new(pipeline: MaskPipeline<P>) -> Self {
        Self {
            pipeline,
            state: Mutex::new(State::default()),
        }
    }

    pub fn pipeline(&self) -> &MaskPipeline<P> {
        &self.pipeline
    }

    /// Replace the current image with `image` and mask it.
    ///
    /// The previous surface is discarded immediately. Returns
    /// [`Error::Superseded`] if another image was submitted while this one
    /// was awaiting detection; the newer surface is left alone.
    pub async fn submit(&self, image: &RgbaImage) -> Result<MaskOutcome> {
        let generation = {
            let mut state = self.state.lock().await;
            let generation = state.latest + 1;
            state.latest = generation;
            state.slot = Some(Slot {
                generation,
                surface: RasterSurface::from_image(image),
                color: None,
            });
            generation
        };
        debug!("run {generation}: surface initialized");

        let detected = self.pipeline.detect(image).await;

        let mut state = self.state.lock().await;
        let slot = match state.slot.as_mut() {
            Some(slot) if slot.generation == generation => slot,
            _ => {
                warn!("run {generation}: superseded by a newer image, result dropped");
                return Err(Error::Superseded { generation });
            }
        };

        let outcome = self.pipeline.composite(&mut slot.surface, detected?);
        slot.color = Some(outcome.color);
        Ok(outcome)
    }

    /// Paint a freehand stroke with the last sampled skin tone.
    ///
    /// `radius` defaults to the pipeline's configured brush radius.
    pub async fn brush(&self, stroke: &[Point], radius: Option<f32>) -> Result<()> {
        let radius = radius.unwrap_or(self.pipeline.options().brush_radius);
        if !(radius.is_finite() && radius > 0.0) {
            return Err(Error::InvalidOptions(format!(
                "brush radius must be a positive number, got {radius}"
            )));
        }

        let mut state = self.state.lock().await;
        let slot = state.slot.as_mut().ok_or(Error::NoSampledColor)?;
        let color = slot.color.ok_or(Error::NoSampledColor)?;
        paint_brush(&mut slot.surface, stroke, radius, color);
        Ok(())
    }

    /// The sampled color of the current image, once masked.
    pub async fn color(&self) -> Option<Color> {
        self.state.lock().await.slot.as_ref().and_then(|s| s.color)
    }

    /// Generation of the current image; submissions are numbered from 1.
    pub async fn generation(&self) -> Option<u64> {
        self.state.lock().await.slot.as_ref().map(|s| s.generation)
    }

    /// Copy of the current surface.
    pub async fn snapshot(&self) -> Option<RasterSurface> {
        self.state.lock().await.slot.as_ref().map(|s| s.surface.clone())
    }

    /// Take the current surface out of the session.
    pub async fn take(&self) -> Option<RasterSurface> {
        self.state.lock().await.slot.take().map(|s| s.surface)
    }
}
