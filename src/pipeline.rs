//! The masking pipeline: detect, build regions, sample, composite.
//!
//! A run moves through a fixed sequence of stages and never goes back:
//!
//! ```text
//! Start -> SurfaceInitialized -> Detected -> RegionsBuilt -> ColorSampled -> Composited -> Done
//!                                   |
//!                                   +-> NoFaceDetected (surface untouched)
//! ```
//!
//! Compositing order is fixed: optional desaturation, then sampling from the
//! now-current pixels, then the silhouette fill, then the feature erasures.
//! Erasing before filling would bury the features under the fill.

use image::RgbaImage;
use log::debug;

use crate::compositor::{desaturate, erase_region, fill_region};
use crate::config::MaskOptions;
use crate::error::{Error, Result};
use crate::provider::LandmarkProvider;
use crate::regions::FaceRegions;
use crate::sampler::{default_sample_points, sample_color, sample_luma};
use crate::surface::RasterSurface;
use crate::types::{Color, Detection};

/// Stages of one run, as they appear in the debug log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    SurfaceInitialized,
    Detected,
    NoFaceDetected,
    RegionsBuilt,
    ColorSampled,
    Composited,
    Done,
}

/// What a successful run leaves behind besides the painted surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskOutcome {
    /// Skin tone used for the fill; the freehand brush reuses it.
    pub color: Color,
    pub detection: Detection,
    pub regions: FaceRegions,
}

/// A masked image ready for export.
#[derive(Debug, Clone)]
pub struct MaskedImage {
    pub surface: RasterSurface,
    pub outcome: MaskOutcome,
}

/// One configured pipeline over a ready landmark provider.
///
/// Create it once and reuse it for every image.
#[derive(Debug, Clone)]
pub struct MaskPipeline<P> {
    provider: P,
    options: MaskOptions,
}

impl<P: LandmarkProvider> MaskPipeline<P> {
    pub fn new(provider: P, options: MaskOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { provider, options })
    }

    pub fn options(&self) -> &MaskOptions {
        &self.options
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Mask a source image on a fresh surface.
    pub async fn mask_image(&self, image: &RgbaImage) -> Result<MaskedImage> {
        debug!("stage {:?}", Stage::Start);
        let mut surface = RasterSurface::from_image(image);
        debug!(
            "stage {:?}: {}x{}",
            Stage::SurfaceInitialized,
            surface.width(),
            surface.height()
        );
        let detection = self.detect(image).await?;
        let outcome = self.composite(&mut surface, detection);
        Ok(MaskedImage { surface, outcome })
    }

    /// Ask the provider for the face. `NoFaceDetected` when there is none.
    pub async fn detect(&self, image: &RgbaImage) -> Result<Detection> {
        match self.provider.detect_face(image).await? {
            Some(detection) => {
                debug!("stage {:?}: face at {:?}", Stage::Detected, detection.bounding_box);
                Ok(detection)
            }
            None => {
                debug!("stage {:?}: surface left as drawn", Stage::NoFaceDetected);
                Err(Error::NoFaceDetected)
            }
        }
    }

    /// Everything after detection. Synchronous, so callers can hold a lock
    /// on the surface for its whole duration.
    pub fn composite(&self, surface: &mut RasterSurface, detection: Detection) -> MaskOutcome {
        let opts = &self.options;

        let regions = FaceRegions::build(
            &detection.landmarks,
            opts.forehead_offset_px,
            opts.include_brows,
        );
        debug!(
            "stage {:?}: silhouette of {} points, {} features",
            Stage::RegionsBuilt,
            regions.silhouette.len(),
            regions.features.len()
        );

        if opts.desaturate_before_sample {
            desaturate(surface);
        }

        let points = default_sample_points(surface, Some(&detection.landmarks));
        let color = if opts.desaturate_before_sample {
            sample_luma(surface, &points)
        } else {
            sample_color(surface, &points)
        };
        debug!("stage {:?}: {}", Stage::ColorSampled, color);

        fill_region(surface, &regions.silhouette, color);
        let erase = opts.erase(color);
        for (_, region) in &regions.features {
            erase_region(surface, region, &erase);
        }
        debug!("stage {:?}: erase {:?}", Stage::Composited, erase.mode);
        debug!("stage {:?}", Stage::Done);

        MaskOutcome {
            color,
            detection,
            regions,
        }
    }
}
