//! # face-mask
//!
//! Occlude facial features on a photo with a sampled skin tone.
//!
//! Given the 68 landmarks of one face, this crate:
//! - **Builds regions**: a face silhouette (jaw line closed over a forehead
//!   estimated from the raised eyebrows) and one polygon per feature (each
//!   eye with its brow, nose, mouth)
//! - **Samples color**: averages raw pixels at both cheeks
//! - **Composites**: fills the silhouette with that color, then erases the
//!   features on top, either with a solid color or to transparency
//!
//! Landmark detection is not part of this crate. Anything implementing
//! [`LandmarkProvider`] can feed the pipeline; [`LandmarkFile`] reads the
//! output of an external detector from JSON and [`StaticLandmarks`] answers
//! with a fixed detection.
//!
//! ## Quick Start
//!
//! ```rust
//! use face_mask::{BoundingBox, MaskOptions, MaskPipeline, StaticLandmarks};
//! use image::{Rgba, RgbaImage};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let image = RgbaImage::from_pixel(300, 300, Rgba([200, 150, 100, 255]));
//!
//! // A known face box with the average frontal face placed inside it.
//! let provider = StaticLandmarks::mean_face(BoundingBox::new(50.0, 80.0, 200.0, 200.0));
//! let pipeline = MaskPipeline::new(provider, MaskOptions::default()).unwrap();
//!
//! let masked = pipeline.mask_image(&image).await.unwrap();
//! println!("skin tone {}", masked.outcome.color);
//! let output: RgbaImage = masked.surface.into_image();
//! # let _ = output;
//! # });
//! ```
//!
//! ## Errors
//!
//! "No face in this image" ([`Error::NoFaceDetected`]) and "landmark source
//! not ready" ([`Error::ModelLoad`]) are separate variants so callers can tell
//! the user which one happened.

mod compositor;
mod config;
mod error;
pub mod geometry;
mod mean_face;
mod pipeline;
mod provider;
mod regions;
mod sampler;
mod session;
mod surface;
mod types;

pub use compositor::{desaturate, erase_region, fill_region, paint_brush, Erase, EraseMode};
pub use config::{
    EraseStyle, MaskOptions, DEFAULT_BRUSH_RADIUS, DEFAULT_FOREHEAD_OFFSET_PX,
    DEFAULT_REGION_SCALE_FACTOR,
};
pub use error::{Error, Result};
pub use pipeline::{MaskOutcome, MaskPipeline, MaskedImage};
pub use provider::{LandmarkDocument, LandmarkFile, LandmarkProvider, StaticLandmarks};
pub use regions::{
    build_face_silhouette, build_feature_region, silhouette_from_parts, FaceRegions, Feature,
};
pub use sampler::{default_sample_points, sample_color, sample_luma};
pub use session::MaskSession;
pub use surface::RasterSurface;
pub use types::{BoundingBox, Color, Detection, LandmarkSet, Point, Region};
