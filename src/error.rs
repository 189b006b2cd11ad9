use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The landmark provider found no face in the image.
    #[error("no face detected")]
    NoFaceDetected,

    /// The landmark source could not be made ready.
    #[error("landmark source {path:?} not ready: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    /// A newer image was submitted while this one was awaiting detection.
    #[error("masking run {generation} superseded by a newer image")]
    Superseded { generation: u64 },

    #[error("no sampled color yet: run the mask pipeline before painting")]
    NoSampledColor,

    #[error("invalid landmark set: expected {expected} points, found {found}")]
    InvalidLandmarks { expected: usize, found: usize },

    #[error("invalid mask options: {0}")]
    InvalidOptions(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for the expected "no face in this image" outcome.
    pub fn is_no_face(&self) -> bool {
        matches!(self, Error::NoFaceDetected)
    }

    /// True when masking cannot run until the landmark source is loaded.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Error::ModelLoad { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
