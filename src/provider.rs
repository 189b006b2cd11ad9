//! Landmark providers: the seam between masking and face detection.
//!
//! Detection itself is not done here. A provider is initialized once (models
//! loaded, files parsed) and the ready value is handed to the pipeline, which
//! calls it once per image.

use std::future::Future;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{BoundingBox, Detection, LandmarkSet};

/// Finds at most one face in an image.
pub trait LandmarkProvider {
    /// `Ok(None)` means the image has no face. Errors mean the provider could
    /// not run at all.
    fn detect_face(
        &self,
        image: &RgbaImage,
    ) -> impl Future<Output = Result<Option<Detection>>> + Send;
}

/// Returns the same answer for every image.
#[derive(Debug, Clone, Default)]
pub struct StaticLandmarks {
    detection: Option<Detection>,
}

impl StaticLandmarks {
    pub fn new(detection: Option<Detection>) -> Self {
        Self { detection }
    }

    /// A provider that never finds a face.
    pub fn none() -> Self {
        Self { detection: None }
    }

    /// The average frontal face placed in a known face box.
    pub fn mean_face(face: BoundingBox) -> Self {
        Self::new(Some(Detection {
            bounding_box: face,
            landmarks: LandmarkSet::mean_face(&face),
        }))
    }
}

impl LandmarkProvider for StaticLandmarks {
    async fn detect_face(&self, _image: &RgbaImage) -> Result<Option<Detection>> {
        Ok(self.detection.clone())
    }
}

/// On-disk detector output: `{"faces": [{"bounding_box": .., "landmarks": [..]}]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LandmarkDocument {
    #[serde(default)]
    pub faces: Vec<Detection>,
}

/// Landmarks precomputed by an external detector and stored as JSON.
#[derive(Debug, Clone)]
pub struct LandmarkFile {
    path: PathBuf,
    detection: Option<Detection>,
}

impl LandmarkFile {
    /// Read and validate the file. Any failure is reported as
    /// [`Error::ModelLoad`], since masking cannot proceed without it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let not_ready = |reason: String| Error::ModelLoad {
            path: path.clone(),
            reason,
        };

        let text = std::fs::read_to_string(&path).map_err(|e| not_ready(e.to_string()))?;
        let doc: LandmarkDocument =
            serde_json::from_str(&text).map_err(|e| not_ready(e.to_string()))?;

        if doc.faces.len() > 1 {
            warn!(
                "{} faces in {:?}; masking only the first",
                doc.faces.len(),
                path
            );
        }
        debug!("loaded {} face(s) from {:?}", doc.faces.len(), path);

        Ok(Self {
            detection: doc.faces.into_iter().next(),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LandmarkProvider for LandmarkFile {
    async fn detect_face(&self, _image: &RgbaImage) -> Result<Option<Detection>> {
        Ok(self.detection.clone())
    }
}
