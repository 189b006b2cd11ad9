//! Face and feature polygons derived from a 68-point landmark set.
//!
//! The 68-point model has no forehead landmarks, so the top of the face
//! silhouette is estimated by lifting both eyebrows a fixed number of pixels.
//! The offset does not follow face scale or head tilt: it assumes a
//! near-frontal face of roughly the size the offset was tuned for, and the
//! estimate gets worse for tilted, very small or very large faces.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::types::{LandmarkSet, Point, Region};

/// Facial features that can be erased individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    LeftEye,
    RightEye,
    Nose,
    Mouth,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::LeftEye,
        Feature::RightEye,
        Feature::Nose,
        Feature::Mouth,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::LeftEye => "left_eye",
            Feature::RightEye => "right_eye",
            Feature::Nose => "nose",
            Feature::Mouth => "mouth",
        }
    }
}

/// Face silhouette: the jaw line closed over a forehead estimated from the
/// eyebrows lifted by `forehead_offset_px`.
pub fn build_face_silhouette(landmarks: &LandmarkSet, forehead_offset_px: f32) -> Region {
    silhouette_from_parts(
        landmarks.jaw(),
        landmarks.left_brow(),
        landmarks.right_brow(),
        forehead_offset_px,
    )
}

/// Silhouette from arbitrary point groups.
///
/// All groups run left to right across the image. The loop goes along the
/// jaw, then back over the raised right brow and the raised left brow, so
/// every edge joins spatially adjacent points and the winding stays
/// consistent.
pub fn silhouette_from_parts(
    jaw: &[Point],
    left_brow: &[Point],
    right_brow: &[Point],
    forehead_offset_px: f32,
) -> Region {
    let mut points = Vec::with_capacity(jaw.len() + left_brow.len() + right_brow.len());
    points.extend_from_slice(jaw);
    points.extend(right_brow.iter().rev().map(|p| p.raised(forehead_offset_px)));
    points.extend(left_brow.iter().rev().map(|p| p.raised(forehead_offset_px)));

    let region = Region::new(points);
    if region.is_degenerate() {
        trace!("silhouette has {} point(s), nothing to fill", region.len());
    }
    region
}

/// Polygon covering one feature.
///
/// With `include_brow`, an eye region also swallows its eyebrow: the loop runs
/// along the brow and returns under the lower eyelid.
pub fn build_feature_region(landmarks: &LandmarkSet, feature: Feature, include_brow: bool) -> Region {
    let p = |i: usize| landmarks[i];

    let points = match feature {
        // 36 outer corner, 37-38 upper lid, 39 inner corner, 40-41 lower lid.
        Feature::LeftEye if include_brow => {
            let mut pts = landmarks.left_brow().to_vec();
            pts.extend([p(39), p(40), p(41), p(36)]);
            pts
        }
        // 42 inner corner, 43-44 upper lid, 45 outer corner, 46-47 lower lid.
        Feature::RightEye if include_brow => {
            let mut pts = landmarks.right_brow().to_vec();
            pts.extend([p(45), p(46), p(47), p(42)]);
            pts
        }
        Feature::LeftEye => landmarks.left_eye().to_vec(),
        Feature::RightEye => landmarks.right_eye().to_vec(),
        // Bridge top to tip, then the nostrils from right to left.
        Feature::Nose => vec![
            p(27),
            p(28),
            p(29),
            p(30),
            p(35),
            p(34),
            p(33),
            p(32),
            p(31),
        ],
        Feature::Mouth => landmarks.outer_lip().to_vec(),
    };

    Region::new(points)
}

/// Every region the mask pipeline composites, built in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRegions {
    pub silhouette: Region,
    pub features: Vec<(Feature, Region)>,
}

impl FaceRegions {
    pub fn build(landmarks: &LandmarkSet, forehead_offset_px: f32, include_brows: bool) -> Self {
        Self {
            silhouette: build_face_silhouette(landmarks, forehead_offset_px),
            features: Feature::ALL
                .iter()
                .map(|&f| (f, build_feature_region(landmarks, f, include_brows)))
                .collect(),
        }
    }

    pub fn feature(&self, feature: Feature) -> Option<&Region> {
        self.features
            .iter()
            .find(|(f, _)| *f == feature)
            .map(|(_, r)| r)
    }
}
