use crate::types::{BoundingBox, LandmarkSet, Point};

/// Approximate positions of the 68 iBUG landmarks on a frontal face, in
/// coordinates normalized to the face bounding box.
const MEAN_FACE: [(f32, f32); LandmarkSet::NUM_LANDMARKS] = [
    // Jaw line (0-16)
    (0.10, 0.35),
    (0.11, 0.45),
    (0.12, 0.55),
    (0.14, 0.65),
    (0.18, 0.73),
    (0.24, 0.80),
    (0.32, 0.85),
    (0.41, 0.88),
    (0.50, 0.89), // Chin center
    (0.59, 0.88),
    (0.68, 0.85),
    (0.76, 0.80),
    (0.82, 0.73),
    (0.86, 0.65),
    (0.88, 0.55),
    (0.89, 0.45),
    (0.90, 0.35),
    // Left eyebrow (17-21)
    (0.20, 0.26),
    (0.25, 0.22),
    (0.32, 0.21),
    (0.38, 0.23),
    (0.43, 0.27),
    // Right eyebrow (22-26)
    (0.57, 0.27),
    (0.62, 0.23),
    (0.68, 0.21),
    (0.75, 0.22),
    (0.80, 0.26),
    // Nose bridge (27-30)
    (0.50, 0.32),
    (0.50, 0.40),
    (0.50, 0.48),
    (0.50, 0.55),
    // Nose bottom (31-35)
    (0.40, 0.58),
    (0.45, 0.60),
    (0.50, 0.62),
    (0.55, 0.60),
    (0.60, 0.58),
    // Left eye (36-41)
    (0.24, 0.32),
    (0.28, 0.29),
    (0.34, 0.29),
    (0.38, 0.33),
    (0.34, 0.35),
    (0.28, 0.35),
    // Right eye (42-47)
    (0.62, 0.33),
    (0.66, 0.29),
    (0.72, 0.29),
    (0.76, 0.32),
    (0.72, 0.35),
    (0.66, 0.35),
    // Outer lip (48-59)
    (0.32, 0.72),
    (0.38, 0.68),
    (0.44, 0.66),
    (0.50, 0.67),
    (0.56, 0.66),
    (0.62, 0.68),
    (0.68, 0.72),
    (0.62, 0.78),
    (0.56, 0.80),
    (0.50, 0.81),
    (0.44, 0.80),
    (0.38, 0.78),
    // Inner lip (60-67)
    (0.36, 0.72),
    (0.44, 0.70),
    (0.50, 0.70),
    (0.56, 0.70),
    (0.64, 0.72),
    (0.56, 0.74),
    (0.50, 0.75),
    (0.44, 0.74),
];

impl LandmarkSet {
    /// The average frontal face placed inside `face`.
    ///
    /// Used when the face box is known (e.g. drawn by hand) but no landmark
    /// model has run, and as a fixture for tests.
    pub fn mean_face(face: &BoundingBox) -> Self {
        let points = MEAN_FACE
            .iter()
            .map(|&(x, y)| face.denormalize_point(Point::new(x, y)))
            .collect();
        Self::from_points_unchecked(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_face_fills_the_box() {
        let face = BoundingBox::new(100.0, 50.0, 200.0, 200.0);
        let set = LandmarkSet::mean_face(&face);

        assert_eq!(set.points().len(), 68);
        // Chin center
        assert!((set[8].x - 200.0).abs() < 1e-4);
        assert!((set[8].y - 228.0).abs() < 1e-4);
        for p in set.points() {
            assert!(p.x >= face.x && p.x <= face.x + face.width);
            assert!(p.y >= face.y && p.y <= face.y + face.height);
        }
    }
}
