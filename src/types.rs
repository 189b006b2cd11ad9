use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A 2D point in image pixel space (origin top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// The same point moved `dy` pixels toward the top of the image.
    pub fn raised(self, dy: f32) -> Self {
        Self::new(self.x, self.y - dy)
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// A bounding box defined by top-left corner, width, and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Convert a point from normalized coordinates [0,1] to image coordinates
    /// within this bounding box.
    pub fn denormalize_point(&self, p: Point) -> Point {
        Point::new(self.x + p.x * self.width, self.y + p.y * self.height)
    }
}

/// The 68 landmarks of a single face, in the standard iBUG/dlib ordering.
///
/// Feature groups are fixed slices of the point list:
///
/// | group         | indices  |
/// |---------------|----------|
/// | jaw           | 0..=16   |
/// | left eyebrow  | 17..=21  |
/// | right eyebrow | 22..=26  |
/// | nose          | 27..=35  |
/// | left eye      | 36..=41  |
/// | right eye     | 42..=47  |
/// | mouth         | 48..=67  |
///
/// "Left" and "right" are as seen in the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    pub const NUM_LANDMARKS: usize = 68;

    pub const JAW: RangeInclusive<usize> = 0..=16;
    pub const LEFT_BROW: RangeInclusive<usize> = 17..=21;
    pub const RIGHT_BROW: RangeInclusive<usize> = 22..=26;
    pub const NOSE: RangeInclusive<usize> = 27..=35;
    pub const LEFT_EYE: RangeInclusive<usize> = 36..=41;
    pub const RIGHT_EYE: RangeInclusive<usize> = 42..=47;
    pub const MOUTH: RangeInclusive<usize> = 48..=67;
    pub const OUTER_LIP: RangeInclusive<usize> = 48..=59;
    pub const INNER_LIP: RangeInclusive<usize> = 60..=67;

    /// Left and right cheek landmarks on the jaw line.
    pub const CHEEKS: [usize; 2] = [3, 13];

    pub fn new(points: Vec<Point>) -> crate::Result<Self> {
        if points.len() != Self::NUM_LANDMARKS {
            return Err(Error::InvalidLandmarks {
                expected: Self::NUM_LANDMARKS,
                found: points.len(),
            });
        }
        Ok(Self { points })
    }

    pub(crate) fn from_points_unchecked(points: Vec<Point>) -> Self {
        debug_assert_eq!(points.len(), Self::NUM_LANDMARKS);
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn jaw(&self) -> &[Point] {
        &self.points[Self::JAW]
    }

    pub fn left_brow(&self) -> &[Point] {
        &self.points[Self::LEFT_BROW]
    }

    pub fn right_brow(&self) -> &[Point] {
        &self.points[Self::RIGHT_BROW]
    }

    pub fn nose(&self) -> &[Point] {
        &self.points[Self::NOSE]
    }

    pub fn left_eye(&self) -> &[Point] {
        &self.points[Self::LEFT_EYE]
    }

    pub fn right_eye(&self) -> &[Point] {
        &self.points[Self::RIGHT_EYE]
    }

    pub fn mouth(&self) -> &[Point] {
        &self.points[Self::MOUTH]
    }

    pub fn outer_lip(&self) -> &[Point] {
        &self.points[Self::OUTER_LIP]
    }

    pub fn cheeks(&self) -> [Point; 2] {
        Self::CHEEKS.map(|i| self.points[i])
    }
}

impl TryFrom<Vec<Point>> for LandmarkSet {
    type Error = Error;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<LandmarkSet> for Vec<Point> {
    fn from(set: LandmarkSet) -> Self {
        set.points
    }
}

impl std::ops::Index<usize> for LandmarkSet {
    type Output = Point;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.points[idx]
    }
}

/// A single face found by a landmark provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bounding_box: BoundingBox,
    pub landmarks: LandmarkSet,
}

/// A closed polygon; the last point implicitly connects back to the first.
///
/// Fewer than two points is degenerate and compositing it does nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Region {
    pub points: Vec<Point>,
}

impl Region {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2
    }
}

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn grey(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parses `#rrggbb` (the leading `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || Error::InvalidOptions(format!("invalid color {s:?}, expected #rrggbb"));
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, 4.0);

        let sum = a + b;
        assert_eq!(sum.x, 4.0);
        assert_eq!(sum.y, 6.0);

        let diff = b - a;
        assert_eq!(diff.x, 2.0);
        assert_eq!(diff.y, 2.0);

        let scaled = a * 2.0;
        assert_eq!(scaled.x, 2.0);
        assert_eq!(scaled.y, 4.0);

        assert_eq!(a.raised(5.0), Point::new(1.0, -3.0));
    }

    #[test]
    fn landmark_groups_partition_all_points() {
        let points: Vec<Point> = (0..68).map(|i| Point::new(i as f32, 0.0)).collect();
        let set = LandmarkSet::new(points).unwrap();

        assert_eq!(set.jaw().len(), 17);
        assert_eq!(set.left_brow().len(), 5);
        assert_eq!(set.right_brow().len(), 5);
        assert_eq!(set.nose().len(), 9);
        assert_eq!(set.left_eye().len(), 6);
        assert_eq!(set.right_eye().len(), 6);
        assert_eq!(set.mouth().len(), 20);

        assert_eq!(set.left_brow()[0].x, 17.0);
        assert_eq!(set.mouth()[19].x, 67.0);
        assert_eq!(set.cheeks(), [Point::new(3.0, 0.0), Point::new(13.0, 0.0)]);
    }

    #[test]
    fn landmark_set_rejects_wrong_count() {
        let err = LandmarkSet::new(vec![Point::zero(); 5]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidLandmarks {
                expected: 68,
                found: 5
            }
        ));
    }

    #[test]
    fn landmark_set_json_requires_68_points() {
        let json = serde_json::to_string(&vec![Point::new(1.0, 2.0); 68]).unwrap();
        let set: LandmarkSet = serde_json::from_str(&json).unwrap();
        assert_eq!(set.points().len(), 68);

        let short = serde_json::to_string(&vec![Point::new(1.0, 2.0); 67]).unwrap();
        assert!(serde_json::from_str::<LandmarkSet>(&short).is_err());
    }

    #[test]
    fn color_hex() {
        let c: Color = "#c89664".parse().unwrap();
        assert_eq!(c, Color::new(200, 150, 100));
        assert_eq!(c.to_string(), "#c89664");
        assert_eq!("00ff00".parse::<Color>().unwrap(), Color::new(0, 255, 0));
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());

        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#c89664\"");
    }
}
