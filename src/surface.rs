use image::{Rgba, RgbaImage};

use crate::types::Point;

/// The pixel buffer a masking run paints on.
///
/// Always owns its pixels: creating a surface copies the source image once,
/// and nothing done to the surface is visible through the source.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    /// Draw `source` onto a fresh surface of the same size.
    pub fn from_image(source: &RgbaImage) -> Self {
        Self {
            image: source.clone(),
        }
    }

    /// A surface filled with a single RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(rgba)),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    /// RGBA at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// The nearest in-bounds pixel to `p`, after rounding.
    ///
    /// Returns `None` only for an empty surface.
    pub fn clamp_point(&self, p: Point) -> Option<(u32, u32)> {
        if self.is_empty() {
            return None;
        }
        let max_x = (self.width() - 1) as f32;
        let max_y = (self.height() - 1) as f32;
        // NaN coordinates clamp to the origin.
        let x = if p.x.is_nan() { 0.0 } else { p.x.round().clamp(0.0, max_x) };
        let y = if p.y.is_nan() { 0.0 } else { p.y.round().clamp(0.0, max_y) };
        Some((x as u32, y as u32))
    }

    pub fn center(&self) -> Point {
        Point::new(self.width() as f32 / 2.0, self.height() as f32 / 2.0)
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub(crate) fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}
