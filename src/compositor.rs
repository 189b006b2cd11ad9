//! Clipped drawing onto a [`RasterSurface`].
//!
//! Every operation rasterizes its region into a tiny-skia clip mask
//! (non-zero winding, no anti-aliasing) and then writes the covered pixels
//! directly, so pixels outside the mask are never read back or rewritten.

use log::trace;
use serde::{Deserialize, Serialize};
use tiny_skia::{FillRule, Mask, Path, PathBuilder, Transform};

use crate::geometry::{clip_segment, scaled_about_centroid};
use crate::surface::RasterSurface;
use crate::types::{Color, Point, Region};

/// How an erased feature looks afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EraseMode {
    /// Paint the region with a solid color.
    Fill(Color),
    /// Make the region fully transparent.
    Clear,
}

/// Erase settings: what to paint, and how much to grow the region first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Erase {
    pub mode: EraseMode,
    /// Scale about the region centroid applied before clipping. 1.0 keeps the
    /// landmark polygon as is.
    pub scale_factor: f32,
}

impl Erase {
    pub fn clear(scale_factor: f32) -> Self {
        Self {
            mode: EraseMode::Clear,
            scale_factor,
        }
    }

    pub fn fill(color: Color, scale_factor: f32) -> Self {
        Self {
            mode: EraseMode::Fill(color),
            scale_factor,
        }
    }
}

fn region_path(points: &[Point]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }

    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.close();
    pb.finish()
}

/// Coverage mask for `path` sized to the surface.
fn clip_mask(surface: &RasterSurface, path: &Path) -> Option<Mask> {
    let mut mask = Mask::new(surface.width(), surface.height())?;
    mask.fill_path(path, FillRule::Winding, false, Transform::identity());
    Some(mask)
}

/// Overwrite every pixel covered by `mask` with `rgba`.
fn write_masked(surface: &mut RasterSurface, mask: &Mask, rgba: [u8; 4]) -> usize {
    let mut written = 0;
    for (px, &coverage) in surface
        .image_mut()
        .pixels_mut()
        .zip(mask.data().iter())
    {
        if coverage != 0 {
            px.0 = rgba;
            written += 1;
        }
    }
    written
}

fn paint_region(surface: &mut RasterSurface, region: &Region, rgba: [u8; 4]) {
    if region.is_degenerate() {
        trace!("skipping degenerate region with {} point(s)", region.len());
        return;
    }
    let Some(path) = region_path(&region.points) else {
        trace!("region has no area, nothing to paint");
        return;
    };
    let Some(mask) = clip_mask(surface, &path) else {
        return;
    };
    let written = write_masked(surface, &mask, rgba);
    trace!("painted {written} pixel(s) with {rgba:?}");
}

/// Paint `region` with an opaque `color`.
///
/// The paint covers the whole surface and the region clip restricts it, so
/// the result is bounded by the surface, not the region. Degenerate regions
/// are a no-op.
pub fn fill_region(surface: &mut RasterSurface, region: &Region, color: Color) {
    paint_region(surface, region, color.to_rgba());
}

/// Erase `region` according to `erase`.
///
/// The region is scaled about its centroid before clipping; `region` itself
/// is not modified.
pub fn erase_region(surface: &mut RasterSurface, region: &Region, erase: &Erase) {
    let clip = if erase.scale_factor == 1.0 {
        region.clone()
    } else {
        scaled_about_centroid(region, erase.scale_factor)
    };

    let rgba = match erase.mode {
        EraseMode::Fill(color) => color.to_rgba(),
        EraseMode::Clear => [0, 0, 0, 0],
    };
    paint_region(surface, &clip, rgba);
}

/// Replace R, G and B of every pixel with their unweighted mean.
///
/// Alpha is kept. Applying it twice is the same as applying it once.
pub fn desaturate(surface: &mut RasterSurface) {
    for px in surface.image_mut().pixels_mut() {
        let [r, g, b, a] = px.0;
        let v = ((r as u16 + g as u16 + b as u16) as f32 / 3.0).round() as u8;
        px.0 = [v, v, v, a];
    }
}

/// Freehand brush: paint discs of `radius` along `stroke` with `color`.
///
/// Consecutive stroke points are joined by extra discs spaced at most half
/// a radius apart so a fast stroke still leaves a continuous line. Segments
/// are clipped to the surface grown by `radius` first; parts that cannot
/// reach a pixel are skipped.
pub fn paint_brush(surface: &mut RasterSurface, stroke: &[Point], radius: f32, color: Color) {
    if stroke.is_empty() || !(radius.is_finite() && radius > 0.0) {
        return;
    }

    let reach_min = Point::new(-radius, -radius);
    let reach_max = Point::new(
        surface.width() as f32 + radius,
        surface.height() as f32 + radius,
    );
    let segments: Vec<(Point, Point)> = match stroke {
        [only] => vec![(*only, *only)],
        _ => stroke.windows(2).map(|pair| (pair[0], pair[1])).collect(),
    };

    let step = (radius / 2.0).max(0.5);
    let mut centers = Vec::new();
    for (a, b) in segments {
        let Some((a, b)) = clip_segment(a, b, reach_min, reach_max) else {
            continue;
        };
        let steps = (a.distance(&b) / step).ceil().max(1.0) as usize;
        centers.extend((0..=steps).map(|i| a + (b - a) * (i as f32 / steps as f32)));
    }
    if centers.is_empty() {
        trace!("brush stroke misses the surface");
        return;
    }

    let mut pb = PathBuilder::new();
    for c in &centers {
        pb.push_circle(c.x, c.y, radius);
    }
    let Some(path) = pb.finish() else {
        return;
    };
    let Some(mask) = clip_mask(surface, &path) else {
        return;
    };
    let written = write_masked(surface, &mask, color.to_rgba());
    trace!("brush stroke of {} point(s) painted {written} pixel(s)", stroke.len());
}
