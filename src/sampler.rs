//! Skin-tone sampling from raw surface pixels.
//!
//! No color science: channels are averaged as stored.

use crate::surface::RasterSurface;
use crate::types::{Color, LandmarkSet, Point};

/// Where to sample for a face: both cheeks, or the surface center when no
/// landmarks are available.
pub fn default_sample_points(surface: &RasterSurface, landmarks: Option<&LandmarkSet>) -> Vec<Point> {
    match landmarks {
        Some(set) => set.cheeks().to_vec(),
        None => vec![surface.center()],
    }
}

fn sample_pixels(surface: &RasterSurface, points: &[Point]) -> Vec<[u8; 4]> {
    let fallback = [surface.center()];
    let points = if points.is_empty() { &fallback[..] } else { points };

    points
        .iter()
        .filter_map(|p| surface.clamp_point(*p))
        .filter_map(|(x, y)| surface.pixel(x, y))
        .collect()
}

fn rounded_mean(sum: u32, count: u32) -> u8 {
    ((sum + count / 2) / count).min(255) as u8
}

/// Per-channel mean of the pixels under `points`.
///
/// Points are rounded to the nearest pixel and clamped into the surface. An
/// empty point list samples the surface center; an empty surface gives black.
pub fn sample_color(surface: &RasterSurface, points: &[Point]) -> Color {
    let pixels = sample_pixels(surface, points);
    if pixels.is_empty() {
        return Color::BLACK;
    }

    let n = pixels.len() as u32;
    let [r, g, b] = pixels.iter().fold([0u32; 3], |acc, px| {
        [
            acc[0] + px[0] as u32,
            acc[1] + px[1] as u32,
            acc[2] + px[2] as u32,
        ]
    });

    Color::new(rounded_mean(r, n), rounded_mean(g, n), rounded_mean(b, n))
}

/// Grey sample for desaturated surfaces: each pixel's unweighted RGB mean,
/// averaged over all points.
pub fn sample_luma(surface: &RasterSurface, points: &[Point]) -> Color {
    let pixels = sample_pixels(surface, points);
    if pixels.is_empty() {
        return Color::BLACK;
    }

    let total: f32 = pixels
        .iter()
        .map(|px| (px[0] as f32 + px[1] as f32 + px[2] as f32) / 3.0)
        .sum();
    let v = (total / pixels.len() as f32).round().clamp(0.0, 255.0) as u8;

    Color::grey(v)
}
