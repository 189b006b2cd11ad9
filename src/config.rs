//! Mask pipeline configuration.
//!
//! Every knob the pipeline has lives in [`MaskOptions`]. Defaults are tuned
//! for a frontal face a few hundred pixels tall; none of them is derived from
//! face scale.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compositor::{Erase, EraseMode};
use crate::error::{Error, Result};
use crate::types::Color;

pub const DEFAULT_FOREHEAD_OFFSET_PX: f32 = 50.0;
pub const DEFAULT_REGION_SCALE_FACTOR: f32 = 1.4;
pub const DEFAULT_BRUSH_RADIUS: f32 = 10.0;

/// How features are erased once the face is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EraseStyle {
    /// Solid overwrite with `erase_color`.
    Fill,
    /// Cut to full transparency.
    #[default]
    Clear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaskOptions {
    /// How far the eyebrows are lifted to estimate the forehead line.
    pub forehead_offset_px: f32,
    pub erase_style: EraseStyle,
    /// Color for [`EraseStyle::Fill`]. `None` reuses the sampled skin tone,
    /// which hides the features entirely.
    pub erase_color: Option<Color>,
    /// Growth applied to feature regions about their centroid before erasing.
    pub region_scale_factor: f32,
    /// Convert the surface to grey before sampling and filling.
    pub desaturate_before_sample: bool,
    /// Merge each eyebrow into its eye region.
    pub include_brows: bool,
    /// Default radius for freehand brush strokes.
    pub brush_radius: f32,
}

impl Default for MaskOptions {
    fn default() -> Self {
        Self {
            forehead_offset_px: DEFAULT_FOREHEAD_OFFSET_PX,
            erase_style: EraseStyle::default(),
            erase_color: Some(Color::BLACK),
            region_scale_factor: DEFAULT_REGION_SCALE_FACTOR,
            desaturate_before_sample: false,
            include_brows: true,
            brush_radius: DEFAULT_BRUSH_RADIUS,
        }
    }
}

impl MaskOptions {
    /// Load options from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.forehead_offset_px.is_finite() {
            return Err(Error::InvalidOptions(format!(
                "forehead_offset_px must be finite, got {}",
                self.forehead_offset_px
            )));
        }
        if !(self.region_scale_factor.is_finite() && self.region_scale_factor > 0.0) {
            return Err(Error::InvalidOptions(format!(
                "region_scale_factor must be a positive number, got {}",
                self.region_scale_factor
            )));
        }
        if !(self.brush_radius.is_finite() && self.brush_radius > 0.0) {
            return Err(Error::InvalidOptions(format!(
                "brush_radius must be a positive number, got {}",
                self.brush_radius
            )));
        }
        Ok(())
    }

    /// Erase settings for a run whose sampled skin tone is `sampled`.
    pub fn erase(&self, sampled: Color) -> Erase {
        let mode = match self.erase_style {
            EraseStyle::Clear => EraseMode::Clear,
            EraseStyle::Fill => EraseMode::Fill(self.erase_color.unwrap_or(sampled)),
        };
        Erase {
            mode,
            scale_factor: self.region_scale_factor,
        }
    }
}
