// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Straightening configuration
//!
//! All angles in this module are in degrees.

use crate::error::{Result, StraightenError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How per-line deviations are combined into one rotation estimate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AngleAggregate {
    Mean,
    Median,
    /// Mean of the values within one standard deviation of the mean
    TrimmedMean,
}

/// One Hough pass of the rotation estimate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PassConfig {
    /// Distance resolution in thumbnail pixels
    pub rho_step: f64,
    /// Angle resolution
    pub angle_step: f64,
    /// Search window around each axis; `None` uses `max_angle`
    pub window: Option<f64>,
    pub aggregate: AngleAggregate,
}

/// Configuration for rotation estimation and correction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StraightenConfig {
    /// Shrinking factor applied before line detection
    pub resize_factor: f64,
    /// Maximum expected rotation from the vertical/horizontal
    pub max_angle: f64,
    /// Gray level above which a pixel counts as paper
    pub bin_threshold: u8,
    /// Extra margin cropped on every side before detection (pixels)
    pub min_crop: u32,
    /// Minimum line votes as a fraction of the thumbnail width
    pub accumulator_ratio: f64,
    /// Brightness jump that marks the end of the rotation border
    pub border_threshold: i16,
    /// Coarse pass around the axes
    pub coarse: PassConfig,
    /// Fine pass around the coarse estimate
    pub fine: PassConfig,
    /// Pad or crop the output to `(width, height)`
    pub output_size: Option<(u32, u32)>,
    /// Fill for padding added by `output_size`
    pub pad_color: [u8; 3],
    /// Write binary maps, line overlays and line dumps here
    pub graph_dir: Option<PathBuf>,
}

impl Default for StraightenConfig {
    fn default() -> Self {
        Self {
            resize_factor: 5.0,
            max_angle: 4.0,
            bin_threshold: 200,
            min_crop: 20,
            accumulator_ratio: 2.0 / 3.0,
            border_threshold: 100,
            coarse: PassConfig {
                rho_step: 1.0,
                angle_step: 0.1,
                window: None,
                aggregate: AngleAggregate::TrimmedMean,
            },
            fine: PassConfig {
                rho_step: 1.0,
                angle_step: 0.01,
                window: Some(0.1),
                aggregate: AngleAggregate::Median,
            },
            output_size: None,
            pad_color: [255, 255, 255],
            graph_dir: None,
        }
    }
}

impl StraightenConfig {
    /// Load a configuration from a JSON file; missing fields keep defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values the pipeline divides by or crops with
    pub fn validate(&self) -> Result<()> {
        if !(self.resize_factor.is_finite() && self.resize_factor > 0.0) {
            return Err(StraightenError::InvalidConfig(format!(
                "resize_factor must be positive, got {}",
                self.resize_factor
            )));
        }
        if !(self.max_angle.is_finite() && self.max_angle >= 0.0 && self.max_angle < 45.0) {
            return Err(StraightenError::InvalidConfig(format!(
                "max_angle must be in [0, 45), got {}",
                self.max_angle
            )));
        }
        if !(self.accumulator_ratio.is_finite() && self.accumulator_ratio >= 0.0) {
            return Err(StraightenError::InvalidConfig(format!(
                "accumulator_ratio must be non-negative, got {}",
                self.accumulator_ratio
            )));
        }
        for (name, pass) in [("coarse", &self.coarse), ("fine", &self.fine)] {
            if !(pass.rho_step > 0.0 && pass.angle_step > 0.0) {
                return Err(StraightenError::InvalidConfig(format!(
                    "{} pass steps must be positive",
                    name
                )));
            }
            if matches!(pass.window, Some(w) if !(w >= 0.0)) {
                return Err(StraightenError::InvalidConfig(format!(
                    "{} pass window must be non-negative",
                    name
                )));
            }
        }
        if matches!(self.output_size, Some((w, h)) if w == 0 || h == 0) {
            return Err(StraightenError::InvalidConfig(
                "output_size must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
