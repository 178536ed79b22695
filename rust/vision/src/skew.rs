// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rotation estimation from near-axis-aligned lines
//!
//! A rotated page turns its ruled lines and text baselines away from the
//! axes. Every detected line is classified by the axis it is closest to and
//! converted to a signed deviation in degrees. The deviations are combined
//! into one estimate. The estimate is the clockwise rotation that undoes the
//! skew.

use crate::config::{AngleAggregate, PassConfig, StraightenConfig};
use crate::error::Result;
use crate::image_ops::{binarize_inverted, crop_margins, make_thumbnail};
use image::GrayImage;
use serde::{Deserialize, Serialize};
use straightener_hough::{find_lines, BinaryImage, HoughLine, HoughParams};

/// Inclusive degree ranges around 0°, 90° and 180°, shifted by a guess
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBands {
    pub bottom: (f64, f64),
    pub mid: (f64, f64),
    pub top: (f64, f64),
}

impl AxisBands {
    pub fn new(guess: f64, max_angle: f64) -> Self {
        let band = |axis: f64| {
            let a = axis - guess - max_angle;
            let b = axis - guess + max_angle;
            (a.min(b), a.max(b))
        };
        Self {
            bottom: band(0.0),
            mid: band(90.0),
            top: band(180.0),
        }
    }

    /// Deviation from the nearest axis for a line normal at `angle` degrees
    ///
    /// Returns `None` when the angle lies outside every band.
    pub fn deviation(&self, angle: f64) -> Option<f64> {
        let within = |(lo, hi): (f64, f64)| angle >= lo && angle <= hi;
        if within(self.mid) {
            Some(90.0 - angle)
        } else if within(self.bottom) {
            Some(-angle)
        } else if within(self.top) {
            Some(180.0 - angle)
        } else {
            None
        }
    }
}

impl AngleAggregate {
    /// Combine deviations; an empty input gives 0
    pub fn apply(self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let estimate = match self {
            AngleAggregate::Mean => mean(values),
            AngleAggregate::Median => median(values),
            AngleAggregate::TrimmedMean => trimmed_mean(values),
        };
        if estimate.is_nan() {
            0.0
        } else {
            estimate
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Mean of the values within one (population) standard deviation of the mean
fn trimmed_mean(values: &[f64]) -> f64 {
    let m = mean(values);
    let std = (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt();
    let (lo, hi) = (m - std, m + std);

    let kept: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| *v >= lo && *v <= hi)
        .collect();
    if kept.is_empty() {
        m
    } else {
        mean(&kept)
    }
}

/// Result of one Hough pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkewEstimate {
    /// Combined deviation in degrees
    pub angle: f64,
    /// Every line the pass detected, strongest first
    pub lines: Vec<HoughLine>,
    /// Lines that fell inside an axis band
    pub used: usize,
}

/// Run one Hough pass over an inverted binary map
///
/// `guess` and `window` are in degrees. Lines must collect more votes than
/// `accumulator_ratio` times the map width.
pub fn estimate_skew(
    binary: &GrayImage,
    pass: &PassConfig,
    window: f64,
    guess: f64,
    accumulator_ratio: f64,
) -> Result<SkewEstimate> {
    let image = BinaryImage::packed(
        binary.as_raw(),
        binary.width() as usize,
        binary.height() as usize,
    )?;
    let params = HoughParams {
        rho_step: pass.rho_step,
        angle_step: pass.angle_step.to_radians(),
        threshold: (binary.width() as f64 * accumulator_ratio) as u32,
        window: window.to_radians(),
        adjustment: guess.to_radians(),
    };
    let lines = find_lines(&image, &params)?;

    let bands = AxisBands::new(guess, window);
    let deviations: Vec<f64> = lines
        .iter()
        .filter_map(|line| bands.deviation(line.angle_degrees()))
        .collect();
    let angle = pass.aggregate.apply(&deviations);

    tracing::debug!(
        lines = lines.len(),
        used = deviations.len(),
        guess,
        window,
        angle,
        "Skew pass complete"
    );

    Ok(SkewEstimate {
        angle,
        lines,
        used: deviations.len(),
    })
}

/// Two-pass rotation estimate, in degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RotationEstimate {
    /// Coarse pass around the axes
    pub coarse: f64,
    /// Fine pass around the coarse estimate; this is the correction applied
    pub fine: f64,
}

/// Intermediate products of [`analyze_rotation`], kept for debug output
#[derive(Debug, Clone)]
pub struct RotationAnalysis {
    pub estimate: RotationEstimate,
    /// Downsized grayscale page after margin cropping
    pub thumbnail: GrayImage,
    /// Inverted binary map of the thumbnail
    pub binary: GrayImage,
    pub coarse: SkewEstimate,
    pub fine: SkewEstimate,
}

/// Estimate the page rotation and keep the intermediate images and lines
pub fn analyze_rotation(gray: &GrayImage, config: &StraightenConfig) -> Result<RotationAnalysis> {
    config.validate()?;

    // Rotation drags the page edge into view; crop it away first
    let spill = config.max_angle.to_radians().sin();
    let margin_x = (spill * gray.height() as f64).ceil() as u32 + config.min_crop;
    let margin_y = (spill * gray.width() as f64).ceil() as u32 + config.min_crop;
    let cropped = crop_margins(gray, margin_x, margin_y)?;

    let thumbnail = make_thumbnail(&cropped, config.resize_factor);
    let binary = binarize_inverted(&thumbnail, config.bin_threshold);

    let coarse = estimate_skew(
        &binary,
        &config.coarse,
        config.coarse.window.unwrap_or(config.max_angle),
        0.0,
        config.accumulator_ratio,
    )?;
    let fine = estimate_skew(
        &binary,
        &config.fine,
        config.fine.window.unwrap_or(config.max_angle),
        coarse.angle,
        config.accumulator_ratio,
    )?;

    let estimate = RotationEstimate {
        coarse: coarse.angle,
        fine: fine.angle,
    };
    tracing::info!(
        coarse = estimate.coarse,
        fine = estimate.fine,
        width = binary.width(),
        height = binary.height(),
        "Estimated rotation"
    );

    Ok(RotationAnalysis {
        estimate,
        thumbnail,
        binary,
        coarse,
        fine,
    })
}

/// Estimate the page rotation in degrees
pub fn detect_rotation(gray: &GrayImage, config: &StraightenConfig) -> Result<RotationEstimate> {
    Ok(analyze_rotation(gray, config)?.estimate)
}
