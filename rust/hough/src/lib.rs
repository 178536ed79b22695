// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Windowed Hough line detection
//!
//! Detects straight lines whose normals lie close to the horizontal or
//! vertical axes of a binary map. Only angles inside a tolerance window around
//! each axis (optionally skewed) are voted on, which keeps the accumulator
//! small when the orientations of interest are known in advance: ruled lines,
//! page edges, table grids.
//!
//! ## Pipeline
//!
//! 1. [`AngleSet::sample`]: candidate angles in four windowed segments
//! 2. [`accumulate`]: one vote per foreground pixel per angle in a padded
//!    [`VoteGrid`]
//! 3. [`find_peaks`]: 4-neighbour local maxima above a threshold
//! 4. [`rank_peaks`]: strongest first
//! 5. [`build_lines`]: back to `(distance, angle)`
//!
//! ## Quick Start
//!
//! ```rust
//! use straightener_hough::{find_lines, BinaryImage, HoughParams};
//!
//! // 20x20 map with one full column at x = 7
//! let mut data = vec![0u8; 400];
//! for row in 0..20 {
//!     data[row * 20 + 7] = 1;
//! }
//! let image = BinaryImage::packed(&data, 20, 20).unwrap();
//!
//! let params = HoughParams {
//!     threshold: 10,
//!     ..HoughParams::default()
//! };
//! let lines = find_lines(&image, &params).unwrap();
//! assert_eq!(lines[0].votes, 20);
//! ```

pub mod accumulator;
pub mod angles;
pub mod error;
pub mod image;
pub mod lines;
pub mod peaks;

pub use accumulator::{accumulate, distance_bins, round_half_away, VoteGrid};
#[cfg(feature = "parallel")]
pub use accumulator::accumulate_parallel;
pub use angles::{AngleBands, AngleSet};
pub use error::{HoughError, Result};
pub use image::BinaryImage;
pub use lines::{build_lines, HoughLine};
pub use peaks::{find_peaks, rank_peaks, Peak};

/// Parameters of one detection call
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HoughParams {
    /// Distance resolution, in pixels
    pub rho_step: f64,
    /// Angle resolution, in radians
    pub angle_step: f64,
    /// Votes a cell must exceed to count as a line
    pub threshold: u32,
    /// Half-width of the band searched around each axis, in radians
    pub window: f64,
    /// Skew applied to both axes, in radians
    pub adjustment: f64,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            rho_step: 1.0,
            angle_step: 0.1_f64.to_radians(),
            threshold: 0,
            window: 2.0_f64.to_radians(),
            adjustment: 0.0,
        }
    }
}

impl HoughParams {
    /// Reject parameters the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.rho_step.is_finite() && self.rho_step > 0.0) {
            return Err(HoughError::invalid(format!(
                "rho step must be positive, got {}",
                self.rho_step
            )));
        }
        if !(self.angle_step.is_finite() && self.angle_step > 0.0) {
            return Err(HoughError::invalid(format!(
                "angle step must be positive, got {}",
                self.angle_step
            )));
        }
        if !(self.window.is_finite() && self.window >= 0.0) {
            return Err(HoughError::invalid(format!(
                "window must be non-negative, got {}",
                self.window
            )));
        }
        if !self.adjustment.is_finite() {
            return Err(HoughError::invalid(format!(
                "adjustment must be finite, got {}",
                self.adjustment
            )));
        }
        Ok(())
    }
}

/// Detect near-axis-aligned lines in a binary map
///
/// Lines come back strongest first. Lines with equal votes appear in no
/// particular order. Every working buffer is owned by this call and released
/// on return, including on error.
pub fn find_lines(image: &BinaryImage<'_>, params: &HoughParams) -> Result<Vec<HoughLine>> {
    params.validate()?;

    let angles = AngleSet::sample(params.angle_step, params.window, params.adjustment)?;

    #[cfg(feature = "parallel")]
    let grid = accumulate_parallel(image, &angles, params.rho_step)?;
    #[cfg(not(feature = "parallel"))]
    let grid = accumulate(image, &angles, params.rho_step)?;

    let mut peaks = find_peaks(&grid, params.threshold);
    rank_peaks(&mut peaks);
    let lines = build_lines(&grid, &angles, &peaks, params.rho_step)?;

    tracing::debug!(
        width = image.width(),
        height = image.height(),
        angles = angles.len(),
        lines = lines.len(),
        "Line detection complete"
    );

    Ok(lines)
}
