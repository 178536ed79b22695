// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Candidate angle sampling around the horizontal and vertical axes
//!
//! The sampled set has four contiguous segments:
//! 1. a low band starting at (or near) 0, ascending
//! 2. a half-window descending from the skewed midpoint `π/2 + adj`
//! 3. a half-window ascending from the same midpoint
//! 4. a high band ending at (or near) π, descending
//!
//! The skew moves either the low band or the high band, whichever keeps both
//! bands inside `[0, π]`. Coverage that would leave the range on one side is
//! moved onto the other band.

use crate::error::{HoughError, Result};
use std::f64::consts::{FRAC_PI_2, PI};

/// Extents of the four sampled segments, in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleBands {
    pub bottom_start: f64,
    pub bottom_window: f64,
    pub mid_point: f64,
    pub window: f64,
    pub top_end: f64,
    pub top_window: f64,
}

impl AngleBands {
    /// Lay out the bands for a tolerance `window` and a signed skew `adjustment`
    pub fn new(window: f64, adjustment: f64) -> Self {
        let adj = -adjustment;

        let (bottom_start, bottom_end, top_start, top_end) = if adj < 0.0 {
            let top_point = PI + adj;
            (
                0.0,
                (top_point + window - PI).max(0.0),
                top_point - window,
                PI.min(top_point + window),
            )
        } else {
            let bottom_point = adj;
            (
                (bottom_point - window).max(0.0),
                bottom_point + window,
                PI.min(PI + (bottom_point - window)),
                PI,
            )
        };

        Self {
            bottom_start,
            bottom_window: bottom_end - bottom_start,
            mid_point: FRAC_PI_2 + adj,
            window,
            top_end,
            top_window: top_end - top_start,
        }
    }

    /// Number of samples in each segment, in sampling order
    pub fn segment_counts(&self, angle_step: f64) -> Result<[usize; 4]> {
        let mid = samples(self.window, angle_step)?;
        Ok([
            samples(self.bottom_window, angle_step)?,
            mid,
            mid,
            samples(self.top_window, angle_step)?,
        ])
    }

    pub fn angle_count(&self, angle_step: f64) -> Result<usize> {
        self.segment_counts(angle_step)?
            .iter()
            .try_fold(0usize, |total, &n| total.checked_add(n))
            .ok_or_else(too_many_angles)
    }
}

fn too_many_angles() -> HoughError {
    HoughError::Allocation {
        what: "angle table",
        cells: usize::MAX,
    }
}

/// `ceil(width / step)`, treating empty or negative widths as zero samples
fn samples(width: f64, step: f64) -> Result<usize> {
    let n = (width / step).ceil();
    if !(n > 0.0) {
        return Ok(0);
    }
    if n >= usize::MAX as f64 {
        return Err(too_many_angles());
    }
    Ok(n as usize)
}

/// Ordered candidate angles for one detection call
#[derive(Debug, Clone, PartialEq)]
pub struct AngleSet {
    angles: Vec<f64>,
}

impl AngleSet {
    /// Sample the windowed bands at `angle_step`
    ///
    /// Callers must pass `angle_step > 0` and `window >= 0`; otherwise the
    /// set is empty or degenerate. A step so fine that the table cannot be
    /// held fails with [`HoughError::Allocation`].
    pub fn sample(angle_step: f64, window: f64, adjustment: f64) -> Result<Self> {
        let bands = AngleBands::new(window, adjustment);
        let [bottom, mid, _, top] = bands.segment_counts(angle_step)?;
        let count = bands.angle_count(angle_step)?;

        let mut angles = Vec::new();
        angles
            .try_reserve_exact(count)
            .map_err(|_| HoughError::Allocation {
                what: "angle table",
                cells: count,
            })?;
        angles.extend((0..bottom).map(|k| bands.bottom_start + k as f64 * angle_step));
        angles.extend((0..mid).map(|k| bands.mid_point - k as f64 * angle_step));
        angles.extend((0..mid).map(|k| bands.mid_point + k as f64 * angle_step));
        angles.extend((0..top).map(|k| bands.top_end - k as f64 * angle_step));

        tracing::trace!(
            bottom,
            mid,
            top,
            mid_point = bands.mid_point,
            "Sampled candidate angles"
        );

        Ok(Self { angles })
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.angles.get(index).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.angles
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.angles.iter().copied()
    }
}
