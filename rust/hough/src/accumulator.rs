// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vote accumulation in quantized (angle, distance) space

use crate::angles::AngleSet;
use crate::error::{HoughError, Result};
use crate::image::BinaryImage;

/// Round to the nearest integer, ties away from zero
#[inline]
pub fn round_half_away(x: f64) -> i64 {
    x.round() as i64
}

/// Number of distance bins for an image of the given size
///
/// `ceil(((width + height) * 2 + 1) / rho_step)`
pub fn distance_bins(width: usize, height: usize, rho_step: f64) -> Result<usize> {
    let span = ((width + height) * 2 + 1) as f64;
    let bins = (span / rho_step).ceil();
    if !bins.is_finite() || bins < 1.0 || bins > (usize::MAX / 2) as f64 {
        return Err(HoughError::invalid(format!(
            "rho step {} gives {} distance bins",
            rho_step, bins
        )));
    }
    Ok(bins as usize)
}

/// Accumulator grid with a one-cell zero border on every side
///
/// Rows are angle indices, columns are distance indices. Interior cell
/// `(a, d)` lives at row `a + 1`, column `d + 1`, so every interior cell has
/// four in-bounds neighbours. Border cells are never written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteGrid {
    num_angles: usize,
    num_dist: usize,
    cells: Vec<u32>,
    dropped: usize,
}

impl VoteGrid {
    /// Allocate a zeroed grid for `num_angles × num_dist` interior cells
    pub fn new(num_angles: usize, num_dist: usize) -> Result<Self> {
        let total = (num_angles + 2)
            .checked_mul(num_dist + 2)
            .ok_or(HoughError::Allocation {
                what: "vote grid",
                cells: usize::MAX,
            })?;

        let mut cells = Vec::new();
        cells
            .try_reserve_exact(total)
            .map_err(|_| HoughError::Allocation {
                what: "vote grid",
                cells: total,
            })?;
        cells.resize(total, 0);

        Ok(Self {
            num_angles,
            num_dist,
            cells,
            dropped: 0,
        })
    }

    pub fn num_angles(&self) -> usize {
        self.num_angles
    }

    pub fn num_dist(&self) -> usize {
        self.num_dist
    }

    /// Padded row count (`num_angles + 2`)
    pub fn rows(&self) -> usize {
        self.num_angles + 2
    }

    /// Padded column count, which is also the linear row pitch
    pub fn cols(&self) -> usize {
        self.num_dist + 2
    }

    /// Distance index of the zero-distance bin
    pub fn center(&self) -> i64 {
        (self.num_dist as i64 - 1) / 2
    }

    /// Votes that fell outside `[0, num_dist)` and were discarded
    pub fn dropped_votes(&self) -> usize {
        self.dropped
    }

    /// Padded cell lookup; `None` outside the grid
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        if row < self.rows() && col < self.cols() {
            Some(self.cells[row * self.cols() + col])
        } else {
            None
        }
    }

    /// Votes for interior cell `(a, d)`; `None` outside the interior
    pub fn votes(&self, a: usize, d: usize) -> Option<u32> {
        if a < self.num_angles && d < self.num_dist {
            self.get(a + 1, d + 1)
        } else {
            None
        }
    }

    /// Linear index of interior cell `(a, d)`
    pub fn index_of(&self, a: usize, d: usize) -> usize {
        (a + 1) * self.cols() + d + 1
    }

    /// Interior `(a, d)` of a linear index produced by [`Self::index_of`]
    ///
    /// Returns `None` for border cells and indices past the grid.
    pub fn coords_of(&self, index: usize) -> Option<(usize, usize)> {
        let (row, col) = (index / self.cols(), index % self.cols());
        if (1..=self.num_angles).contains(&row) && (1..=self.num_dist).contains(&col) {
            Some((row - 1, col - 1))
        } else {
            None
        }
    }

    /// Cell value by linear index
    pub fn cell(&self, index: usize) -> u32 {
        self.cells[index]
    }

    /// Add one vote to interior cell `(a, d)`
    ///
    /// Returns `false` and leaves the grid untouched when `(a, d)` is not an
    /// interior cell.
    pub fn increment(&mut self, a: usize, d: usize) -> bool {
        if a >= self.num_angles || d >= self.num_dist {
            return false;
        }
        let idx = self.index_of(a, d);
        self.cells[idx] += 1;
        true
    }

    pub fn total_votes(&self) -> u64 {
        self.cells.iter().map(|&v| v as u64).sum()
    }

    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    fn merge(&mut self, other: &VoteGrid) {
        debug_assert_eq!(self.cells.len(), other.cells.len());
        for (dst, src) in self.cells.iter_mut().zip(&other.cells) {
            *dst += *src;
        }
        self.dropped += other.dropped;
    }
}

/// Precomputed `cos/rho_step` and `sin/rho_step` per candidate angle
struct VoteTables {
    cos: Vec<f64>,
    sin: Vec<f64>,
}

impl VoteTables {
    fn new(angles: &AngleSet, rho_step: f64) -> Result<Self> {
        let irho = 1.0 / rho_step;
        let mut cos: Vec<f64> = Vec::new();
        let mut sin: Vec<f64> = Vec::new();
        for table in [&mut cos, &mut sin] {
            table
                .try_reserve_exact(angles.len())
                .map_err(|_| HoughError::Allocation {
                    what: "trig table",
                    cells: angles.len(),
                })?;
        }
        for angle in angles.iter() {
            cos.push(angle.cos() * irho);
            sin.push(angle.sin() * irho);
        }
        Ok(Self { cos, sin })
    }

    fn vote_row(&self, grid: &mut VoteGrid, image: &BinaryImage<'_>, i: usize) {
        let center = grid.center();
        let num_dist = grid.num_dist() as i64;
        for (j, _) in image.row(i).iter().enumerate().filter(|(_, v)| **v != 0) {
            for (n, (c, s)) in self.cos.iter().zip(&self.sin).enumerate() {
                let d = round_half_away(j as f64 * c + i as f64 * s) + center;
                if d < 0 || d >= num_dist {
                    grid.dropped += 1;
                    continue;
                }
                grid.increment(n, d as usize);
            }
        }
    }
}

/// Cast one vote per foreground pixel per candidate angle
pub fn accumulate(image: &BinaryImage<'_>, angles: &AngleSet, rho_step: f64) -> Result<VoteGrid> {
    let num_dist = distance_bins(image.width(), image.height(), rho_step)?;
    let tables = VoteTables::new(angles, rho_step)?;
    let mut grid = VoteGrid::new(angles.len(), num_dist)?;

    for i in 0..image.height() {
        tables.vote_row(&mut grid, image, i);
    }

    log_accumulated(&grid);
    Ok(grid)
}

/// Parallel variant of [`accumulate`]
///
/// Rows are voted into per-task partial grids which are summed at the end,
/// so the result equals the serial grid.
#[cfg(feature = "parallel")]
pub fn accumulate_parallel(
    image: &BinaryImage<'_>,
    angles: &AngleSet,
    rho_step: f64,
) -> Result<VoteGrid> {
    use rayon::prelude::*;

    let num_dist = distance_bins(image.width(), image.height(), rho_step)?;
    let tables = VoteTables::new(angles, rho_step)?;
    let num_angles = angles.len();

    let grid = (0..image.height())
        .into_par_iter()
        .fold(
            || VoteGrid::new(num_angles, num_dist),
            |partial, i| {
                let mut partial = partial?;
                tables.vote_row(&mut partial, image, i);
                Ok(partial)
            },
        )
        .reduce(
            || VoteGrid::new(num_angles, num_dist),
            |a, b| {
                let mut a = a?;
                a.merge(&b?);
                Ok(a)
            },
        )?;

    log_accumulated(&grid);
    Ok(grid)
}

fn log_accumulated(grid: &VoteGrid) {
    tracing::debug!(
        angles = grid.num_angles(),
        distances = grid.num_dist(),
        votes = grid.total_votes(),
        "Accumulated votes"
    );
    if grid.dropped_votes() > 0 {
        tracing::debug!(
            dropped = grid.dropped_votes(),
            "Dropped votes outside the distance range"
        );
    }
}
