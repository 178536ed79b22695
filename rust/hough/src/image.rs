// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Borrowed binary map consumed by the voting stage

use crate::error::{HoughError, Result};

/// Read-only view over a dense byte matrix
///
/// Rows are laid out one after another, `stride` bytes apart. A sample is
/// foreground iff it is non-zero.
#[derive(Debug, Clone, Copy)]
pub struct BinaryImage<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a> BinaryImage<'a> {
    /// Wrap a row-major buffer with an explicit row stride
    ///
    /// Fails when the image has no area, when `stride < width`, or when the
    /// buffer is too short for the declared geometry.
    pub fn new(data: &'a [u8], width: usize, height: usize, stride: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(HoughError::invalid(format!(
                "image has zero area ({}x{})",
                width, height
            )));
        }
        if stride < width {
            return Err(HoughError::invalid(format!(
                "row stride {} is smaller than width {}",
                stride, width
            )));
        }
        let required = (height - 1)
            .checked_mul(stride)
            .and_then(|n| n.checked_add(width))
            .ok_or_else(|| HoughError::invalid("image geometry overflows usize"))?;
        if data.len() < required {
            return Err(HoughError::invalid(format!(
                "buffer holds {} bytes, {}x{} with stride {} needs {}",
                data.len(),
                width,
                height,
                stride,
                required
            )));
        }

        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Wrap a tightly packed buffer (`stride == width`)
    pub fn packed(data: &'a [u8], width: usize, height: usize) -> Result<Self> {
        Self::new(data, width, height, width)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Row `i` without the stride padding
    pub fn row(&self, i: usize) -> &'a [u8] {
        let start = i * self.stride;
        &self.data[start..start + self.width]
    }

    pub fn is_foreground(&self, row: usize, col: usize) -> bool {
        self.row(row)[col] != 0
    }

    /// Iterate `(row, col)` of every foreground sample in scan order
    pub fn foreground(&self) -> impl Iterator<Item = (usize, usize)> + 'a {
        let this = *self;
        (0..this.height).flat_map(move |i| {
            this.row(i)
                .iter()
                .enumerate()
                .filter(|(_, v)| **v != 0)
                .map(move |(j, _)| (i, j))
        })
    }

    pub fn foreground_count(&self) -> usize {
        (0..self.height)
            .map(|i| self.row(i).iter().filter(|&&v| v != 0).count())
            .sum()
    }
}
