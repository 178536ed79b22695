// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Detection of the dark border left behind by rotation

use image::GrayImage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn step(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Page extent inside the rotated canvas, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Border {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Border {
    /// `(x, y, width, height)` of the page, or `None` if the scan collapsed
    pub fn crop_rect(&self) -> Option<(u32, u32, u32, u32)> {
        if self.right > self.left && self.bottom > self.top {
            Some((
                self.left,
                self.top,
                self.right - self.left,
                self.bottom - self.top,
            ))
        } else {
            None
        }
    }
}

/// Walk from `start` in `dir` until brightness rises by at least `threshold`
/// between two neighbours; return the coordinate of the last pixel before the
/// jump along the walking axis
///
/// Reaching the image edge stops the walk at the edge.
fn scan(image: &GrayImage, start: (u32, u32), dir: Direction, threshold: i16) -> u32 {
    let (width, height) = (image.width() as i64, image.height() as i64);
    let (dx, dy) = dir.step();
    let (mut x, mut y) = (start.0 as i64, start.1 as i64);

    loop {
        let (nx, ny) = (x + dx, y + dy);
        if nx < 0 || nx >= width || ny < 0 || ny >= height {
            break;
        }
        let here = image.get_pixel(x as u32, y as u32).0[0] as i16;
        let next = image.get_pixel(nx as u32, ny as u32).0[0] as i16;
        if next - here >= threshold {
            break;
        }
        x = nx;
        y = ny;
    }

    if dir.is_horizontal() {
        x as u32
    } else {
        y as u32
    }
}

/// Scan inwards from the middle of each edge for the first sharp brightening
pub fn find_border(image: &GrayImage, threshold: i16) -> Border {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Border {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
        };
    }
    let (mid_x, mid_y) = (width / 2, height / 2);

    Border {
        top: scan(image, (mid_x, 0), Direction::Down, threshold),
        left: scan(image, (0, mid_y), Direction::Right, threshold),
        bottom: scan(image, (mid_x, height - 1), Direction::Up, threshold),
        right: scan(image, (width - 1, mid_y), Direction::Left, threshold),
    }
}
