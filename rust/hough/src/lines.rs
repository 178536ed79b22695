// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion of ranked peaks back to physical line parameters

use crate::accumulator::VoteGrid;
use crate::angles::AngleSet;
use crate::error::{HoughError, Result};
use crate::peaks::Peak;

/// Detected line in normal form: `x*cos(angle) + y*sin(angle) = distance`
///
/// `x` is the column and `y` the row of the input map.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HoughLine {
    /// Signed distance from the origin, in the units of `rho_step`
    pub distance: f64,
    /// Normal angle in radians
    pub angle: f64,
    /// Accumulator votes behind this line
    pub votes: u32,
}

impl HoughLine {
    /// Normal angle in degrees
    pub fn angle_degrees(&self) -> f64 {
        self.angle.to_degrees()
    }
}

/// Map ranked peaks to lines, preserving their order
pub fn build_lines(
    grid: &VoteGrid,
    angles: &AngleSet,
    peaks: &[Peak],
    rho_step: f64,
) -> Result<Vec<HoughLine>> {
    let mut lines = Vec::new();
    lines
        .try_reserve_exact(peaks.len())
        .map_err(|e| HoughError::OutputConstruction(e.to_string()))?;

    let center = grid.center();
    for peak in peaks {
        let outside = || {
            HoughError::OutputConstruction(format!(
                "peak index {} is not an interior cell of a {}x{} grid for {} angles",
                peak.index,
                grid.rows(),
                grid.cols(),
                angles.len()
            ))
        };
        let (a, d) = grid.coords_of(peak.index).ok_or_else(outside)?;
        let angle = angles.get(a).ok_or_else(outside)?;
        lines.push(HoughLine {
            distance: (d as i64 - center) as f64 * rho_step,
            angle,
            votes: peak.votes,
        });
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance_recentred_and_scaled() {
        // num_dist 41 -> centre 20
        let grid = VoteGrid::new(3, 41).unwrap();
        let angles = AngleSet::sample(0.5, 0.6, 0.0).unwrap();
        let peaks = [
            Peak {
                index: grid.index_of(0, 27),
                votes: 8,
            },
            Peak {
                index: grid.index_of(2, 15),
                votes: 4,
            },
        ];

        let lines = build_lines(&grid, &angles, &peaks, 2.0).unwrap();

        assert_eq!(lines.len(), 2);
        assert_relative_eq!(lines[0].distance, 14.0);
        assert_relative_eq!(lines[0].angle, angles.as_slice()[0]);
        assert_eq!(lines[0].votes, 8);
        assert_relative_eq!(lines[1].distance, -10.0);
        assert_relative_eq!(lines[1].angle, angles.as_slice()[2]);
    }

    #[test]
    fn test_angle_index_outside_set_is_rejected() {
        let grid = VoteGrid::new(5, 9).unwrap();
        // One sample per segment
        let short = AngleSet::sample(1.0, 0.5, 0.0).unwrap();
        assert_eq!(short.len(), 4);
        let peaks = [Peak {
            index: grid.index_of(4, 0),
            votes: 1,
        }];

        assert!(matches!(
            build_lines(&grid, &short, &peaks, 1.0),
            Err(HoughError::OutputConstruction(_))
        ));
    }

    #[test]
    fn test_border_peak_index_is_rejected() {
        let grid = VoteGrid::new(3, 5).unwrap();
        let angles = AngleSet::sample(0.5, 0.6, 0.0).unwrap();

        for index in [0, grid.cols() - 1, grid.cols(), grid.rows() * grid.cols()] {
            let peaks = [Peak { index, votes: 1 }];
            assert!(
                matches!(
                    build_lines(&grid, &angles, &peaks, 1.0),
                    Err(HoughError::OutputConstruction(_))
                ),
                "index {}",
                index
            );
        }
    }
}
