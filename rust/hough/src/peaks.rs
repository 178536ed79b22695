// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Local maximum extraction and ranking

use crate::accumulator::VoteGrid;

/// Local maximum of the accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peak {
    /// Linear index into the padded grid
    pub index: usize,
    pub votes: u32,
}

/// Collect every interior cell that beats `threshold` and its 4 neighbours
///
/// The neighbour test is strict towards lower indices and inclusive towards
/// higher ones on both axes, so a run of equal cells yields exactly one peak:
/// the one with the lowest index along that axis.
pub fn find_peaks(grid: &VoteGrid, threshold: u32) -> Vec<Peak> {
    let pitch = grid.cols();
    let mut peaks = Vec::new();

    for d in 0..grid.num_dist() {
        for a in 0..grid.num_angles() {
            let base = grid.index_of(a, d);
            let v = grid.cell(base);

            if v > threshold
                && v > grid.cell(base - 1)
                && v >= grid.cell(base + 1)
                && v > grid.cell(base - pitch)
                && v >= grid.cell(base + pitch)
            {
                peaks.push(Peak {
                    index: base,
                    votes: v,
                });
            }
        }
    }

    tracing::debug!(peaks = peaks.len(), threshold, "Extracted accumulator peaks");
    peaks
}

/// Order peaks by votes, strongest first
///
/// Peaks with equal votes end up in no particular order.
pub fn rank_peaks(peaks: &mut [Peak]) {
    peaks.sort_unstable_by(|a, b| b.votes.cmp(&a.votes));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(num_angles: usize, num_dist: usize, cells: &[(usize, usize, u32)]) -> VoteGrid {
        let mut grid = VoteGrid::new(num_angles, num_dist).unwrap();
        for &(a, d, votes) in cells {
            for _ in 0..votes {
                assert!(grid.increment(a, d));
            }
        }
        grid
    }

    fn coords(grid: &VoteGrid, peaks: &[Peak]) -> Vec<(usize, usize)> {
        let mut c: Vec<_> = peaks.iter().filter_map(|p| grid.coords_of(p.index)).collect();
        c.sort();
        c
    }

    #[test]
    fn test_isolated_cell_is_peak() {
        let grid = grid_with(3, 5, &[(1, 2, 4)]);
        let peaks = find_peaks(&grid, 0);
        assert_eq!(peaks.len(), 1);
        assert_eq!(grid.coords_of(peaks[0].index), Some((1, 2)));
        assert_eq!(peaks[0].votes, 4);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let grid = grid_with(3, 5, &[(1, 2, 4)]);
        assert_eq!(find_peaks(&grid, 3).len(), 1);
        assert!(find_peaks(&grid, 4).is_empty());
    }

    #[test]
    fn test_distance_plateau_keeps_lower_index() {
        let grid = grid_with(3, 6, &[(1, 2, 5), (1, 3, 5), (1, 4, 5)]);
        let peaks = find_peaks(&grid, 0);
        assert_eq!(coords(&grid, &peaks), vec![(1, 2)]);
    }

    #[test]
    fn test_angle_plateau_keeps_lower_index() {
        let grid = grid_with(4, 5, &[(0, 2, 3), (1, 2, 3), (2, 2, 3)]);
        let peaks = find_peaks(&grid, 0);
        assert_eq!(coords(&grid, &peaks), vec![(0, 2)]);
    }

    #[test]
    fn test_square_plateau_yields_single_peak() {
        let grid = grid_with(4, 4, &[(1, 1, 2), (1, 2, 2), (2, 1, 2), (2, 2, 2)]);
        let peaks = find_peaks(&grid, 0);
        assert_eq!(coords(&grid, &peaks), vec![(1, 1)]);
    }

    #[test]
    fn test_stronger_neighbour_suppresses() {
        let grid = grid_with(3, 5, &[(1, 1, 2), (1, 2, 7), (0, 2, 6)]);
        let peaks = find_peaks(&grid, 0);
        assert_eq!(coords(&grid, &peaks), vec![(1, 2)]);
    }

    #[test]
    fn test_edge_cells_use_zero_border() {
        let grid = grid_with(2, 3, &[(0, 0, 1), (1, 2, 1)]);
        let peaks = find_peaks(&grid, 0);
        assert_eq!(coords(&grid, &peaks), vec![(0, 0), (1, 2)]);
    }

    #[test]
    fn test_empty_grid_has_no_peaks() {
        let grid = VoteGrid::new(5, 5).unwrap();
        assert!(find_peaks(&grid, 0).is_empty());
    }

    #[test]
    fn test_rank_descending() {
        let mut peaks = vec![
            Peak { index: 10, votes: 3 },
            Peak { index: 11, votes: 9 },
            Peak { index: 12, votes: 1 },
            Peak { index: 13, votes: 9 },
            Peak { index: 14, votes: 5 },
        ];
        rank_peaks(&mut peaks);

        let votes: Vec<u32> = peaks.iter().map(|p| p.votes).collect();
        assert_eq!(votes, vec![9, 9, 5, 3, 1]);
        // Tied peaks are both present, in either order
        let mut top: Vec<usize> = peaks[..2].iter().map(|p| p.index).collect();
        top.sort();
        assert_eq!(top, vec![11, 13]);
    }
}
