// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tile, baseline and segment bookkeeping.
//!
//! Baselines are enumerated in the same order the correlator writes them:
//! an outer loop over the first tile `i` ascending from 0, and an inner loop
//! over the second tile `j` ascending from `i`. Autocorrelations are included,
//! so `n` tiles give `n * (n + 1) / 2` baselines.


/// The number of baselines (including autocorrelations) formed by `num_tiles`
/// tiles.
#[inline]
pub fn num_baselines(num_tiles: usize) -> usize {
    num_tiles * (num_tiles + 1) / 2
}

/// Given a number of baselines (including autocorrelations), get the number of
/// tiles that formed them. `None` is returned if `num_baselines` isn't a
/// triangular number.
pub fn num_tiles_from_baselines(num_baselines: usize) -> Option<usize> {
    let n = ((-1.0 + (1.0 + 8.0 * num_baselines as f64).sqrt()) / 2.0).round() as usize;
    if self::num_baselines(n) == num_baselines {
        Some(n)
    } else {
        None
    }
}

/// The linear index of baseline `(i, j)` in the canonical enumeration over
/// `num_tiles` tiles. `i <= j < num_tiles` is assumed.
#[inline]
pub fn baseline_index_of(i: usize, j: usize, num_tiles: usize) -> usize {
    debug_assert!(i <= j && j < num_tiles);
    // The number of baselines whose first tile is less than `i`, plus the
    // offset of `j` within the row for `i`.
    i * (2 * num_tiles - i + 1) / 2 + (j - i)
}

/// The inverse of [`baseline_index_of`].
pub fn baseline_to_tiles(baseline: usize, num_tiles: usize) -> (usize, usize) {
    debug_assert!(baseline < num_baselines(num_tiles));
    let mut row_start = 0;
    for i in 0..num_tiles {
        let row_len = num_tiles - i;
        if baseline < row_start + row_len {
            return (i, i + baseline - row_start);
        }
        row_start += row_len;
    }
    unreachable!("baseline index {baseline} is out of range for {num_tiles} tiles")
}

/// Iterate over every baseline formed by `num_tiles` tiles in canonical order.
/// The position of each item in the iteration is its baseline index.
pub fn baselines(num_tiles: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..num_tiles).flat_map(move |i| (i..num_tiles).map(move |j| (i, j)))
}

/// How visibility and weight segments are laid out in a correlator file.
/// Resolved once when a file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentLayout {
    /// Each time step has a visibility segment followed by a weights segment.
    VisAndWeights,

    /// Older files; each time step only has a visibility segment.
    VisOnly,
}

impl SegmentLayout {
    pub fn has_weights(self) -> bool {
        matches!(self, SegmentLayout::VisAndWeights)
    }

    /// The number of segments used per time step.
    pub fn segments_per_time_step(self) -> usize {
        match self {
            SegmentLayout::VisAndWeights => 2,
            SegmentLayout::VisOnly => 1,
        }
    }

    /// The segment indices holding the data for the 1-based time step `t`.
    pub fn segments_for_time_step(self, t: usize) -> SegmentIndices {
        segments_for_time_step(t, self.has_weights())
    }
}

/// The segment indices holding one time step's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentIndices {
    pub vis: usize,
    pub weights: Option<usize>,
}

/// Map a 1-based time step to the segments holding its visibilities and (if
/// present) weights. Segment 0 is the file-level descriptor.
pub fn segments_for_time_step(t: usize, has_weights: bool) -> SegmentIndices {
    debug_assert!(t >= 1);
    if has_weights {
        SegmentIndices {
            vis: 2 * t - 1,
            weights: Some(2 * t),
        }
    } else {
        SegmentIndices {
            vis: t,
            weights: None,
        }
    }
}
