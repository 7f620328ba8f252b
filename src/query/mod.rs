// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Selecting time steps, tiles (or a single baseline) and fine channels from
//! a correlator file.
//!
//! A [`Selection`] is built once from user input, validated against the file's
//! dimensions, and never changed afterwards. All of the counts needed to size
//! aggregate buffers are worked out at construction.

mod error;

pub use error::SelectionError;

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::geometry;

/// How the tile bounds of a selection are interpreted.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// `tile1` and `tile2` are an inclusive range of tiles; every baseline
    /// with both tiles in the range is selected.
    #[default]
    Range,

    /// `tile1` and `tile2` are the tiles of exactly one baseline.
    Baseline,
}

/// A selection as the user specified it. `None` means "unset"; unset bounds
/// take the widest value the file allows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionArgs {
    /// 1-based. Defaults to 1.
    pub time_step1: Option<usize>,
    /// 1-based, inclusive. Defaults to the last time step.
    pub time_step2: Option<usize>,
    pub tile1: Option<usize>,
    pub tile2: Option<usize>,
    pub channel1: Option<usize>,
    pub channel2: Option<usize>,
    pub autos_only: bool,
    pub mode: SelectionMode,
}

impl SelectionArgs {
    /// The checks that can be made without knowing anything about a file, in
    /// the same order as [`Selection::new`]. Bound pairs where either bound is
    /// unset are skipped.
    pub fn check_order(&self) -> Result<(), SelectionError> {
        if let (Some(time_step1), Some(time_step2)) = (self.time_step1, self.time_step2) {
            if time_step1 > time_step2 {
                return Err(SelectionError::TimeStepOrder {
                    time_step1,
                    time_step2,
                });
            }
        }
        if self.time_step1 == Some(0) {
            return Err(SelectionError::TimeStepZero);
        }
        if let (Some(tile1), Some(tile2)) = (self.tile1, self.tile2) {
            if tile1 > tile2 {
                return Err(SelectionError::TileOrder { tile1, tile2 });
            }
        }
        if let (Some(channel1), Some(channel2)) = (self.channel1, self.channel2) {
            if channel1 > channel2 {
                return Err(SelectionError::ChannelOrder { channel1, channel2 });
            }
        }
        Ok(())
    }
}

/// The dimensions of a correlator file that a selection is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileDimensions {
    pub num_tiles: usize,
    pub num_channels: usize,
    pub num_time_steps: usize,
    pub has_weights: bool,
}

/// Extra requirements that some outputs place on a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requirements {
    /// Exactly one time step must be selected.
    pub single_time_step: bool,
    /// The file must have weights segments.
    pub weights: bool,
}

/// A validated selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    time_step1: usize,
    time_step2: usize,
    tile1: usize,
    tile2: usize,
    channel1: usize,
    channel2: usize,
    autos_only: bool,
    mode: SelectionMode,
    file_num_tiles: usize,

    num_tiles: usize,
    num_baselines: usize,
    num_channels: usize,
    num_time_steps: usize,
}

impl Selection {
    /// Fill in unset bounds and validate the selection. Checks are done in a
    /// fixed order and the first violation is returned.
    pub fn new(
        args: &SelectionArgs,
        dims: FileDimensions,
        requirements: Requirements,
    ) -> Result<Selection, SelectionError> {
        let time_step1 = args.time_step1.unwrap_or(1);
        let time_step2 = args.time_step2.unwrap_or(dims.num_time_steps);
        let tile1 = args.tile1.unwrap_or(0);
        let tile2 = args
            .tile2
            .unwrap_or_else(|| dims.num_tiles.saturating_sub(1));
        let channel1 = args.channel1.unwrap_or(0);
        let channel2 = args
            .channel2
            .unwrap_or_else(|| dims.num_channels.saturating_sub(1));

        if time_step1 > time_step2 {
            return Err(SelectionError::TimeStepOrder {
                time_step1,
                time_step2,
            });
        }
        if time_step1 < 1 {
            return Err(SelectionError::TimeStepZero);
        }
        if tile1 > tile2 {
            return Err(SelectionError::TileOrder { tile1, tile2 });
        }
        if channel1 > channel2 {
            return Err(SelectionError::ChannelOrder { channel1, channel2 });
        }
        if tile2 >= dims.num_tiles {
            return Err(SelectionError::TileOutOfRange {
                tile2,
                num_tiles: dims.num_tiles,
            });
        }
        if channel2 >= dims.num_channels {
            return Err(SelectionError::ChannelOutOfRange {
                channel2,
                num_channels: dims.num_channels,
            });
        }
        if time_step2 > dims.num_time_steps {
            return Err(SelectionError::TimeStepOutOfRange {
                time_step2,
                num_time_steps: dims.num_time_steps,
            });
        }

        let num_time_steps = time_step2 - time_step1 + 1;
        if requirements.single_time_step && num_time_steps != 1 {
            return Err(SelectionError::NotSingleTimeStep { num_time_steps });
        }
        if requirements.weights && !dims.has_weights {
            return Err(SelectionError::NoWeights);
        }

        // autos-only has no meaning when a single baseline is named.
        let autos_only = args.autos_only && args.mode == SelectionMode::Range;
        let num_tiles = tile2 - tile1 + 1;
        let num_baselines = match (args.mode, autos_only) {
            (SelectionMode::Baseline, _) => 1,
            (SelectionMode::Range, true) => num_tiles,
            (SelectionMode::Range, false) => geometry::num_baselines(num_tiles),
        };

        Ok(Selection {
            time_step1,
            time_step2,
            tile1,
            tile2,
            channel1,
            channel2,
            autos_only,
            mode: args.mode,
            file_num_tiles: dims.num_tiles,

            num_tiles,
            num_baselines,
            num_channels: channel2 - channel1 + 1,
            num_time_steps,
        })
    }

    /// Is baseline `(i, j)` part of this selection?
    #[inline]
    pub fn meets(&self, i: usize, j: usize) -> bool {
        match self.mode {
            SelectionMode::Range => {
                i >= self.tile1 && j <= self.tile2 && (!self.autos_only || i == j)
            }
            SelectionMode::Baseline => i == self.tile1 && j == self.tile2,
        }
    }

    pub fn time_step1(&self) -> usize {
        self.time_step1
    }

    pub fn time_step2(&self) -> usize {
        self.time_step2
    }

    pub fn tile1(&self) -> usize {
        self.tile1
    }

    pub fn tile2(&self) -> usize {
        self.tile2
    }

    pub fn channel1(&self) -> usize {
        self.channel1
    }

    pub fn channel2(&self) -> usize {
        self.channel2
    }

    pub fn autos_only(&self) -> bool {
        self.autos_only
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// The number of tiles in the whole file (not just the selection).
    pub fn file_num_tiles(&self) -> usize {
        self.file_num_tiles
    }

    /// The number of selected tiles.
    pub fn num_tiles(&self) -> usize {
        self.num_tiles
    }

    /// The number of selected baselines.
    pub fn num_baselines(&self) -> usize {
        self.num_baselines
    }

    /// The number of selected fine channels.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// The number of selected time steps.
    pub fn num_time_steps(&self) -> usize {
        self.num_time_steps
    }

    /// The selected baselines, in the order they appear in the file. The
    /// position of each pair is its selected-baseline index.
    pub fn selected_baselines(&self) -> Vec<(usize, usize)> {
        geometry::baselines(self.file_num_tiles)
            .take_while(|&(i, _)| i <= self.tile2)
            .filter(|&(i, j)| self.meets(i, j))
            .collect()
    }

    /// The selected 1-based time steps.
    pub fn time_steps(&self) -> RangeInclusive<usize> {
        self.time_step1..=self.time_step2
    }

    pub fn channels(&self) -> RangeInclusive<usize> {
        self.channel1..=self.channel2
    }

    /// The index of a 1-based time step into the selected time steps.
    #[inline]
    pub fn time_index(&self, time_step: usize) -> usize {
        time_step - self.time_step1
    }

    /// The index of a fine channel into the selected channels.
    #[inline]
    pub fn channel_index(&self, channel: usize) -> usize {
        channel - self.channel1
    }

    /// The index of a tile into the selected tiles.
    #[inline]
    pub fn tile_index(&self, tile: usize) -> usize {
        tile - self.tile1
    }

    /// A one-line summary of the resolved selection.
    pub fn title(&self, file_name: &str) -> String {
        format!(
            "{file_name} t={}-{} tiles={}-{} chans={}-{} mode={} autos={}",
            self.time_step1,
            self.time_step2,
            self.tile1,
            self.tile2,
            self.channel1,
            self.channel2,
            self.mode,
            self.autos_only
        )
    }
}
