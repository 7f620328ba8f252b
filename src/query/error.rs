// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from validating a selection against a file's dimensions.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("timestep1 ({time_step1}) must be less than or equal to timestep2 ({time_step2})")]
    TimeStepOrder { time_step1: usize, time_step2: usize },

    #[error("timestep1 must be greater than or equal to 1")]
    TimeStepZero,

    #[error("tile1 ({tile1}) must be less than or equal to tile2 ({tile2})")]
    TileOrder { tile1: usize, tile2: usize },

    #[error("channel1 ({channel1}) must be less than or equal to channel2 ({channel2})")]
    ChannelOrder { channel1: usize, channel2: usize },

    #[error("tile2 ({tile2}) must be less than the number of tiles ({num_tiles})")]
    TileOutOfRange { tile2: usize, num_tiles: usize },

    #[error("channel2 ({channel2}) must be less than the number of fine channels ({num_channels})")]
    ChannelOutOfRange { channel2: usize, num_channels: usize },

    #[error("timestep2 ({time_step2}) must be less than or equal to the number of time steps ({num_time_steps})")]
    TimeStepOutOfRange {
        time_step2: usize,
        num_time_steps: usize,
    },

    #[error("A phase plot requires exactly 1 time step, but {num_time_steps} were selected")]
    NotSingleTimeStep { num_time_steps: usize },

    #[error("Weights were requested, but the file has no weights segments")]
    NoWeights,
}
