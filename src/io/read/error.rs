// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from reading a correlator container. Apart from `Fits`, these all
//! indicate a corrupt or unsupported file.

use thiserror::Error;

use super::fits::FitsError;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("The file has {segments} segment(s); at least one data segment after the primary is required")]
    NoDataSegments { segments: usize },

    #[error("Segment {segment} has a row width of {width}, which isn't a non-zero multiple of {}", crate::constants::FLOATS_PER_CHANNEL)]
    BadRowWidth { segment: usize, width: usize },

    #[error("The file interleaves visibilities and weights, but has an odd number of data segments ({data_segments})")]
    OddSegmentCount { data_segments: usize },

    #[error("{key} is {num_inputs}, but it must be a non-zero multiple of 2")]
    BadNumInputs { key: &'static str, num_inputs: usize },

    #[error("Segment {segment} has {rows} rows, which isn't a triangular number of baselines")]
    NotTriangular { segment: usize, rows: usize },

    #[error("Segment {segment} has shape {got:?} (rows, width), but {expected:?} was expected")]
    BadSegmentShape {
        segment: usize,
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("Segment {segment} is not a 2D array (it has {num_axes} axes)")]
    NotTwoDimensional { segment: usize, num_axes: usize },

    #[error("Segment {segment} should have {expected} values, but {got} were read")]
    DataSize {
        segment: usize,
        expected: usize,
        got: usize,
    },

    #[error("Segment {segment} is missing the required key {key}")]
    MissingKey { segment: usize, key: &'static str },

    #[error("Couldn't parse the value '{value}' of key {key} in segment {segment}")]
    Parse {
        segment: usize,
        key: &'static str,
        value: String,
    },

    #[error("Time step {time_step} was requested, but the file only has {num_time_steps}")]
    TimeStepOutOfRange {
        time_step: usize,
        num_time_steps: usize,
    },

    #[error(transparent)]
    Fits(#[from] FitsError),
}
