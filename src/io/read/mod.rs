// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading correlator containers.
//!
//! A container is an ordered list of segments. Segment 0 describes the whole
//! file, and every following segment holds either the visibilities or the
//! weights of one time step.

mod error;
pub(crate) mod fits;
#[cfg(test)]
pub(crate) mod memory;

pub use error::ContainerError;
pub use fits::{FitsContainer, FitsError};

use std::{ops::RangeInclusive, str::FromStr};

use log::{debug, trace};
use ndarray::Array2;

use crate::{
    constants::{
        FLOATS_PER_CHANNEL, KEY_MARKER, KEY_NUM_INPUTS, SIGNAL_CHAINS_PER_TILE, WEIGHTS_ROW_WIDTH,
    },
    geometry::{num_baselines, num_tiles_from_baselines, SegmentLayout},
};

/// Low-level access to the segments of a correlator container.
pub trait CorrelatorContainer {
    /// A human-readable name for the container (e.g. its filename).
    fn name(&self) -> String;

    fn segment_count(&mut self) -> Result<usize, ContainerError>;

    /// Get the raw value of a header key on a segment, if the key exists.
    fn header_key(&mut self, segment: usize, key: &str) -> Result<Option<String>, ContainerError>;

    /// The (rows, row width) of a segment's data.
    fn segment_shape(&mut self, segment: usize) -> Result<(usize, usize), ContainerError>;

    /// Read all of a segment's data.
    fn segment_data(&mut self, segment: usize) -> Result<Array2<f32>, ContainerError>;
}

/// One time step's worth of data, read fully into memory.
#[derive(Debug, Clone)]
pub struct TimeStepData {
    /// The 1-based time step these data belong to.
    pub time_step: usize,

    /// The human-facing time label (the segment's sequence marker + 1).
    pub label: usize,

    /// Visibilities; `[baseline][channel * 8 + pol_offset]`.
    pub vis: Array2<f32>,

    /// Weights; `[baseline][pol]`. Only present for files with weights.
    pub weights: Option<Array2<f32>>,
}

/// A correlator file whose layout and dimensions have been resolved.
pub struct CorrelatorFile<C: CorrelatorContainer> {
    container: C,
    name: String,
    layout: SegmentLayout,
    num_tiles: usize,
    num_channels: usize,
    num_time_steps: usize,
}

impl<C: CorrelatorContainer> CorrelatorFile<C> {
    /// Inspect the container's segments to determine its layout and
    /// dimensions. No visibility data is read.
    pub fn new(mut container: C) -> Result<CorrelatorFile<C>, ContainerError> {
        let name = container.name();
        let num_segments = container.segment_count()?;
        if num_segments < 2 {
            return Err(ContainerError::NoDataSegments {
                segments: num_segments,
            });
        }

        let (first_rows, first_width) = container.segment_shape(1)?;
        if first_width == 0 || first_width % FLOATS_PER_CHANNEL != 0 {
            return Err(ContainerError::BadRowWidth {
                segment: 1,
                width: first_width,
            });
        }
        let num_channels = first_width / FLOATS_PER_CHANNEL;

        // Visibility rows are at least 8 floats wide, so a second segment with
        // a width of 4 can only be weights.
        let layout = if num_segments >= 3 && container.segment_shape(2)?.1 == WEIGHTS_ROW_WIDTH {
            SegmentLayout::VisAndWeights
        } else {
            SegmentLayout::VisOnly
        };
        let num_data_segments = num_segments - 1;
        if layout.has_weights() && num_data_segments % 2 != 0 {
            return Err(ContainerError::OddSegmentCount {
                data_segments: num_data_segments,
            });
        }
        let num_time_steps = num_data_segments / layout.segments_per_time_step();

        let num_inputs: Option<usize> = parse_key(&mut container, 0, KEY_NUM_INPUTS)?;
        let num_tiles = match num_inputs {
            Some(n) if n == 0 || n % SIGNAL_CHAINS_PER_TILE != 0 => {
                return Err(ContainerError::BadNumInputs {
                    key: KEY_NUM_INPUTS,
                    num_inputs: n,
                })
            }
            Some(n) => n / SIGNAL_CHAINS_PER_TILE,
            None => {
                debug!("{KEY_NUM_INPUTS} not present; deriving the tile count from the baselines");
                match num_tiles_from_baselines(first_rows) {
                    Some(n) if n > 0 => n,
                    _ => {
                        return Err(ContainerError::NotTriangular {
                            segment: 1,
                            rows: first_rows,
                        })
                    }
                }
            }
        };
        if first_rows != num_baselines(num_tiles) {
            return Err(ContainerError::BadSegmentShape {
                segment: 1,
                expected: (num_baselines(num_tiles), first_width),
                got: (first_rows, first_width),
            });
        }

        debug!("{name}: {num_tiles} tiles, {num_channels} fine channels, {num_time_steps} time steps, layout {layout:?}");

        Ok(CorrelatorFile {
            container,
            name,
            layout,
            num_tiles,
            num_channels,
            num_time_steps,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> SegmentLayout {
        self.layout
    }

    pub fn num_tiles(&self) -> usize {
        self.num_tiles
    }

    pub fn num_baselines(&self) -> usize {
        num_baselines(self.num_tiles)
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn num_time_steps(&self) -> usize {
        self.num_time_steps
    }

    /// Read the visibilities (and weights, if the file has them) of the
    /// 1-based time step `time_step`.
    pub fn read_time_step(&mut self, time_step: usize) -> Result<TimeStepData, ContainerError> {
        if time_step == 0 || time_step > self.num_time_steps {
            return Err(ContainerError::TimeStepOutOfRange {
                time_step,
                num_time_steps: self.num_time_steps,
            });
        }
        let segments = self.layout.segments_for_time_step(time_step);
        trace!("Time step {time_step} uses segments {segments:?}");

        let vis_shape = (
            self.num_baselines(),
            self.num_channels * FLOATS_PER_CHANNEL,
        );
        let vis = self.read_checked(segments.vis, vis_shape)?;
        let marker: usize = parse_key(&mut self.container, segments.vis, KEY_MARKER)?.ok_or(
            ContainerError::MissingKey {
                segment: segments.vis,
                key: KEY_MARKER,
            },
        )?;

        let weights = match segments.weights {
            Some(segment) => {
                Some(self.read_checked(segment, (self.num_baselines(), WEIGHTS_ROW_WIDTH))?)
            }
            None => None,
        };

        Ok(TimeStepData {
            time_step,
            label: marker + 1,
            vis,
            weights,
        })
    }

    /// Check the shapes and sequence markers of the segments of the given time
    /// steps without reading any of their data.
    pub fn check_time_steps(
        &mut self,
        time_steps: RangeInclusive<usize>,
    ) -> Result<(), ContainerError> {
        let vis_shape = (
            self.num_baselines(),
            self.num_channels * FLOATS_PER_CHANNEL,
        );
        let weights_shape = (self.num_baselines(), WEIGHTS_ROW_WIDTH);
        for time_step in time_steps {
            if time_step == 0 || time_step > self.num_time_steps {
                return Err(ContainerError::TimeStepOutOfRange {
                    time_step,
                    num_time_steps: self.num_time_steps,
                });
            }
            let segments = self.layout.segments_for_time_step(time_step);
            self.check_shape(segments.vis, vis_shape)?;
            if parse_key::<C, usize>(&mut self.container, segments.vis, KEY_MARKER)?.is_none() {
                return Err(ContainerError::MissingKey {
                    segment: segments.vis,
                    key: KEY_MARKER,
                });
            }
            if let Some(segment) = segments.weights {
                self.check_shape(segment, weights_shape)?;
            }
        }
        Ok(())
    }

    fn check_shape(&mut self, segment: usize, expected: (usize, usize)) -> Result<(), ContainerError> {
        let got = self.container.segment_shape(segment)?;
        if got != expected {
            return Err(ContainerError::BadSegmentShape {
                segment,
                expected,
                got,
            });
        }
        Ok(())
    }

    fn read_checked(
        &mut self,
        segment: usize,
        expected: (usize, usize),
    ) -> Result<Array2<f32>, ContainerError> {
        self.check_shape(segment, expected)?;
        self.container.segment_data(segment)
    }
}

fn parse_key<C: CorrelatorContainer, T: FromStr>(
    container: &mut C,
    segment: usize,
    key: &'static str,
) -> Result<Option<T>, ContainerError> {
    let value = match container.header_key(segment, key)? {
        Some(value) => value,
        None => return Ok(None),
    };
    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(ContainerError::Parse {
            segment,
            key,
            value,
        }),
    }
}
