// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An in-memory [`CorrelatorContainer`] for tests.

use std::collections::HashMap;

use ndarray::Array2;

use super::{ContainerError, CorrelatorContainer};
use crate::{
    constants::{FLOATS_PER_CHANNEL, KEY_MARKER, KEY_NUM_INPUTS, WEIGHTS_ROW_WIDTH},
    geometry::num_baselines,
};

#[derive(Debug, Clone, Default)]
pub(crate) struct MemorySegment {
    pub(crate) keys: HashMap<String, String>,
    pub(crate) data: Array2<f32>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryContainer {
    pub(crate) segments: Vec<MemorySegment>,
    /// The number of times `segment_data` was called.
    pub(crate) data_reads: usize,
}

impl MemoryContainer {
    /// Make a MWAX-style container. `vis_value` is given the 1-based time step,
    /// the baseline index and the column within the visibility row.
    /// `weight_value` is given the 1-based time step, the baseline index and
    /// the pol index; if it's `None`, the file has no weights segments.
    pub(crate) fn mwax(
        num_tiles: usize,
        num_channels: usize,
        num_time_steps: usize,
        vis_value: impl Fn(usize, usize, usize) -> f32,
        weight_value: Option<&dyn Fn(usize, usize, usize) -> f32>,
    ) -> MemoryContainer {
        let num_baselines = num_baselines(num_tiles);
        let mut primary = MemorySegment::default();
        primary
            .keys
            .insert(KEY_NUM_INPUTS.to_string(), (num_tiles * 2).to_string());
        let mut segments = vec![primary];

        for t in 1..=num_time_steps {
            let mut vis = MemorySegment {
                keys: HashMap::new(),
                data: Array2::from_shape_fn(
                    (num_baselines, num_channels * FLOATS_PER_CHANNEL),
                    |(bl, col)| vis_value(t, bl, col),
                ),
            };
            vis.keys.insert(KEY_MARKER.to_string(), (t - 1).to_string());
            segments.push(vis);

            if let Some(weight_value) = weight_value {
                segments.push(MemorySegment {
                    keys: HashMap::new(),
                    data: Array2::from_shape_fn((num_baselines, WEIGHTS_ROW_WIDTH), |(bl, pol)| {
                        weight_value(t, bl, pol)
                    }),
                });
            }
        }

        MemoryContainer {
            segments,
            data_reads: 0,
        }
    }

    fn get(&self, segment: usize) -> Result<&MemorySegment, ContainerError> {
        Ok(&self.segments[segment])
    }
}

impl CorrelatorContainer for MemoryContainer {
    fn name(&self) -> String {
        "memory".to_string()
    }

    fn segment_count(&mut self) -> Result<usize, ContainerError> {
        Ok(self.segments.len())
    }

    fn header_key(&mut self, segment: usize, key: &str) -> Result<Option<String>, ContainerError> {
        Ok(self.get(segment)?.keys.get(key).cloned())
    }

    fn segment_shape(&mut self, segment: usize) -> Result<(usize, usize), ContainerError> {
        Ok(self.get(segment)?.data.dim())
    }

    fn segment_data(&mut self, segment: usize) -> Result<Array2<f32>, ContainerError> {
        self.data_reads += 1;
        Ok(self.get(segment)?.data.clone())
    }
}

/// A container reference can be used as a container, so tests can inspect it
/// after a `CorrelatorFile` is done with it.
impl CorrelatorContainer for &mut MemoryContainer {
    fn name(&self) -> String {
        (**self).name()
    }

    fn segment_count(&mut self) -> Result<usize, ContainerError> {
        (**self).segment_count()
    }

    fn header_key(&mut self, segment: usize, key: &str) -> Result<Option<String>, ContainerError> {
        (**self).header_key(segment, key)
    }

    fn segment_shape(&mut self, segment: usize) -> Result<(usize, usize), ContainerError> {
        (**self).segment_shape(segment)
    }

    fn segment_data(&mut self, segment: usize) -> Result<Array2<f32>, ContainerError> {
        (**self).segment_data(segment)
    }
}
