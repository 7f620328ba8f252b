// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pulling selected visibilities and weights out of one time step's segments.
//!
//! A visibility segment contains every baseline of the file, so decoding walks
//! the file's baselines in canonical order and keeps two counters: the raw
//! baseline index (every baseline walked) and the selected baseline index
//! (only those that meet the selection). Aggregate buffers are sized by the
//! selection, so only the latter may be used to index them.

mod error;

pub use error::DecodeError;

use log::trace;
use ndarray::{ArrayView1, ArrayView2};
use num_complex::Complex;

use crate::{
    constants::{FLOATS_PER_CHANNEL, NUM_POLS},
    geometry::{baseline_index_of, num_baselines},
    io::read::TimeStepData,
    query::Selection,
};

/// The decoded visibility of one baseline and fine channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisRecord {
    /// The 1-based time step.
    pub time_step: usize,
    /// The human-facing time label.
    pub label: usize,
    /// The index of the baseline in the file.
    pub baseline: usize,
    /// The index of the baseline amongst the selected baselines.
    pub selected_baseline: usize,
    pub channel: usize,
    pub i: usize,
    pub j: usize,
    /// XX_re, XX_im, XY_re, XY_im, YX_re, YX_im, YY_re, YY_im.
    pub values: [f32; FLOATS_PER_CHANNEL],
}

impl VisRecord {
    fn pol(&self, pol: usize) -> Complex<f32> {
        Complex::new(self.values[2 * pol], self.values[2 * pol + 1])
    }

    pub fn xx(&self) -> Complex<f32> {
        self.pol(0)
    }

    pub fn xy(&self) -> Complex<f32> {
        self.pol(1)
    }

    pub fn yx(&self) -> Complex<f32> {
        self.pol(2)
    }

    pub fn yy(&self) -> Complex<f32> {
        self.pol(3)
    }

    /// `|XX|`, in double precision.
    pub fn power_x(&self) -> f64 {
        magnitude(self.xx())
    }

    /// `|YY|`, in double precision.
    pub fn power_y(&self) -> f64 {
        magnitude(self.yy())
    }

    /// `|XX| + |YY|`.
    pub fn power(&self) -> f64 {
        self.power_x() + self.power_y()
    }

    pub fn is_auto(&self) -> bool {
        self.i == self.j
    }
}

/// The decoded weights of one baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightRecord {
    pub time_step: usize,
    pub label: usize,
    pub baseline: usize,
    pub selected_baseline: usize,
    pub i: usize,
    pub j: usize,
    /// w_XX, w_XY, w_YX, w_YY.
    pub weights: [f32; NUM_POLS],
}

/// `sqrt(re^2 + im^2)`, in double precision.
#[inline]
pub fn magnitude(c: Complex<f32>) -> f64 {
    Complex::new(c.re as f64, c.im as f64).norm()
}

/// Read the eight components of a fine channel out of a visibility row.
#[inline]
fn read_channel(row: ArrayView1<f32>, channel: usize) -> [f32; FLOATS_PER_CHANNEL] {
    let offset = channel * FLOATS_PER_CHANNEL;
    let mut values = [0.0; FLOATS_PER_CHANNEL];
    for (v, &r) in values
        .iter_mut()
        .zip(row.iter().skip(offset).take(FLOATS_PER_CHANNEL))
    {
        *v = r;
    }
    values
}

fn check_vis(vis: ArrayView2<f32>, selection: &Selection) -> Result<(), DecodeError> {
    let (rows, width) = vis.dim();
    let expected_rows = num_baselines(selection.file_num_tiles());
    let min_width = (selection.channel2() + 1) * FLOATS_PER_CHANNEL;
    if rows != expected_rows || width < min_width || width % FLOATS_PER_CHANNEL != 0 {
        return Err(DecodeError::VisShape {
            rows,
            width,
            expected_rows,
            min_width,
        });
    }
    Ok(())
}

/// Decode every selected (baseline, channel) of a time step, handing each
/// record to `visit` in file order. Channels vary fastest.
///
/// Any error from `visit` stops decoding and is returned.
pub fn decode_vis<E, F>(data: &TimeStepData, selection: &Selection, mut visit: F) -> Result<(), E>
where
    E: From<DecodeError>,
    F: FnMut(VisRecord) -> Result<(), E>,
{
    let vis = data.vis.view();
    check_vis(vis, selection)?;

    let num_tiles = selection.file_num_tiles();
    let mut raw_baseline_index = 0;
    let mut selected_baseline_index = 0;
    for i in 0..=selection.tile2() {
        for j in i..num_tiles {
            if selection.meets(i, j) {
                let row = vis.row(raw_baseline_index);
                for channel in selection.channels() {
                    visit(VisRecord {
                        time_step: data.time_step,
                        label: data.label,
                        baseline: raw_baseline_index,
                        selected_baseline: selected_baseline_index,
                        channel,
                        i,
                        j,
                        values: read_channel(row, channel),
                    })?;
                }
                selected_baseline_index += 1;
            }
            raw_baseline_index += 1;
        }
    }
    trace!(
        "Time step {}: walked {raw_baseline_index} baselines, {selected_baseline_index} selected",
        data.time_step
    );

    Ok(())
}

/// Decode the weights of every selected baseline of a time step.
pub fn decode_weights<E, F>(
    data: &TimeStepData,
    selection: &Selection,
    mut visit: F,
) -> Result<(), E>
where
    E: From<DecodeError>,
    F: FnMut(WeightRecord) -> Result<(), E>,
{
    let weights = data.weights.as_ref().ok_or(DecodeError::NoWeights {
        time_step: data.time_step,
    })?;
    let num_tiles = selection.file_num_tiles();
    let (rows, width) = weights.dim();
    if rows != num_baselines(num_tiles) || width != NUM_POLS {
        return Err(DecodeError::WeightsShape {
            rows,
            width,
            expected_rows: num_baselines(num_tiles),
        }
        .into());
    }

    let mut selected_baseline_index = 0;
    for i in selection.tile1()..=selection.tile2() {
        for j in i..=selection.tile2() {
            if !selection.meets(i, j) {
                continue;
            }
            let baseline = baseline_index_of(i, j, num_tiles);
            let row = weights.row(baseline);
            visit(WeightRecord {
                time_step: data.time_step,
                label: data.label,
                baseline,
                selected_baseline: selected_baseline_index,
                i,
                j,
                weights: [row[0], row[1], row[2], row[3]],
            })?;
            selected_baseline_index += 1;
        }
    }

    Ok(())
}
