// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Summarising decoded visibilities.
//!
//! An [`Aggregator`] owns a zeroed buffer sized by a [`Selection`], accumulates
//! [`VisRecord`]s into it, and yields an [`Aggregate`] once every time step
//! has been visited.


use log::debug;
use ndarray::prelude::*;
use num_complex::Complex;

use crate::{
    constants::{DB_SCALE, GRID_EMPTY_THRESHOLD},
    decode::VisRecord,
    query::Selection,
};

/// What to summarise decoded visibilities into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    /// Power against fine channel, per time step.
    PowerSpectrum {
        db: bool,
        /// Divide by the number of selected baselines.
        normalise: bool,
    },

    /// Power against baseline (tile pair), per time step.
    Grid { db: bool },

    /// Phase against fine channel, per baseline.
    Phase,
}

/// `log10(v + 1) * 10`.
#[inline]
pub fn db(v: f64) -> f64 {
    (v + 1.0).log10() * DB_SCALE
}

/// The (rows, columns) of a near-square grid that fits `n` panels.
pub fn plot_layout(n: usize) -> (usize, usize) {
    let rows = ((n as f64).sqrt().floor() as usize).max(1);
    let cols = (n + rows - 1) / rows;
    (rows, cols.max(1))
}

/// A finished aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    /// `[time][channel][pol]`, with pol 0 = X and pol 1 = Y. Channels are
    /// relative to the selection's first channel.
    PowerSpectrum(Array3<f64>),

    /// `[time][j][i]`; row is the second tile of a baseline, column the first.
    /// Tiles are relative to the selection's first tile.
    Grid(Array3<f64>),

    /// `[time][selected baseline][channel][pol]` in degrees.
    Phase(Array4<f64>),
}

impl Aggregate {
    pub fn name(&self) -> &'static str {
        match self {
            Aggregate::PowerSpectrum(_) => "ppd",
            Aggregate::Grid(_) => "grid",
            Aggregate::Phase(_) => "phase",
        }
    }

    /// The number of panels this aggregate is naturally split into; one per
    /// time step for power spectra and grids, one per baseline for phases.
    pub fn num_panels(&self, selection: &Selection) -> usize {
        match self {
            Aggregate::PowerSpectrum(_) | Aggregate::Grid(_) => selection.num_time_steps(),
            Aggregate::Phase(_) => selection.num_baselines(),
        }
    }
}

pub struct Aggregator {
    kind: AggregateKind,
    selection: Selection,
    buffer: Aggregate,
}

impl Aggregator {
    pub fn new(kind: AggregateKind, selection: &Selection) -> Aggregator {
        let num_times = selection.num_time_steps();
        let buffer = match kind {
            AggregateKind::PowerSpectrum { .. } => {
                Aggregate::PowerSpectrum(Array3::zeros((num_times, selection.num_channels(), 2)))
            }
            AggregateKind::Grid { .. } => Aggregate::Grid(Array3::zeros((
                num_times,
                selection.num_tiles(),
                selection.num_tiles(),
            ))),
            AggregateKind::Phase => Aggregate::Phase(Array4::zeros((
                num_times,
                selection.num_baselines(),
                selection.num_channels(),
                2,
            ))),
        };
        debug!("Aggregating {kind:?} into a buffer for {num_times} time steps");

        Aggregator {
            kind,
            selection: selection.clone(),
            buffer,
        }
    }

    pub fn accumulate(&mut self, record: &VisRecord) {
        let sel = &self.selection;
        let t = sel.time_index(record.time_step);
        match &mut self.buffer {
            Aggregate::PowerSpectrum(buffer) => {
                let c = sel.channel_index(record.channel);
                buffer[(t, c, 0)] += record.power_x();
                buffer[(t, c, 1)] += record.power_y();
            }

            Aggregate::Grid(buffer) => {
                let i = sel.tile_index(record.i);
                let j = sel.tile_index(record.j);
                buffer[(t, j, i)] += record.power();
            }

            Aggregate::Phase(buffer) => {
                let c = sel.channel_index(record.channel);
                let b = record.selected_baseline;
                buffer[(t, b, c, 0)] = phase_degrees(record.xx());
                buffer[(t, b, c, 1)] = phase_degrees(record.yy());
            }
        }
    }

    /// Apply any post-processing and hand over the buffer.
    pub fn finish(self) -> Aggregate {
        let Aggregator {
            kind,
            selection,
            mut buffer,
        } = self;
        match (kind, &mut buffer) {
            (AggregateKind::PowerSpectrum { db: to_db, normalise }, Aggregate::PowerSpectrum(b)) => {
                if normalise {
                    let n = selection.num_baselines() as f64;
                    b.mapv_inplace(|v| v / n);
                }
                if to_db {
                    b.mapv_inplace(db);
                }
            }

            (AggregateKind::Grid { db: true }, Aggregate::Grid(b)) => floor_db_grid(b.view_mut()),

            _ => (),
        }

        buffer
    }
}

/// `atan2(im, re)` in degrees.
#[inline]
pub fn phase_degrees(c: Complex<f32>) -> f64 {
    Complex::new(c.re as f64, c.im as f64).arg().to_degrees()
}

/// Convert a grid to dB, then subtract the smallest dB value of the occupied
/// cells from the occupied cells. A cell is occupied if its power exceeds
/// [`GRID_EMPTY_THRESHOLD`].
fn floor_db_grid(mut grid: ArrayViewMut3<f64>) {
    let min = grid
        .iter()
        .filter(|&&v| v > GRID_EMPTY_THRESHOLD)
        .map(|&v| db(v))
        .fold(f64::INFINITY, f64::min);
    grid.mapv_inplace(|v| {
        if v > GRID_EMPTY_THRESHOLD {
            db(v) - min
        } else {
            db(v)
        }
    });
}
