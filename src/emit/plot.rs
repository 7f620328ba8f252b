// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rendering aggregates to PNG files.

use std::path::{Path, PathBuf};

use log::debug;
use ndarray::prelude::*;
use plotters::{coord::Shift, prelude::*};
use thiserror::Error;

use super::{EmitError, ReportSink};
use crate::{
    aggregate::{plot_layout, Aggregate},
    query::Selection,
};

/// The number of X pixels on the plots.
const X_PIXELS: u32 = 2400;
/// The number of Y pixels on the plots.
const Y_PIXELS: u32 = 1600;

/// Writes one PNG per aggregate, with one panel per time step (power spectra
/// and grids) or per baseline (phases).
pub struct PngPlotter {
    directory: PathBuf,
    file_stem: String,
    num_rows: Option<usize>,
    num_cols: Option<usize>,
    written: Vec<PathBuf>,
}

impl PngPlotter {
    /// Plots are written to `<directory>/<file_stem>_<aggregate>.png`. Unset
    /// rows and columns are worked out from the number of panels.
    pub fn new(
        directory: &Path,
        file_stem: &str,
        num_rows: Option<usize>,
        num_cols: Option<usize>,
    ) -> PngPlotter {
        PngPlotter {
            directory: directory.to_path_buf(),
            file_stem: file_stem.to_string(),
            num_rows,
            num_cols,
            written: vec![],
        }
    }

    /// The files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// The (rows, columns) of panels. A given row or column count is kept and
    /// the other is worked out to fit every panel.
    pub(super) fn layout(&self, num_panels: usize) -> (usize, usize) {
        let (auto_rows, auto_cols) = plot_layout(num_panels);
        match (self.num_rows, self.num_cols) {
            (Some(r), Some(c)) => (r.max(1), c.max(1)),
            (Some(r), None) => {
                let r = r.max(1);
                (r, (num_panels + r - 1) / r)
            }
            (None, Some(c)) => {
                let c = c.max(1);
                ((num_panels + c - 1) / c, c)
            }
            (None, None) => (auto_rows, auto_cols),
        }
    }
}

impl ReportSink for PngPlotter {
    fn report(
        &mut self,
        title: &str,
        selection: &Selection,
        aggregate: &Aggregate,
    ) -> Result<(), EmitError> {
        if !self.directory.exists() {
            std::fs::create_dir_all(&self.directory).map_err(|err| EmitError::Create {
                path: self.directory.clone(),
                err,
            })?;
        }
        let path = self
            .directory
            .join(format!("{}_{}.png", self.file_stem, aggregate.name()));
        debug!("Plotting {} to '{}'", aggregate.name(), path.display());

        let (num_rows, num_cols) = self.layout(aggregate.num_panels(selection));

        let root = BitMapBackend::new(&path, (X_PIXELS, Y_PIXELS)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| DrawError::Plotters(Box::new(e)))?;
        let root = root
            .titled(title, ("sans-serif", 30).into_font())
            .map_err(|e| DrawError::Plotters(Box::new(e)))?;
        let panels = root.split_evenly((num_rows, num_cols));

        match aggregate {
            Aggregate::PowerSpectrum(ppd) => {
                for ((time_step, ppd), panel) in
                    selection.time_steps().zip(ppd.outer_iter()).zip(&panels)
                {
                    plot_power_spectrum(panel, ppd, selection, &format!("t={time_step}"))?;
                }
            }

            Aggregate::Grid(grid) => {
                let max = grid.iter().copied().fold(0.0, f64::max);
                for ((time_step, grid), panel) in
                    selection.time_steps().zip(grid.outer_iter()).zip(&panels)
                {
                    plot_grid(panel, grid, selection, max, &format!("t={time_step}"))?;
                }
            }

            Aggregate::Phase(phase) => {
                // Only one time step is allowed for phase plots.
                let phase = phase.index_axis(Axis(0), 0);
                for ((&(i, j), phase), panel) in selection
                    .selected_baselines()
                    .iter()
                    .zip(phase.outer_iter())
                    .zip(&panels)
                {
                    plot_phase(panel, phase, selection, &format!("{i}-{j}"))?;
                }
            }
        }

        root.present()
            .map_err(|e| DrawError::Plotters(Box::new(e)))?;
        self.written.push(path.clone());

        Ok(())
    }
}

fn channel_range(selection: &Selection) -> std::ops::Range<f64> {
    selection.channel1() as f64..(selection.channel2() + 1) as f64
}

fn value_range<'a>(values: impl Iterator<Item = &'a f64>) -> std::ops::Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        0.0..1.0
    } else if (max - min).abs() < f64::EPSILON {
        min - 0.5..max + 0.5
    } else {
        min..max
    }
}

/// `ppd` is `[channel][pol]`.
fn plot_power_spectrum<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    ppd: ArrayView2<f64>,
    selection: &Selection,
    caption: &str,
) -> Result<(), DrawError> {
    let mut cc = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 20))
        .margin(5)
        .x_label_area_size(25)
        .y_label_area_size(50)
        .build_cartesian_2d(channel_range(selection), value_range(ppd.iter()))
        .map_err(|e| DrawError::PowerSpectrum(e.to_string()))?;
    cc.configure_mesh()
        .light_line_style(WHITE)
        .draw()
        .map_err(|e| DrawError::PowerSpectrum(e.to_string()))?;

    for (pol, colour) in [(0, BLUE), (1, RED)] {
        cc.draw_series(LineSeries::new(
            selection
                .channels()
                .zip(ppd.column(pol).iter())
                .map(|(c, &p)| (c as f64, p)),
            &colour,
        ))
        .map_err(|e| DrawError::PowerSpectrum(e.to_string()))?;
    }

    Ok(())
}

/// `grid` is `[j][i]`.
fn plot_grid<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    grid: ArrayView2<f64>,
    selection: &Selection,
    max: f64,
    caption: &str,
) -> Result<(), DrawError> {
    let tiles = selection.tile1()..selection.tile2() + 1;
    let mut cc = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 20))
        .margin(5)
        .x_label_area_size(25)
        .y_label_area_size(35)
        .build_cartesian_2d(tiles.clone(), tiles)
        .map_err(|e| DrawError::Grid(e.to_string()))?;
    cc.configure_mesh()
        .disable_mesh()
        .draw()
        .map_err(|e| DrawError::Grid(e.to_string()))?;

    let scale = if max > 0.0 { max } else { 1.0 };
    cc.draw_series(grid.indexed_iter().map(|((j, i), &v)| {
        let (x, y) = (selection.tile1() + i, selection.tile1() + j);
        let frac = (v / scale).clamp(0.0, 1.0);
        // Blue for nothing through to red for the maximum.
        let colour = HSLColor((1.0 - frac) * 240.0 / 360.0, 1.0, 0.5);
        Rectangle::new([(x, y), (x + 1, y + 1)], colour.filled())
    }))
    .map_err(|e| DrawError::Grid(e.to_string()))?;

    Ok(())
}

/// `phase` is `[channel][pol]` in degrees.
fn plot_phase<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    phase: ArrayView2<f64>,
    selection: &Selection,
    caption: &str,
) -> Result<(), DrawError> {
    let mut cc = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 20))
        .margin(5)
        .x_label_area_size(25)
        .y_label_area_size(45)
        .build_cartesian_2d(channel_range(selection), -180.0..180.0)
        .map_err(|e| DrawError::Phase(e.to_string()))?;
    cc.configure_mesh()
        .light_line_style(WHITE)
        .draw()
        .map_err(|e| DrawError::Phase(e.to_string()))?;

    for (pol, colour) in [(0, BLUE), (1, RED)] {
        cc.draw_series(PointSeries::of_element(
            selection
                .channels()
                .zip(phase.column(pol).iter())
                .map(|(c, &p)| (c as f64, p)),
            2,
            ShapeStyle::from(&colour).filled(),
            &|coord, size, style| EmptyElement::at(coord) + Circle::new((0, 0), size, style),
        ))
        .map_err(|e| DrawError::Phase(e.to_string()))?;
    }

    Ok(())
}

#[derive(Error, Debug)]
pub enum DrawError {
    #[error("While plotting a power spectrum: {0}")]
    PowerSpectrum(String),

    #[error("While plotting a baseline grid: {0}")]
    Grid(String),

    #[error("While plotting phases: {0}")]
    Phase(String),

    #[error("Error from the plotters library: {0}")]
    Plotters(Box<dyn std::error::Error>),
}
