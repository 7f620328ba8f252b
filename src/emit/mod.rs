// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Getting decoded records and aggregates out of the program.
//!
//! Records are streamed as CSV rows. Aggregates are handed to a
//! [`ReportSink`] together with a title describing the selection.

mod error;
#[cfg(feature = "plotting")]
mod plot;
#[cfg(test)]
mod tests;

pub use error::EmitError;
#[cfg(feature = "plotting")]
pub use plot::{DrawError, PngPlotter};

use std::io::Write;

use itertools::Itertools;

use crate::{
    aggregate::Aggregate,
    decode::{VisRecord, WeightRecord},
    query::Selection,
};

const VIS_HEADER: [&str; 13] = [
    "time", "baseline", "chan", "ant1", "ant2", "xx_r", "xx_i", "xy_r", "xy_i", "yx_r", "yx_i",
    "yy_r", "yy_i",
];

const WEIGHTS_HEADER: [&str; 8] = [
    "time", "baseline", "ant1", "ant2", "xx_w", "xy_w", "yx_w", "yy_w",
];

/// Writes decoded records as comma-separated rows.
pub struct CsvWriter<W: Write> {
    writer: W,
    power: bool,
    num_rows: usize,
}

impl<W: Write> CsvWriter<W> {
    /// `power` adds a final column with `|XX| + |YY|` to visibility rows.
    pub fn new(writer: W, power: bool) -> CsvWriter<W> {
        CsvWriter {
            writer,
            power,
            num_rows: 0,
        }
    }

    pub fn write_vis_header(&mut self) -> Result<(), EmitError> {
        write!(self.writer, "{}", VIS_HEADER.iter().join(","))?;
        if self.power {
            write!(self.writer, ",power")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    pub fn write_weights_header(&mut self) -> Result<(), EmitError> {
        writeln!(self.writer, "{}", WEIGHTS_HEADER.iter().join(","))?;
        Ok(())
    }

    pub fn write_vis(&mut self, r: &VisRecord) -> Result<(), EmitError> {
        write!(
            self.writer,
            "{},{},{},{},{},{}",
            r.label,
            r.baseline,
            r.channel,
            r.i,
            r.j,
            r.values.iter().join(",")
        )?;
        if self.power {
            write!(self.writer, ",{}", r.power())?;
        }
        writeln!(self.writer)?;
        self.num_rows += 1;
        Ok(())
    }

    pub fn write_weights(&mut self, w: &WeightRecord) -> Result<(), EmitError> {
        writeln!(
            self.writer,
            "{},{},{},{},{}",
            w.label,
            w.baseline,
            w.i,
            w.j,
            w.weights.iter().join(",")
        )?;
        self.num_rows += 1;
        Ok(())
    }

    /// The number of data rows written (headers excluded).
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn finish(mut self) -> Result<W, EmitError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Something that presents a finished aggregate.
pub trait ReportSink {
    fn report(
        &mut self,
        title: &str,
        selection: &Selection,
        aggregate: &Aggregate,
    ) -> Result<(), EmitError>;
}

/// Presents aggregates as whitespace-separated text, one value line per
/// channel or tile pair.
pub struct TextReport<W: Write> {
    writer: W,
}

impl<W: Write> TextReport<W> {
    pub fn new(writer: W) -> TextReport<W> {
        TextReport { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn report(
        &mut self,
        title: &str,
        selection: &Selection,
        aggregate: &Aggregate,
    ) -> Result<(), EmitError> {
        let w = &mut self.writer;
        writeln!(w, "# {title}")?;
        match aggregate {
            Aggregate::PowerSpectrum(ppd) => {
                writeln!(w, "# time_step chan power_x power_y power")?;
                for (time_step, ppd) in selection.time_steps().zip(ppd.outer_iter()) {
                    for (channel, p) in selection.channels().zip(ppd.outer_iter()) {
                        writeln!(
                            w,
                            "{time_step} {channel} {} {} {}",
                            p[0],
                            p[1],
                            p[0] + p[1]
                        )?;
                    }
                }
            }

            Aggregate::Grid(grid) => {
                writeln!(w, "# time_step ant1 ant2 power")?;
                let baselines = selection.selected_baselines();
                for (time_step, grid) in selection.time_steps().zip(grid.outer_iter()) {
                    for &(i, j) in &baselines {
                        let value = grid[(selection.tile_index(j), selection.tile_index(i))];
                        writeln!(w, "{time_step} {i} {j} {value}")?;
                    }
                }
            }

            Aggregate::Phase(phase) => {
                writeln!(w, "# time_step ant1 ant2 chan phase_x phase_y")?;
                let baselines = selection.selected_baselines();
                for (time_step, phase) in selection.time_steps().zip(phase.outer_iter()) {
                    for (&(i, j), phase) in baselines.iter().zip(phase.outer_iter()) {
                        for (channel, p) in selection.channels().zip(phase.outer_iter()) {
                            writeln!(w, "{time_step} {i} {j} {channel} {} {}", p[0], p[1])?;
                        }
                    }
                }
            }
        }
        w.flush()?;

        Ok(())
    }
}
