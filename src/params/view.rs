// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info};

use crate::{
    aggregate::{AggregateKind, Aggregator},
    decode::{decode_vis, decode_weights, DecodeError},
    emit::{CsvWriter, EmitError, ReportSink, TextReport},
    io::read::{ContainerError, CorrelatorContainer, CorrelatorFile},
    query::Selection,
    PROGRESS_BARS,
};

/// Where decoded data goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Output {
    /// One CSV row per selected (time step, baseline, channel).
    Csv { power: bool },

    /// One CSV row per selected (time step, baseline) of weights.
    Weights,

    /// Summarise, then present as text.
    Text(AggregateKind),

    /// Summarise, then plot.
    Plot {
        kind: AggregateKind,
        directory: PathBuf,
        num_rows: Option<usize>,
        num_cols: Option<usize>,
    },
}

pub(crate) struct ViewParams<C: CorrelatorContainer> {
    pub(crate) file: CorrelatorFile<C>,
    pub(crate) selection: Selection,
    pub(crate) output: Output,

    /// If `None`, tabular and text output is written to stdout.
    pub(crate) output_file: Option<PathBuf>,
}

impl<C: CorrelatorContainer> ViewParams<C> {
    pub(crate) fn title(&self) -> String {
        self.selection.title(self.file.name())
    }

    pub(crate) fn run(self) -> Result<(), ViewError> {
        let title = self.title();
        let ViewParams {
            mut file,
            selection,
            output,
            output_file,
        } = self;

        // Don't draw over data going to stdout.
        let data_to_stdout = output_file.is_none() && !matches!(output, Output::Plot { .. });
        let draw_target = if PROGRESS_BARS.load() && !data_to_stdout {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        };
        let progress = ProgressBar::with_draw_target(
            Some(selection.num_time_steps() as u64),
            draw_target,
        )
        .with_style(
            ProgressStyle::default_bar()
                .template("{msg:17}: [{wide_bar:.blue}] {pos:2}/{len:2} timesteps ({elapsed_precise}<{eta_precise})")
                .unwrap()
                .progress_chars("=> "),
        )
        .with_position(0)
        .with_message("Reading data");

        // Corrupt segments are found before anything is written.
        file.check_time_steps(selection.time_steps())?;

        info!("Reading {} time steps", selection.num_time_steps());
        match output {
            Output::Csv { power } => {
                let mut csv = CsvWriter::new(output_writer(output_file.as_deref())?, power);
                csv.write_vis_header()?;
                for time_step in selection.time_steps() {
                    let data = file.read_time_step(time_step)?;
                    decode_vis(&data, &selection, |r| {
                        csv.write_vis(&r).map_err(ViewError::from)
                    })?;
                    progress.inc(1);
                }
                debug!("Wrote {} rows", csv.num_rows());
                csv.finish()?;
            }

            Output::Weights => {
                let mut csv = CsvWriter::new(output_writer(output_file.as_deref())?, false);
                csv.write_weights_header()?;
                for time_step in selection.time_steps() {
                    let data = file.read_time_step(time_step)?;
                    decode_weights(&data, &selection, |w| {
                        csv.write_weights(&w).map_err(ViewError::from)
                    })?;
                    progress.inc(1);
                }
                debug!("Wrote {} rows", csv.num_rows());
                csv.finish()?;
            }

            Output::Text(kind) => {
                let aggregate = aggregate(&mut file, &selection, kind, &progress)?;
                let mut sink = TextReport::new(output_writer(output_file.as_deref())?);
                sink.report(&title, &selection, &aggregate)?;
            }

            Output::Plot {
                kind,
                directory,
                num_rows,
                num_cols,
            } => {
                let aggregate = aggregate(&mut file, &selection, kind, &progress)?;
                plot(
                    &directory,
                    &file_stem(file.name()),
                    num_rows,
                    num_cols,
                    &title,
                    &selection,
                    &aggregate,
                )?;
            }
        }
        progress.abandon_with_message("Finished reading");

        Ok(())
    }
}

fn aggregate<C: CorrelatorContainer>(
    file: &mut CorrelatorFile<C>,
    selection: &Selection,
    kind: AggregateKind,
    progress: &ProgressBar,
) -> Result<crate::aggregate::Aggregate, ViewError> {
    let mut aggregator = Aggregator::new(kind, selection);
    for time_step in selection.time_steps() {
        let data = file.read_time_step(time_step)?;
        decode_vis(&data, selection, |r| {
            aggregator.accumulate(&r);
            Ok::<(), ViewError>(())
        })?;
        progress.inc(1);
    }
    Ok(aggregator.finish())
}

#[cfg(feature = "plotting")]
fn plot(
    directory: &Path,
    file_stem: &str,
    num_rows: Option<usize>,
    num_cols: Option<usize>,
    title: &str,
    selection: &Selection,
    aggregate: &crate::aggregate::Aggregate,
) -> Result<(), ViewError> {
    let mut sink = crate::emit::PngPlotter::new(directory, file_stem, num_rows, num_cols);
    sink.report(title, selection, aggregate)?;
    for path in sink.written() {
        info!("Wrote {}", path.display());
    }
    Ok(())
}

#[cfg(not(feature = "plotting"))]
fn plot(
    _directory: &Path,
    _file_stem: &str,
    _num_rows: Option<usize>,
    _num_cols: Option<usize>,
    _title: &str,
    _selection: &Selection,
    _aggregate: &crate::aggregate::Aggregate,
) -> Result<(), ViewError> {
    Err(EmitError::NoPlottingFeature.into())
}

/// The name of a file without its extension, for naming plots.
fn file_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
        .to_string()
}

fn output_writer(path: Option<&Path>) -> Result<Box<dyn Write>, ViewError> {
    match path {
        Some(p) => {
            let f = File::create(p).map_err(|err| EmitError::Create {
                path: p.to_path_buf(),
                err,
            })?;
            Ok(Box::new(BufWriter::new(f)))
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout().lock()))),
    }
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum ViewError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}
