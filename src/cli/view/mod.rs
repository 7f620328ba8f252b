// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.


use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::Parser;
use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use super::common::{
    display_warnings, ArgFileTypes, InfoPrinter, Warn, ARG_FILE_HELP, SELECTION_MODE_HELP,
};
use crate::{
    aggregate::AggregateKind,
    io::read::{CorrelatorFile, FitsContainer},
    params::{Output, ViewParams},
    query::{FileDimensions, Requirements, Selection, SelectionArgs, SelectionMode},
    FitsViewError,
};

lazy_static::lazy_static! {
    static ref OUTPUT_HELP: String =
        format!("What to do with the selected data. csv and weights write one row per record; ppd, grid and phase summarise the data first. Default: {}. Valid outputs: {}",
                OutputType::default(), OutputType::iter().join(", "));
}

/// The kinds of output that can be asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub(super) enum OutputType {
    #[default]
    Csv,
    Weights,
    Ppd,
    Grid,
    Phase,
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct ViewArgs {
    /// Path to the MWAX correlator FITS file.
    #[clap(name = "FITS_FILE", parse(from_os_str))]
    pub(super) fits_file: Option<PathBuf>,

    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    /// The first time step to use (1-based). Default: 1
    #[clap(long, help_heading = "SELECTION")]
    pub(super) timestep1: Option<usize>,

    /// The last time step to use (1-based, inclusive). Default: the last time
    /// step in the file
    #[clap(long, help_heading = "SELECTION")]
    pub(super) timestep2: Option<usize>,

    /// The first tile of the range, or the first tile of the baseline in
    /// baseline mode. Default: 0
    #[clap(long, help_heading = "SELECTION")]
    pub(super) tile1: Option<usize>,

    /// The last tile of the range (inclusive), or the second tile of the
    /// baseline in baseline mode. Default: the last tile in the file
    #[clap(long, help_heading = "SELECTION")]
    pub(super) tile2: Option<usize>,

    /// The first fine channel to use (0-based). Default: 0
    #[clap(long, help_heading = "SELECTION")]
    pub(super) channel1: Option<usize>,

    /// The last fine channel to use (0-based, inclusive). Default: the last
    /// fine channel in the file
    #[clap(long, help_heading = "SELECTION")]
    pub(super) channel2: Option<usize>,

    /// Only use auto-correlations. Ignored in baseline mode.
    #[clap(long, help_heading = "SELECTION")]
    #[serde(default)]
    pub(super) autos_only: bool,

    #[clap(long, help = SELECTION_MODE_HELP.as_str(), help_heading = "SELECTION")]
    pub(super) mode: Option<String>,

    #[clap(long, help = OUTPUT_HELP.as_str(), help_heading = "OUTPUT")]
    pub(super) output: Option<String>,

    /// Convert ppd and grid values to decibels.
    #[clap(long, help_heading = "OUTPUT")]
    #[serde(default)]
    pub(super) db: bool,

    /// Divide the ppd by the number of selected baselines.
    #[clap(long, help_heading = "OUTPUT")]
    #[serde(default)]
    pub(super) normalise: bool,

    /// Add a power column (|xx| + |yy|) to csv output.
    #[clap(long, help_heading = "OUTPUT")]
    #[serde(default)]
    pub(super) power: bool,

    /// Write csv, weights and text output to this file instead of stdout.
    #[clap(long, help_heading = "OUTPUT")]
    pub(super) output_file: Option<PathBuf>,

    /// Plot ppd, grid or phase output as PNGs into this directory. Only
    /// available if compiled with the "plotting" feature.
    #[clap(long, help_heading = "OUTPUT")]
    pub(super) plot_dir: Option<PathBuf>,

    /// The number of rows of subplots. Default: worked out from the number of
    /// subplots
    #[clap(long, help_heading = "OUTPUT")]
    pub(super) num_rows: Option<usize>,

    /// The number of columns of subplots. Default: worked out from the number
    /// of subplots
    #[clap(long, help_heading = "OUTPUT")]
    pub(super) num_cols: Option<usize>,
}

impl ViewArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<ViewArgs, FitsViewError> {
        debug!("Merging command-line arguments with the argument file");

        let mut cli_args = self;
        // A lone positional argument may be an arguments file.
        if cli_args.args_file.is_none() && cli_args.fits_file.as_deref().map_or(false, is_arg_file) {
            cli_args.args_file = cli_args.fits_file.take();
        }

        if let Some(arg_file) = cli_args.args_file {
            // Ensure all of the file args are accounted for by pattern
            // matching.
            let ViewArgs {
                args_file: _,
                fits_file,
                timestep1,
                timestep2,
                tile1,
                tile2,
                channel1,
                channel2,
                autos_only,
                mode,
                output,
                db,
                normalise,
                power,
                output_file,
                plot_dir,
                num_rows,
                num_cols,
            } = unpack_arg_file!(arg_file);

            Ok(ViewArgs {
                args_file: None,
                fits_file: cli_args.fits_file.or(fits_file),
                timestep1: cli_args.timestep1.or(timestep1),
                timestep2: cli_args.timestep2.or(timestep2),
                tile1: cli_args.tile1.or(tile1),
                tile2: cli_args.tile2.or(tile2),
                channel1: cli_args.channel1.or(channel1),
                channel2: cli_args.channel2.or(channel2),
                autos_only: cli_args.autos_only || autos_only,
                mode: cli_args.mode.or(mode),
                output: cli_args.output.or(output),
                db: cli_args.db || db,
                normalise: cli_args.normalise || normalise,
                power: cli_args.power || power,
                output_file: cli_args.output_file.or(output_file),
                plot_dir: cli_args.plot_dir.or(plot_dir),
                num_rows: cli_args.num_rows.or(num_rows),
                num_cols: cli_args.num_cols.or(num_cols),
            })
        } else {
            Ok(cli_args)
        }
    }

    /// Will data be written to stdout?
    pub(super) fn writes_to_stdout(&self) -> bool {
        self.output_file.is_none() && self.plot_dir.is_none()
    }

    pub(super) fn parse(self) -> Result<ViewParams<FitsContainer>, FitsViewError> {
        debug!("{:#?}", self);

        let Self {
            args_file: _,
            fits_file,
            timestep1,
            timestep2,
            tile1,
            tile2,
            channel1,
            channel2,
            autos_only,
            mode,
            output,
            db,
            normalise,
            power,
            output_file,
            plot_dir,
            num_rows,
            num_cols,
        } = self;

        let fits_file = fits_file.ok_or(ViewArgsError::NoFitsFile)?;
        let output_type = match output {
            Some(o) => OutputType::from_str(&o).map_err(|_| ViewArgsError::InvalidOutput(o))?,
            None => OutputType::default(),
        };
        let mode = match mode {
            Some(m) => SelectionMode::from_str(&m).map_err(|_| ViewArgsError::InvalidMode(m))?,
            None => SelectionMode::default(),
        };
        let selection_args = SelectionArgs {
            time_step1: timestep1,
            time_step2: timestep2,
            tile1,
            tile2,
            channel1,
            channel2,
            autos_only,
            mode,
        };
        // Don't bother opening the file if the bounds are already wrong.
        selection_args.check_order()?;

        if num_rows == Some(0) || num_cols == Some(0) {
            return Err(ViewArgsError::ZeroSubplots.into());
        }
        let summarising = matches!(
            output_type,
            OutputType::Ppd | OutputType::Grid | OutputType::Phase
        );
        if let Some(dir) = &plot_dir {
            if !summarising {
                return Err(ViewArgsError::CantPlot(output_type).into());
            }
            check_plotting_available()?;
            if !dir.is_dir() {
                return Err(ViewArgsError::PlotDirMissing(dir.clone()).into());
            }
        }

        if autos_only && mode == SelectionMode::Baseline {
            "--autos-only has no effect in baseline mode; ignoring".warn();
        }
        if power && output_type != OutputType::Csv {
            format!("--power only applies to csv output, not {output_type}; ignoring").warn();
        }
        if db && !matches!(output_type, OutputType::Ppd | OutputType::Grid) {
            format!("--db only applies to ppd and grid output, not {output_type}; ignoring").warn();
        }
        if normalise && output_type != OutputType::Ppd {
            format!("--normalise only applies to ppd output, not {output_type}; ignoring").warn();
        }
        if plot_dir.is_none() && (num_rows.is_some() || num_cols.is_some()) {
            "--num-rows and --num-cols only apply to plots; ignoring".warn();
        }
        if plot_dir.is_some() && output_file.is_some() {
            "--output-file has no effect when plotting; ignoring".warn();
        }

        let container = FitsContainer::open(&fits_file)?;
        let file = CorrelatorFile::new(container)?;
        let dims = FileDimensions {
            num_tiles: file.num_tiles(),
            num_channels: file.num_channels(),
            num_time_steps: file.num_time_steps(),
            has_weights: file.layout().has_weights(),
        };
        let requirements = Requirements {
            single_time_step: output_type == OutputType::Phase,
            weights: output_type == OutputType::Weights,
        };

        let mut file_printer = InfoPrinter::new("Input data".into());
        file_printer.push_line(format!("File: {}", fits_file.display()).into());
        file_printer.push_block(vec![
            format!("{} tiles ({} baselines)", dims.num_tiles, file.num_baselines()).into(),
            format!("{} fine channels", dims.num_channels).into(),
            format!("{} time steps", dims.num_time_steps).into(),
            format!("Layout: {:?}", file.layout()).into(),
        ]);
        file_printer.display();

        let selection = Selection::new(&selection_args, dims, requirements)?;

        let mut selection_printer = InfoPrinter::new("Selection".into());
        selection_printer.push_block(vec![
            format!(
                "Time steps:    {}-{} ({})",
                selection.time_step1(),
                selection.time_step2(),
                selection.num_time_steps()
            )
            .into(),
            format!(
                "Tiles:         {}-{} ({})",
                selection.tile1(),
                selection.tile2(),
                selection.num_tiles()
            )
            .into(),
            format!("Baselines:     {}", selection.num_baselines()).into(),
            format!(
                "Fine channels: {}-{} ({})",
                selection.channel1(),
                selection.channel2(),
                selection.num_channels()
            )
            .into(),
            format!("Mode:          {}", selection.mode()).into(),
            format!("Autos only:    {}", selection.autos_only()).into(),
        ]);
        selection_printer.display();

        let summary = |kind| match plot_dir {
            Some(directory) => Output::Plot {
                kind,
                directory,
                num_rows,
                num_cols,
            },
            None => Output::Text(kind),
        };
        let output = match output_type {
            OutputType::Csv => Output::Csv { power },
            OutputType::Weights => Output::Weights,
            OutputType::Ppd => summary(AggregateKind::PowerSpectrum { db, normalise }),
            OutputType::Grid => summary(AggregateKind::Grid { db }),
            OutputType::Phase => summary(AggregateKind::Phase),
        };

        let mut output_printer = InfoPrinter::new("Output".into());
        output_printer.push_line(format!("Type: {output_type}").into());
        let destination = match (&output, &output_file) {
            (Output::Plot { directory, .. }, _) => format!("Plots in {}", directory.display()),
            (_, Some(f)) => format!("File: {}", f.display()),
            (_, None) => "stdout".to_string(),
        };
        output_printer.push_line(destination.into());
        output_printer.display();

        display_warnings();

        Ok(ViewParams {
            file,
            selection,
            output,
            output_file,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), FitsViewError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()?;
        Ok(())
    }
}

fn is_arg_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| ArgFileTypes::from_str(&e.to_lowercase()).is_ok())
}

#[cfg(feature = "plotting")]
fn check_plotting_available() -> Result<(), FitsViewError> {
    Ok(())
}

#[cfg(not(feature = "plotting"))]
fn check_plotting_available() -> Result<(), FitsViewError> {
    Err(crate::emit::EmitError::NoPlottingFeature.into())
}

#[derive(thiserror::Error, Debug)]
pub(super) enum ViewArgsError {
    #[error("No FITS file was specified")]
    NoFitsFile,

    #[error("Unrecognised output '{0}'. Valid outputs: {}", OutputType::iter().join(", "))]
    InvalidOutput(String),

    #[error("Unrecognised selection mode '{0}'. Valid modes: {}", SelectionMode::iter().join(", "))]
    InvalidMode(String),

    #[error("{0} output can't be plotted; only ppd, grid and phase can")]
    CantPlot(OutputType),

    #[error("The plot directory '{}' doesn't exist or isn't a directory", .0.display())]
    PlotDirMissing(PathBuf),

    #[error("The number of subplot rows and columns must be greater than 0")]
    ZeroSubplots,
}
