// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all mwax_fitsview-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use super::view::ViewArgsError;
use crate::{
    decode::DecodeError,
    emit::EmitError,
    io::read::{ContainerError, FitsError},
    params::ViewError,
    query::SelectionError,
};

/// The *only* publicly visible error from mwax_fitsview. Each error message
/// should say what to look at, unless it's "generic".
#[derive(Error, Debug)]
pub enum FitsViewError {
    /// The requested selection doesn't fit the file.
    #[error("{0}\n\nUse --dry-run to see the dimensions of the file without reading any data.")]
    Selection(String),

    /// The file isn't laid out like an MWAX correlator file.
    #[error("{0}\n\nThe input doesn't look like an MWAX correlator FITS file, or it is corrupt.")]
    Container(String),

    /// An error related to making plots.
    #[error("{0}\n\nPlots need the \"plotting\" feature and a writable --plot-dir.")]
    Plot(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files are toml or json, with the same keys as the long command-line options (e.g. timestep1, autos_only).")]
    ArgFile(String),

    /// A cfitsio error. Because these are usually quite spartan, some
    /// suggestions are provided here.
    #[error("cfitsio error: {0}\n\nIf you don't know what this means, try turning up verbosity (-v or -vv) and maybe disabling progress bars.")]
    Cfitsio(String),

    /// A generic error that can't be clarified further with documentation, e.g.
    /// IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

// Binary errors.

impl From<ViewArgsError> for FitsViewError {
    fn from(e: ViewArgsError) -> Self {
        let s = e.to_string();
        match e {
            ViewArgsError::CantPlot(_)
            | ViewArgsError::PlotDirMissing(_)
            | ViewArgsError::ZeroSubplots => Self::Plot(s),
            ViewArgsError::NoFitsFile
            | ViewArgsError::InvalidOutput(_)
            | ViewArgsError::InvalidMode(_) => Self::Generic(s),
        }
    }
}

impl From<ViewError> for FitsViewError {
    fn from(e: ViewError) -> Self {
        match e {
            ViewError::Container(e) => Self::from(e),
            ViewError::Decode(e) => Self::from(e),
            ViewError::Emit(e) => Self::from(e),
        }
    }
}

// Library code errors.

impl From<SelectionError> for FitsViewError {
    fn from(e: SelectionError) -> Self {
        Self::Selection(e.to_string())
    }
}

impl From<ContainerError> for FitsViewError {
    fn from(e: ContainerError) -> Self {
        let s = e.to_string();
        match e {
            ContainerError::Fits(_) => Self::Cfitsio(s),
            ContainerError::TimeStepOutOfRange { .. } => Self::Selection(s),
            ContainerError::NoDataSegments { .. }
            | ContainerError::BadRowWidth { .. }
            | ContainerError::OddSegmentCount { .. }
            | ContainerError::BadNumInputs { .. }
            | ContainerError::NotTriangular { .. }
            | ContainerError::BadSegmentShape { .. }
            | ContainerError::NotTwoDimensional { .. }
            | ContainerError::DataSize { .. }
            | ContainerError::MissingKey { .. }
            | ContainerError::Parse { .. } => Self::Container(s),
        }
    }
}

impl From<FitsError> for FitsViewError {
    fn from(e: FitsError) -> Self {
        Self::Cfitsio(e.to_string())
    }
}

impl From<DecodeError> for FitsViewError {
    fn from(e: DecodeError) -> Self {
        Self::Container(e.to_string())
    }
}

impl From<EmitError> for FitsViewError {
    fn from(e: EmitError) -> Self {
        let s = e.to_string();
        match e {
            #[cfg(not(feature = "plotting"))]
            EmitError::NoPlottingFeature => Self::Plot(s),
            #[cfg(feature = "plotting")]
            EmitError::Draw(_) => Self::Plot(s),
            EmitError::Create { .. } | EmitError::IO(_) => Self::Generic(s),
        }
    }
}

// External crate errors.

impl From<std::io::Error> for FitsViewError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<toml::ser::Error> for FitsViewError {
    fn from(e: toml::ser::Error) -> Self {
        Self::ArgFile(e.to_string())
    }
}

impl From<log::SetLoggerError> for FitsViewError {
    fn from(e: log::SetLoggerError) -> Self {
        Self::Generic(format!("Failed to initialise logging: {e}"))
    }
}
