// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmitError {
    #[cfg(not(feature = "plotting"))]
    #[error("mwax_fitsview was not compiled with the \"plotting\" feature.\nYou need to compile mwax_fitsview from source with this feature to make plots.")]
    NoPlottingFeature,

    #[cfg(feature = "plotting")]
    #[error(transparent)]
    Draw(#[from] super::plot::DrawError),

    #[error("Couldn't write to '{path}': {err}")]
    Create {
        path: std::path::PathBuf,
        err: std::io::Error,
    },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
