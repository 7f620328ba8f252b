// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Visibility data has shape ({rows}, {width}), but {expected_rows} rows and a width of at least {min_width} (a multiple of 8) were expected")]
    VisShape {
        rows: usize,
        width: usize,
        expected_rows: usize,
        min_width: usize,
    },

    #[error("Weights data has shape ({rows}, {width}), but ({expected_rows}, 4) was expected")]
    WeightsShape {
        rows: usize,
        width: usize,
        expected_rows: usize,
    },

    #[error("Time step {time_step} has no weights")]
    NoWeights { time_step: usize },
}
