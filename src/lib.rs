// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Inspect, tabulate and plot the visibilities in MWAX correlator FITS files.

A file is read one time step at a time. A [`query::Selection`] says which time
steps, baselines and fine channels are wanted, [`decode`] turns the raw rows
into per-baseline, per-channel records, and [`aggregate`] summarises them into
power spectra, tile grids or phases.
 */

pub mod aggregate;
mod cli;
pub mod constants;
pub mod decode;
pub mod emit;
pub mod geometry;
pub mod io;
mod params;
#[cfg(test)]
mod tests;
pub mod query;

use crossbeam_utils::atomic::AtomicCell;

lazy_static::lazy_static! {
    /// Should progress bars be drawn?
    pub(crate) static ref PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);
}

// Re-exports.
pub use cli::{FitsView, FitsViewError};
pub use io::read::{CorrelatorContainer, CorrelatorFile, FitsContainer};
pub use query::{Selection, SelectionArgs, SelectionMode};
