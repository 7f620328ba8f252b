// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Useful constants.
//!
//! Visibilities are stored as single-precision floats, but everything derived
//! from them (power, phase, dB) is computed in double precision.

/// The number of polarisation products in a visibility (XX, XY, YX, YY).
pub const NUM_POLS: usize = 4;

/// The number of floats per complex value (real, imaginary).
pub const NUM_VALUES: usize = 2;

/// The number of floats occupied by one fine channel in a visibility row.
pub const FLOATS_PER_CHANNEL: usize = NUM_POLS * NUM_VALUES;

/// The row width of a weights segment; one scalar per polarisation product.
pub const WEIGHTS_ROW_WIDTH: usize = NUM_POLS;

/// The number of signal chains (polarisations) per tile.
pub const SIGNAL_CHAINS_PER_TILE: usize = 2;

/// The primary-HDU key holding the total number of signal chains.
pub const KEY_NUM_INPUTS: &str = "NINPUTS";

/// The per-visibility-segment sequence marker.
pub const KEY_MARKER: &str = "MARKER";

/// dB values are computed as `log10(v + 1) * DB_SCALE`.
pub const DB_SCALE: f64 = 10.0;

/// Grid cells whose untransformed power doesn't exceed this are treated as
/// empty when flooring a dB grid.
pub const GRID_EMPTY_THRESHOLD: f64 = 1.0;
