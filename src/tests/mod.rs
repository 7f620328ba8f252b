// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helpful functions for tests.

use std::path::Path;

use fitsio::{
    images::{ImageDescription, ImageType},
    FitsFile,
};
use ndarray::Array2;

use crate::{
    constants::{FLOATS_PER_CHANNEL, KEY_MARKER, KEY_NUM_INPUTS, WEIGHTS_ROW_WIDTH},
    geometry::num_baselines,
};

/// The value of every weight written by [`write_mwax_fits`].
pub(crate) fn weight_value(bl: usize, pol: usize) -> f32 {
    (bl * WEIGHTS_ROW_WIDTH + pol) as f32 / 10.0
}

/// Write a small MWAX correlator FITS file. `vis_value` is given the 1-based
/// time step, the baseline index and the column within the visibility row.
/// If `weights` is true, a weights HDU follows each visibility HDU.
pub(crate) fn write_mwax_fits(
    file: &Path,
    num_tiles: usize,
    num_channels: usize,
    num_time_steps: usize,
    weights: bool,
    vis_value: impl Fn(usize, usize, usize) -> f32,
) {
    let num_baselines = num_baselines(num_tiles);
    let mut fptr = FitsFile::create(file).open().unwrap();
    let hdu = fptr.primary_hdu().unwrap();
    hdu.write_key(&mut fptr, KEY_NUM_INPUTS, (num_tiles * 2) as i64)
        .unwrap();

    for t in 1..=num_time_steps {
        let vis = Array2::from_shape_fn(
            (num_baselines, num_channels * FLOATS_PER_CHANNEL),
            |(bl, col)| vis_value(t, bl, col),
        );
        let image_description = ImageDescription {
            data_type: ImageType::Float,
            dimensions: &[num_baselines, num_channels * FLOATS_PER_CHANNEL],
        };
        let hdu = fptr
            .create_image(format!("VIS{t}"), &image_description)
            .unwrap();
        hdu.write_image(&mut fptr, vis.as_slice().unwrap()).unwrap();
        hdu.write_key(&mut fptr, KEY_MARKER, (t - 1) as i64)
            .unwrap();

        if weights {
            let w = Array2::from_shape_fn((num_baselines, WEIGHTS_ROW_WIDTH), |(bl, pol)| {
                weight_value(bl, pol)
            });
            let image_description = ImageDescription {
                data_type: ImageType::Float,
                dimensions: &[num_baselines, WEIGHTS_ROW_WIDTH],
            };
            let hdu = fptr
                .create_image(format!("WEIGHTS{t}"), &image_description)
                .unwrap();
            hdu.write_image(&mut fptr, w.as_slice().unwrap()).unwrap();
        }
    }
}
