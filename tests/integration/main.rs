// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod view;

use std::{path::Path, process::Output, str::from_utf8};

use assert_cmd::{output::OutputError, Command};
use fitsio::{
    images::{ImageDescription, ImageType},
    FitsFile,
};

fn mwax_fitsview() -> Command {
    Command::cargo_bin("mwax_fitsview").unwrap()
}

fn get_cmd_output(result: &Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o.clone(),
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// Write a small MWAX correlator FITS file. Each visibility float is
/// `t * 100 + baseline * 10 + column`; each weight is
/// `(baseline * 4 + pol) / 10`.
fn write_mwax_fits(
    file: &Path,
    num_tiles: usize,
    num_channels: usize,
    num_time_steps: usize,
    weights: bool,
) {
    let num_baselines = num_tiles * (num_tiles + 1) / 2;
    let width = num_channels * 8;
    let mut fptr = FitsFile::create(file).open().unwrap();
    let hdu = fptr.primary_hdu().unwrap();
    hdu.write_key(&mut fptr, "NINPUTS", (num_tiles * 2) as i64)
        .unwrap();

    for t in 1..=num_time_steps {
        let mut vis = Vec::with_capacity(num_baselines * width);
        for bl in 0..num_baselines {
            for col in 0..width {
                vis.push((t * 100 + bl * 10 + col) as f32);
            }
        }
        let hdu = fptr
            .create_image(
                format!("VIS{t}"),
                &ImageDescription {
                    data_type: ImageType::Float,
                    dimensions: &[num_baselines, width],
                },
            )
            .unwrap();
        hdu.write_image(&mut fptr, &vis).unwrap();
        hdu.write_key(&mut fptr, "MARKER", (t - 1) as i64).unwrap();

        if weights {
            let w: Vec<f32> = (0..num_baselines * 4).map(|i| i as f32 / 10.0).collect();
            let hdu = fptr
                .create_image(
                    format!("WEIGHTS{t}"),
                    &ImageDescription {
                        data_type: ImageType::Float,
                        dimensions: &[num_baselines, 4],
                    },
                )
                .unwrap();
            hdu.write_image(&mut fptr, &w).unwrap();
        }
    }
}
