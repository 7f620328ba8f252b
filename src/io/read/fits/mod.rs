// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helper functions for reading FITS files, and a [`CorrelatorContainer`]
//! backed by a MWAX correlator FITS file.

mod error;

pub use error::FitsError;

use std::{fmt::Display, path::Path};

use fitsio::{hdu::*, FitsFile};
use log::trace;
use ndarray::Array2;

use super::{ContainerError, CorrelatorContainer};

/// Open a fits file.
#[track_caller]
pub(crate) fn fits_open<P: AsRef<Path>>(file: P) -> Result<FitsFile, FitsError> {
    FitsFile::open(file.as_ref()).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Open {
            fits_error: Box::new(e),
            fits_filename: file.as_ref().to_path_buf().into_boxed_path(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Open a fits file's HDU.
#[track_caller]
pub(crate) fn fits_open_hdu<T: DescribesHdu + Display + Copy>(
    fits_fptr: &mut FitsFile,
    hdu_description: T,
) -> Result<FitsHdu, FitsError> {
    fits_fptr.hdu(hdu_description).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Fitsio {
            fits_error: Box::new(e),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            hdu_description: format!("{hdu_description}").into_boxed_str(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Count the HDUs in a fits file.
#[track_caller]
pub(crate) fn fits_num_hdus(fits_fptr: &mut FitsFile) -> Result<usize, FitsError> {
    let mut num_hdus = 0;
    let mut status = 0;
    unsafe {
        // ffthdu = fits_get_num_hdus
        fitsio_sys::ffthdu(fits_fptr.as_raw(), &mut num_hdus, &mut status);
    }
    fitsio::errors::check_status(status).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Fitsio {
            fits_error: Box::new(e),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            hdu_description: "all".into(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })?;
    Ok(num_hdus as usize)
}

/// Given a FITS file pointer, a HDU that belongs to it, and a keyword that may
/// or may not exist, pull out the value of the keyword, parsing it into the
/// desired type.
#[track_caller]
pub(crate) fn fits_get_optional_key<T: std::str::FromStr>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
) -> Result<Option<T>, FitsError> {
    let unparsed_value: String = match hdu.read_key(fits_fptr, keyword) {
        Ok(key_value) => key_value,
        Err(e) => match &e {
            fitsio::errors::Error::Fits(fe) => match fe.status {
                202 | 204 => return Ok(None),
                _ => {
                    let caller = std::panic::Location::caller();
                    return Err(FitsError::Fitsio {
                        fits_error: Box::new(e),
                        fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                        hdu_description: format!("{}", hdu.number + 1).into_boxed_str(),
                        source_file: caller.file(),
                        source_line: caller.line(),
                        source_column: caller.column(),
                    });
                }
            },
            _ => {
                let caller = std::panic::Location::caller();
                return Err(FitsError::Fitsio {
                    fits_error: Box::new(e),
                    fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                    hdu_description: format!("{}", hdu.number + 1).into_boxed_str(),
                    source_file: caller.file(),
                    source_line: caller.line(),
                    source_column: caller.column(),
                });
            }
        },
    };

    match unparsed_value.trim().parse() {
        Ok(parsed_value) => Ok(Some(parsed_value)),
        Err(_) => {
            let caller = std::panic::Location::caller();
            Err(FitsError::Parse {
                key: keyword.to_string().into_boxed_str(),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// Get the shape of the image on the supplied FITS file pointer and HDU.
#[track_caller]
pub(crate) fn fits_get_image_shape<'a>(
    fits_fptr: &FitsFile,
    hdu: &'a FitsHdu,
) -> Result<&'a Vec<usize>, FitsError> {
    match &hdu.info {
        HduInfo::ImageInfo { shape, .. } => Ok(shape),
        _ => {
            let caller = std::panic::Location::caller();
            Err(FitsError::NotImage {
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// Given a FITS file pointer and a HDU, read the associated image.
#[track_caller]
pub(crate) fn fits_get_image<T: fitsio::images::ReadImage>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
) -> Result<T, FitsError> {
    match &hdu.info {
        HduInfo::ImageInfo { .. } => hdu.read_image(fits_fptr).map_err(|e| {
            let caller = std::panic::Location::caller();
            FitsError::Fitsio {
                fits_error: Box::new(e),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_description: format!("{}", hdu.number + 1).into_boxed_str(),
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            }
        }),
        _ => {
            let caller = std::panic::Location::caller();
            Err(FitsError::NotImage {
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// A MWAX correlator FITS file. The underlying cfitsio handle is closed when
/// this is dropped.
pub struct FitsContainer {
    fptr: FitsFile,
}

impl FitsContainer {
    pub fn open<P: AsRef<Path>>(file: P) -> Result<FitsContainer, FitsError> {
        trace!("Opening {}", file.as_ref().display());
        let fptr = fits_open(file)?;
        Ok(FitsContainer { fptr })
    }
}

impl CorrelatorContainer for FitsContainer {
    fn name(&self) -> String {
        self.fptr.file_path().display().to_string()
    }

    fn segment_count(&mut self) -> Result<usize, ContainerError> {
        Ok(fits_num_hdus(&mut self.fptr)?)
    }

    fn header_key(&mut self, segment: usize, key: &str) -> Result<Option<String>, ContainerError> {
        let hdu = fits_open_hdu(&mut self.fptr, segment)?;
        Ok(fits_get_optional_key(&mut self.fptr, &hdu, key)?)
    }

    fn segment_shape(&mut self, segment: usize) -> Result<(usize, usize), ContainerError> {
        let hdu = fits_open_hdu(&mut self.fptr, segment)?;
        match fits_get_image_shape(&self.fptr, &hdu)?.as_slice() {
            // cfitsio reports the slowest-varying axis (NAXIS2) first.
            &[rows, width] => Ok((rows, width)),
            other => Err(ContainerError::NotTwoDimensional {
                segment,
                num_axes: other.len(),
            }),
        }
    }

    fn segment_data(&mut self, segment: usize) -> Result<Array2<f32>, ContainerError> {
        let (rows, width) = self.segment_shape(segment)?;
        let hdu = fits_open_hdu(&mut self.fptr, segment)?;
        let data: Vec<f32> = fits_get_image(&mut self.fptr, &hdu)?;
        let num_floats = data.len();
        Array2::from_shape_vec((rows, width), data).map_err(|_| ContainerError::DataSize {
            segment,
            expected: rows * width,
            got: num_floats,
        })
    }
}
