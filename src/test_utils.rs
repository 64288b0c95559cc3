use ndarray::{Array, IxDyn};
use rstest::fixture;

use crate::{
    header::Header,
    spectrogram::SpectrogramCube,
    units::{Quantity, Unit},
    wcs::{LinearAxis, LinearWcs},
};

pub(crate) fn exposure_times(seconds: &[f64]) -> Quantity {
    Quantity::from_vec(seconds.to_vec(), Unit::second())
}

/// A raster WCS: (slit step, position along slit, wavelength).
pub(crate) fn raster_wcs(n_steps: usize, n_slit: usize, n_wave: usize) -> LinearWcs {
    LinearWcs::new(vec![
        LinearAxis::new("HPLN-TAN", Unit::arcsec(), -100.0, 4.0, 1.0, n_steps),
        LinearAxis::new("HPLT-TAN", Unit::arcsec(), 20.0, 1.1, 2.0, n_slit),
        LinearAxis::new("WAVE", "nm".parse().expect("nm is a known unit"), 70.0, 0.01, 1.0, n_wave),
    ])
}

/// A 2 x 3 x 4 raster in counts with exposure times and times in the extra coordinates.
#[fixture]
pub(crate) fn raster_cube() -> SpectrogramCube {
    let data = Array::from_shape_fn(IxDyn(&[2, 3, 4]), |ix| (1 + ix[0] * 12 + ix[1] * 4 + ix[2]) as f64);
    let uncertainty = data.mapv(f64::sqrt);
    let mask = data.mapv(|v| v > 20.0);
    SpectrogramCube::builder(data, raster_wcs(2, 3, 4))
        .with_unit(Unit::count())
        .with_uncertainty(uncertainty)
        .with_mask(mask)
        .with_meta(Header::new().with("INSTRUME", "SPICE", "Instrument name"))
        .with_extra_coord("exposure time", Some(0), exposure_times(&[2.0, 4.0]))
        .with_extra_coord("time", Some(0), Quantity::from_vec(vec![0.0, 10.0], Unit::second()))
        .build()
        .expect("raster test cube should be valid")
}

/// A 3 x 4 sit-and-stare (time, wavelength) in counts, without uncertainty.
#[fixture]
pub(crate) fn sit_and_stare_cube() -> SpectrogramCube {
    let wcs = LinearWcs::new(vec![
        LinearAxis::new("UTC", Unit::second(), 0.0, 5.0, 1.0, 3),
        LinearAxis::new("WAVE", "Angstrom".parse().expect("Angstrom is a known unit"), 1334.5, 0.1, 1.0, 4),
    ]);
    let data = Array::from_shape_fn(IxDyn(&[3, 4]), |ix| (10 * (ix[0] + 1) + ix[1]) as f64);
    SpectrogramCube::builder(data, wcs)
        .with_unit(Unit::count())
        .with_extra_coord("exposure time", Some(0), exposure_times(&[1.0, 2.0, 5.0]))
        .build()
        .expect("sit-and-stare test cube should be valid")
}
