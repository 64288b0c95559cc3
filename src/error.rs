//! Common errors across the sunraster-rs crate

use crate::{slicing::SliceError, units::UnitError, wcs::WcsError};

pub(crate) const APPLY_EXPOSURE_TIME_ERROR: &str = "Exposure time correction has probably already \
    been applied since the unit already includes inverse time. To apply exposure time correction \
    anyway, set 'force' kwarg to True.";

pub(crate) const UNDO_EXPOSURE_TIME_ERROR: &str = "Exposure time correction has probably already \
    been undone since the unit does not include inverse time. To undo exposure time correction \
    anyway, set 'force' kwarg to True.";

/// Errors from building, slicing, querying or correcting a spectrogram cube.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CubeError {
    /// None of the names supported for a quantity were found in the WCS
    /// physical types or the extra coordinates. `supported` lists them all.
    #[error("{quantity} axis not found. If in extra_coords, axis name must be supported: {supported:?}")]
    AxisNotFound { quantity: String, supported: &'static [&'static str] },
    #[error("{}", APPLY_EXPOSURE_TIME_ERROR)]
    ApplyExposureTime,
    #[error("{}", UNDO_EXPOSURE_TIME_ERROR)]
    UndoExposureTime,
    #[error("SpectrogramCube dimensions must be 2 or 3. Dimensions={0}")]
    InvalidDimensionality(usize),
    #[error("Shape of {what} ({actual}) does not match {expected}")]
    ShapeMismatch { what: String, expected: String, actual: String },
    #[error("Could not slice cube: {0}")]
    Slice(#[from] SliceError),
    #[error("World coordinate error: {0}")]
    Wcs(#[from] WcsError),
    #[error("Unit error: {0}")]
    Unit(#[from] UnitError),
}

impl CubeError {
    pub(crate) fn shape_mismatch(what: &str, expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            what: what.to_string(),
            expected: format!("data shape {expected:?}"),
            actual: format!("{actual:?}"),
        }
    }
}
