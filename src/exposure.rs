//! Exposure time correction of data and uncertainty arrays.
//!
//! Whether a cube has already been corrected is not stored anywhere. It is
//! inferred from the data unit: a unit that decomposes to something containing
//! seconds is taken to already be a rate. This is a heuristic, so both directions
//! can be forced.
use ndarray::{ArrayD, Axis, Zip};

use crate::{
    error::CubeError,
    units::{BaseUnit, Unit},
};

/// Data and uncertainty after (un)doing the exposure time correction.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedArrays {
    pub data: ArrayD<f64>,
    pub uncertainty: Option<ArrayD<f64>>,
    pub unit: Unit,
}

/// Reshape per-exposure times (in seconds) so they broadcast against data with
/// `ndim` dimensions, the exposures running along the first data axis.
///
/// Scalars are returned unchanged. 1-D data uses the array as is.
pub fn broadcastable_exposure_time(exposure_time_s: ArrayD<f64>, ndim: usize) -> Result<ArrayD<f64>, CubeError> {
    if exposure_time_s.ndim() == 0 {
        return Ok(exposure_time_s);
    }

    match ndim {
        1 => Ok(exposure_time_s),
        2 => Ok(exposure_time_s.insert_axis(Axis(1))),
        3 => Ok(exposure_time_s.insert_axis(Axis(1)).insert_axis(Axis(2))),
        _ => Err(CubeError::InvalidDimensionality(ndim)),
    }
}

fn broadcast_apply<F>(array: &ArrayD<f64>, exposure_time: &ArrayD<f64>, op: F) -> Result<ArrayD<f64>, CubeError>
where
    F: Fn(f64, f64) -> f64,
{
    let exposure_time = exposure_time.broadcast(array.raw_dim())
        .ok_or_else(|| CubeError::shape_mismatch("exposure time", array.shape(), exposure_time.shape()))?;
    Ok(Zip::from(array).and(&exposure_time).map_collect(|&v, &t| op(v, t)))
}

/// True if the unit's decomposition contains seconds to any power.
fn has_time_base(unit: &Unit) -> bool {
    unit.decompose().contains(BaseUnit::Second)
}

/// Divide data and uncertainty by the exposure time and append "/ s" to the unit.
///
/// Unless `force` is set, refuses to run if `unit` already involves time.
pub fn calculate_exposure_time_correction(
    data: &ArrayD<f64>,
    uncertainty: Option<&ArrayD<f64>>,
    unit: &Unit,
    exposure_time_s: &ArrayD<f64>,
    force: bool,
) -> Result<CorrectedArrays, CubeError> {
    if !force && has_time_base(unit) {
        return Err(CubeError::ApplyExposureTime);
    }

    let data = broadcast_apply(data, exposure_time_s, |v, t| v / t)?;
    let uncertainty = uncertainty
        .map(|u| broadcast_apply(u, exposure_time_s, |v, t| v / t))
        .transpose()?;
    Ok(CorrectedArrays { data, uncertainty, unit: unit / &Unit::second() })
}

/// Multiply data and uncertainty by the exposure time and multiply the unit by seconds.
///
/// Unless `force` is set, refuses to run if `unit * s` still involves time,
/// i.e. if `unit` was not a rate.
pub fn uncalculate_exposure_time_correction(
    data: &ArrayD<f64>,
    uncertainty: Option<&ArrayD<f64>>,
    unit: &Unit,
    exposure_time_s: &ArrayD<f64>,
    force: bool,
) -> Result<CorrectedArrays, CubeError> {
    let new_unit = unit * &Unit::second();
    if !force && has_time_base(&new_unit) {
        return Err(CubeError::UndoExposureTime);
    }

    let data = broadcast_apply(data, exposure_time_s, |v, t| v * t)?;
    let uncertainty = uncertainty
        .map(|u| broadcast_apply(u, exposure_time_s, |v, t| v * t))
        .transpose()?;
    Ok(CorrectedArrays { data, uncertainty, unit: new_unit })
}
