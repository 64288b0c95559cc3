//! World coordinate systems.
//!
//! The spectrogram code only talks to a WCS through [`WorldCoordinates`]. The
//! [`LinearWcs`] implementation covers separable, linear axes described by the
//! usual FITS keywords, which is what slit spectrograph level 2 products use for
//! the wavelength, slit and raster axes.
use std::fmt::Debug;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::{
    header::{Header, HeaderError},
    slicing::{resolve_slices, AxisSlice, ResolvedSlice, SliceError},
    units::{Quantity, Unit, UnitError},
};

#[derive(Debug, Clone, thiserror::Error)]
pub enum WcsError {
    #[error("No WCS axis with physical type '{0}'")]
    AxisNotFound(String),
    #[error("Invalid WCS header: {0}")]
    Header(#[from] HeaderError),
    #[error("Invalid WCS unit: {0}")]
    Unit(#[from] UnitError),
    #[error("NAXIS{axis} = {value} is not a valid axis length")]
    BadAxisLength { axis: usize, value: i64 },
    #[error(transparent)]
    Slice(#[from] SliceError),
}

/// What a spectrogram cube needs from a world coordinate system.
///
/// Axes are always given in data (row-major) order, one entry per data axis.
pub trait WorldCoordinates: Clone + Debug {
    /// Number of pixels along each axis.
    fn pixel_shape(&self) -> Vec<usize>;

    /// The physical type label of each axis, `None` if the axis has none.
    fn world_axis_physical_types(&self) -> Vec<Option<String>>;

    /// World coordinate values along the first axis labelled `physical_type`.
    fn axis_world_coords(&self, physical_type: &str) -> Result<Quantity, WcsError>;

    /// Apply the same slicing that is applied to the data array.
    fn slice(&self, items: &[AxisSlice]) -> Result<Self, WcsError>;
}

/// Map a FITS CTYPE to the physical type label used to find axes.
pub fn ctype_to_physical_type(ctype: &str) -> Option<&'static str> {
    let prefix = ctype.split('-').next().unwrap_or_default().trim().to_ascii_uppercase();
    match prefix.as_str() {
        "WAVE" | "AWAV" => Some("em.wl"),
        "FREQ" => Some("em.freq"),
        "ENER" => Some("em.energy"),
        "HPLN" => Some("custom:pos.helioprojective.lon"),
        "HPLT" => Some("custom:pos.helioprojective.lat"),
        "TIME" | "UTC" => Some("time"),
        _ => None,
    }
}

/// One linear axis: `world = crval + cdelt * (pixel + 1 - crpix)` with 0-based
/// `pixel`, i.e. `crpix` follows the FITS 1-based convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearAxis {
    pub ctype: String,
    #[serde(default)]
    pub cunit: Unit,
    #[serde(default)]
    pub crval: f64,
    #[serde(default = "default_cdelt")]
    pub cdelt: f64,
    #[serde(default)]
    pub crpix: f64,
    pub naxis: usize,
}

fn default_cdelt() -> f64 {
    1.0
}

impl LinearAxis {
    pub fn new(ctype: &str, cunit: Unit, crval: f64, cdelt: f64, crpix: f64, naxis: usize) -> Self {
        Self { ctype: ctype.to_string(), cunit, crval, cdelt, crpix, naxis }
    }

    pub fn physical_type(&self) -> Option<&'static str> {
        ctype_to_physical_type(&self.ctype)
    }

    pub fn world_values(&self) -> Array1<f64> {
        Array1::from_iter(
            (0..self.naxis).map(|p| self.crval + self.cdelt * ((p + 1) as f64 - self.crpix))
        )
    }

    fn sliced(&self, start: usize, step: usize, len: usize) -> Self {
        let step = step as f64;
        Self {
            ctype: self.ctype.clone(),
            cunit: self.cunit.clone(),
            crval: self.crval,
            cdelt: self.cdelt * step,
            crpix: 1.0 - (start as f64 + 1.0 - self.crpix) / step,
            naxis: len,
        }
    }
}

/// A WCS made of independent linear axes, stored in data order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearWcs {
    axes: Vec<LinearAxis>,
}

impl LinearWcs {
    pub fn new(axes: Vec<LinearAxis>) -> Self {
        Self { axes }
    }

    pub fn axes(&self) -> &[LinearAxis] {
        &self.axes
    }

    /// Build from FITS keywords. FITS numbers axes fastest-varying first, so
    /// `NAXIS1` becomes the last data axis.
    pub fn from_header(header: &Header) -> Result<Self, WcsError> {
        let naxis = header.get_i64("NAXIS")?;
        let mut axes = Vec::with_capacity(naxis.max(0) as usize);
        for i in (1..=naxis).rev() {
            let len = header.get_i64(&format!("NAXIS{i}"))?;
            if len < 0 {
                return Err(WcsError::BadAxisLength { axis: i as usize, value: len });
            }

            let ctype = match header.get(&format!("CTYPE{i}")) {
                Some(_) => header.get_str(&format!("CTYPE{i}"))?.to_string(),
                None => String::new(),
            };
            let cunit = match header.get(&format!("CUNIT{i}")) {
                Some(_) => header.get_str(&format!("CUNIT{i}"))?.parse()?,
                None => Unit::dimensionless(),
            };

            axes.push(LinearAxis {
                ctype,
                cunit,
                crval: header.get_f64_or(&format!("CRVAL{i}"), 0.0)?,
                cdelt: header.get_f64_or(&format!("CDELT{i}"), 1.0)?,
                crpix: header.get_f64_or(&format!("CRPIX{i}"), 0.0)?,
                naxis: len as usize,
            });
        }
        log::debug!("Read {} WCS axes from header", axes.len());
        Ok(Self { axes })
    }
}

impl WorldCoordinates for LinearWcs {
    fn pixel_shape(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.naxis).collect()
    }

    fn world_axis_physical_types(&self) -> Vec<Option<String>> {
        self.axes.iter()
            .map(|a| a.physical_type().map(|t| t.to_string()))
            .collect()
    }

    fn axis_world_coords(&self, physical_type: &str) -> Result<Quantity, WcsError> {
        let axis = self.axes.iter()
            .find(|a| a.physical_type() == Some(physical_type))
            .ok_or_else(|| WcsError::AxisNotFound(physical_type.to_string()))?;
        Ok(Quantity::new(axis.world_values().into_dyn(), axis.cunit.clone()))
    }

    fn slice(&self, items: &[AxisSlice]) -> Result<Self, WcsError> {
        let slices = resolve_slices(items, &self.pixel_shape())?;
        let axes = self.axes.iter()
            .zip(slices)
            .filter_map(|(axis, slice)| match slice {
                ResolvedSlice::Drop(_) => None,
                ResolvedSlice::Keep { start, step, len } => Some(axis.sliced(start, step, len)),
            })
            .collect();
        Ok(Self { axes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rstest::rstest;

    #[rstest]
    #[case("WAVE", Some("em.wl"))]
    #[case("AWAV", Some("em.wl"))]
    #[case("HPLN-TAN", Some("custom:pos.helioprojective.lon"))]
    #[case("HPLT-TAN", Some("custom:pos.helioprojective.lat"))]
    #[case("UTC", Some("time"))]
    #[case("FREQ", Some("em.freq"))]
    #[case("STOKES", None)]
    #[case("", None)]
    fn test_ctype_mapping(#[case] ctype: &str, #[case] expected: Option<&str>) {
        assert_eq!(ctype_to_physical_type(ctype), expected);
    }

    #[test]
    fn test_from_header_reverses_axes() {
        let hdr = Header::new()
            .with("NAXIS", 3, "")
            .with("NAXIS1", 4, "")
            .with("NAXIS2", 3, "")
            .with("NAXIS3", 2, "")
            .with("CTYPE1", "WAVE", "")
            .with("CUNIT1", "nm", "")
            .with("CRVAL1", 70.0, "")
            .with("CDELT1", 0.01, "")
            .with("CRPIX1", 1.0, "")
            .with("CTYPE2", "HPLT-TAN", "")
            .with("CUNIT2", "arcsec", "")
            .with("CTYPE3", "HPLN-TAN", "")
            .with("CUNIT3", "arcsec", "");
        let wcs = LinearWcs::from_header(&hdr).unwrap();
        assert_eq!(wcs.pixel_shape(), vec![2, 3, 4]);
        assert_eq!(
            wcs.world_axis_physical_types(),
            vec![
                Some("custom:pos.helioprojective.lon".to_string()),
                Some("custom:pos.helioprojective.lat".to_string()),
                Some("em.wl".to_string())
            ]
        );

        let wl = wcs.axis_world_coords("em.wl").unwrap();
        assert_eq!(wl.unit().to_string(), "nm");
        ndarray::Zip::from(wl.value())
            .and(&array![70.0, 70.01, 70.02, 70.03].into_dyn())
            .for_each(|&a, &b| assert_abs_diff_eq!(a, b, epsilon = 1e-9));
    }

    #[test]
    fn test_from_header_bad_cards() {
        let hdr = Header::new()
            .with("NAXIS", 2, "")
            .with("NAXIS1", 4, "")
            .with("NAXIS2", -3, "");
        let err = LinearWcs::from_header(&hdr).unwrap_err();
        assert!(matches!(err, WcsError::BadAxisLength { axis: 2, value: -3 }), "{err}");

        let hdr = Header::new()
            .with("NAXIS", 1, "")
            .with("NAXIS1", 4, "")
            .with("CUNIT1", "m2147483647 m", "");
        let err = LinearWcs::from_header(&hdr).unwrap_err();
        assert!(matches!(err, WcsError::Unit(UnitError::Parse { .. })), "{err}");
    }

    #[test]
    fn test_missing_axis() {
        let wcs = LinearWcs::new(vec![LinearAxis::new("WAVE", Unit::meter(), 0.0, 1.0, 1.0, 3)]);
        assert!(matches!(wcs.axis_world_coords("time"), Err(WcsError::AxisNotFound(_))));
    }

    #[test]
    fn test_slice_keeps_world_values() {
        let wcs = LinearWcs::new(vec![
            LinearAxis::new("UTC", Unit::second(), 0.0, 10.0, 1.0, 5),
            LinearAxis::new("WAVE", Unit::meter(), 1.0, 0.5, 2.0, 6),
        ]);
        let full_wl = wcs.axis_world_coords("em.wl").unwrap();

        let sliced = wcs.slice(&[AxisSlice::Index(2), AxisSlice::Range { start: Some(1), stop: None, step: 2 }]).unwrap();
        assert_eq!(sliced.pixel_shape(), vec![3]);
        assert_eq!(sliced.world_axis_physical_types(), vec![Some("em.wl".to_string())]);
        let wl = sliced.axis_world_coords("em.wl").unwrap();
        for (i, &v) in wl.value().iter().enumerate() {
            assert_abs_diff_eq!(v, full_wl.value()[[1 + 2 * i]], epsilon = 1e-12);
        }
    }
}
