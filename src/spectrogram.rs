//! Spectrogram cubes: slit spectrograph data with named physical axes.
use std::fmt::Display;

use itertools::Itertools;
use log::{debug, warn};
use ndarray::ArrayD;
use strum::IntoEnumIterator;

use crate::{
    error::CubeError,
    exposure::{broadcastable_exposure_time, calculate_exposure_time_correction, uncalculate_exposure_time_correction},
    header::Header,
    ndcube::{ExtraCoordInput, ExtraCoords, NdCube},
    resolver::{resolve, AxisLocation, CoordSource, PhysicalQuantity},
    slicing::AxisSlice,
    units::{Quantity, Unit},
    wcs::{LinearWcs, WorldCoordinates},
};

const CUBE_NAME: &str = "SpectrogramCube";

/// The interface every kind of spectrogram provides.
pub trait Spectrogram {
    /// The spectral coordinates for each pixel.
    fn spectral_axis(&self) -> Result<Quantity, CubeError>;

    /// The time coordinates for each pixel.
    fn time(&self) -> Result<Quantity, CubeError>;

    /// The exposure time for each exposure.
    fn exposure_time(&self) -> Result<Quantity, CubeError>;

    /// The longitude coordinates for each pixel.
    fn lon(&self) -> Result<Quantity, CubeError>;

    /// The latitude coordinates for each pixel.
    fn lat(&self) -> Result<Quantity, CubeError>;

    /// Apply (or with `undo`, remove) the exposure time correction to the data
    /// and uncertainty and adjust the unit.
    ///
    /// Correction is only applied if the unit does not already include time, and
    /// only undone if it does. `force` skips that check; the unit is still
    /// divided (multiplied) by seconds. The result is always a new spectrogram.
    fn apply_exposure_time_correction(&self, undo: bool, force: bool) -> Result<Self, CubeError>
    where
        Self: Sized;
}

/// A sit-and-stare or single raster of slit spectrogram data, described by a
/// single WCS.
///
/// The axes holding wavelength, time, exposure time, longitude and latitude are
/// looked up once when the cube is built (see [`crate::resolver`]). Cubes are
/// never modified; slicing and exposure time correction return new cubes, which
/// look their axes up again.
#[derive(Debug, Clone)]
pub struct SpectrogramCube<W = LinearWcs> {
    cube: NdCube<W>,
    spectral: AxisLocation,
    time: AxisLocation,
    exposure_time: AxisLocation,
    longitude: AxisLocation,
    latitude: AxisLocation,
}

impl<W: WorldCoordinates> SpectrogramCube<W> {
    /// Create a cube.
    ///
    /// * `extra_coords` - coordinates not in the WCS, as `(name, data axis, values)`.
    /// * `unit` - unit of `data`; dimensionless if `None`.
    /// * `uncertainty` - standard deviation of `data`, same shape.
    /// * `mask` - `true` marks invalid data, same shape.
    pub fn new(
        data: ArrayD<f64>,
        wcs: W,
        extra_coords: Option<Vec<ExtraCoordInput>>,
        unit: Option<Unit>,
        uncertainty: Option<ArrayD<f64>>,
        meta: Option<Header>,
        mask: Option<ArrayD<bool>>,
    ) -> Result<Self, CubeError> {
        SpectrogramCubeBuilder {
            data,
            wcs,
            extra_coords: extra_coords.unwrap_or_default(),
            unit: unit.unwrap_or_default(),
            uncertainty,
            meta: meta.unwrap_or_default(),
            mask,
        }.build()
    }

    pub fn builder(data: ArrayD<f64>, wcs: W) -> SpectrogramCubeBuilder<W> {
        SpectrogramCubeBuilder::new(data, wcs)
    }

    /// A builder holding all of this cube's fields, for making a modified copy.
    pub fn to_builder(&self) -> SpectrogramCubeBuilder<W> {
        SpectrogramCubeBuilder {
            data: self.cube.data().clone(),
            wcs: self.cube.wcs().clone(),
            extra_coords: self.cube.extra_coords().to_input(),
            unit: self.cube.unit().clone(),
            uncertainty: self.cube.uncertainty().cloned(),
            meta: self.cube.meta().clone(),
            mask: self.cube.mask().cloned(),
        }
    }

    fn from_ndcube(cube: NdCube<W>) -> Self {
        let physical_types = cube.world_axis_physical_types();
        let extra_coords = Some(cube.extra_coords());
        let find = |q: PhysicalQuantity| {
            let loc = resolve(q.supported_names(), &physical_types, extra_coords);
            debug!("{q} axis resolved to {loc:?}");
            loc
        };

        let spectral = find(PhysicalQuantity::Spectral);
        let time = find(PhysicalQuantity::Time);
        let exposure_time = find(PhysicalQuantity::ExposureTime);
        let longitude = find(PhysicalQuantity::Longitude);
        let latitude = find(PhysicalQuantity::Latitude);
        Self { cube, spectral, time, exposure_time, longitude, latitude }
    }

    pub fn data(&self) -> &ArrayD<f64> {
        self.cube.data()
    }

    pub fn wcs(&self) -> &W {
        self.cube.wcs()
    }

    pub fn unit(&self) -> &Unit {
        self.cube.unit()
    }

    pub fn uncertainty(&self) -> Option<&ArrayD<f64>> {
        self.cube.uncertainty()
    }

    pub fn mask(&self) -> Option<&ArrayD<bool>> {
        self.cube.mask()
    }

    pub fn meta(&self) -> &Header {
        self.cube.meta()
    }

    pub fn extra_coords(&self) -> &ExtraCoords {
        self.cube.extra_coords()
    }

    pub fn dimensions(&self) -> &[usize] {
        self.cube.dimensions()
    }

    pub fn world_axis_physical_types(&self) -> Vec<Option<String>> {
        self.cube.world_axis_physical_types()
    }

    /// Where `quantity` was found when this cube was built.
    pub fn axis_location(&self, quantity: PhysicalQuantity) -> &AxisLocation {
        match quantity {
            PhysicalQuantity::Spectral => &self.spectral,
            PhysicalQuantity::Time => &self.time,
            PhysicalQuantity::ExposureTime => &self.exposure_time,
            PhysicalQuantity::Longitude => &self.longitude,
            PhysicalQuantity::Latitude => &self.latitude,
        }
    }

    /// The coordinate values of `quantity`, from wherever it was found.
    pub fn coordinate(&self, quantity: PhysicalQuantity) -> Result<Quantity, CubeError> {
        match self.axis_location(quantity) {
            AxisLocation::Unresolved => Err(CubeError::AxisNotFound {
                quantity: quantity.to_string(),
                supported: quantity.supported_names(),
            }),
            AxisLocation::Resolved { name, source: CoordSource::Wcs { .. } } => {
                Ok(self.cube.axis_world_coords(name)?)
            },
            AxisLocation::Resolved { name, source: CoordSource::SideTable } => {
                self.cube.extra_coords()
                    .get(name)
                    .map(|c| c.value.clone())
                    .ok_or_else(|| CubeError::AxisNotFound {
                        quantity: quantity.to_string(),
                        supported: quantity.supported_names(),
                    })
            },
        }
    }

    /// Slice the cube. `items` gives one [`AxisSlice`] per data axis, leading
    /// axes first; axes without an item are kept whole.
    ///
    /// Axis locations are looked up again on the result, so a quantity whose
    /// axis was indexed away is no longer available from it.
    pub fn slice(&self, items: &[AxisSlice]) -> Result<Self, CubeError> {
        let parts = self.cube.slice(items)?.into_parts();
        SpectrogramCubeBuilder {
            data: parts.data,
            wcs: parts.wcs,
            extra_coords: parts.extra_coords.to_input(),
            unit: parts.unit,
            uncertainty: parts.uncertainty,
            meta: parts.meta,
            mask: parts.mask,
        }.build()
    }
}

impl<W: WorldCoordinates> Spectrogram for SpectrogramCube<W> {
    fn spectral_axis(&self) -> Result<Quantity, CubeError> {
        self.coordinate(PhysicalQuantity::Spectral)
    }

    fn time(&self) -> Result<Quantity, CubeError> {
        self.coordinate(PhysicalQuantity::Time)
    }

    fn exposure_time(&self) -> Result<Quantity, CubeError> {
        self.coordinate(PhysicalQuantity::ExposureTime)
    }

    fn lon(&self) -> Result<Quantity, CubeError> {
        self.coordinate(PhysicalQuantity::Longitude)
    }

    fn lat(&self) -> Result<Quantity, CubeError> {
        self.coordinate(PhysicalQuantity::Latitude)
    }

    fn apply_exposure_time_correction(&self, undo: bool, force: bool) -> Result<Self, CubeError> {
        let (exposure_time_s, _) = self.exposure_time()?
            .to(&Unit::second())?
            .into_parts();
        let exposure_time_s = broadcastable_exposure_time(exposure_time_s, self.dimensions().len())?;

        let corrected = if undo {
            uncalculate_exposure_time_correction(self.data(), self.uncertainty(), self.unit(), &exposure_time_s, force)?
        } else {
            calculate_exposure_time_correction(self.data(), self.uncertainty(), self.unit(), &exposure_time_s, force)?
        };

        if force {
            warn!(
                "Exposure time correction {} with force, unit changed from {} to {}",
                if undo { "undone" } else { "applied" }, self.unit(), corrected.unit
            );
        }

        self.to_builder()
            .with_data(corrected.data)
            .with_uncertainty(corrected.uncertainty)
            .with_unit(corrected.unit)
            .build()
    }
}

fn describe_range(q: Option<Quantity>) -> String {
    match q {
        None => "None".to_string(),
        Some(q) if q.is_scalar() => q.to_string(),
        Some(q) => match (q.min(), q.max()) {
            (Some(lo), Some(hi)) => {
                let (lo, _) = lo.into_parts();
                let (hi, _) = hi.into_parts();
                let values = lo.iter().chain(hi.iter()).copied().collect_vec();
                Quantity::from_vec(values, q.unit().clone()).to_string()
            },
            _ => "None".to_string(),
        },
    }
}

fn describe_period(q: Option<Quantity>) -> String {
    match q {
        None => "None".to_string(),
        Some(q) if q.is_scalar() => q.to_string(),
        Some(q) => match (q.first(), q.last()) {
            (Some(first), Some(last)) => format!("({first}, {last})"),
            _ => "None".to_string(),
        },
    }
}

impl<W: WorldCoordinates> Display for SpectrogramCube<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{CUBE_NAME}")?;
        writeln!(f, "{}", "-".repeat(CUBE_NAME.len()))?;
        writeln!(f, "Time Period: {}", describe_period(self.time().ok()))?;
        writeln!(f, "Pixel dimensions (Slit steps, Slit height, Spectral): {:?}", self.dimensions())?;
        writeln!(f, "Longitude range: {}", describe_range(self.lon().ok()))?;
        writeln!(f, "Latitude range: {}", describe_range(self.lat().ok()))?;
        writeln!(f, "Spectral range: {}", describe_range(self.spectral_axis().ok()))?;
        write!(f, "Data unit: {}", self.unit())
    }
}

/// Collects the fields of a [`SpectrogramCube`]; nothing is checked until [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct SpectrogramCubeBuilder<W> {
    data: ArrayD<f64>,
    wcs: W,
    extra_coords: Vec<ExtraCoordInput>,
    unit: Unit,
    uncertainty: Option<ArrayD<f64>>,
    meta: Header,
    mask: Option<ArrayD<bool>>,
}

impl<W: WorldCoordinates> SpectrogramCubeBuilder<W> {
    pub fn new(data: ArrayD<f64>, wcs: W) -> Self {
        Self {
            data,
            wcs,
            extra_coords: vec![],
            unit: Unit::dimensionless(),
            uncertainty: None,
            meta: Header::new(),
            mask: None,
        }
    }

    pub fn with_data(mut self, data: ArrayD<f64>) -> Self {
        self.data = data;
        self
    }

    pub fn with_wcs(mut self, wcs: W) -> Self {
        self.wcs = wcs;
        self
    }

    /// Replace all extra coordinates.
    pub fn with_extra_coords<I: IntoIterator<Item = ExtraCoordInput>>(mut self, coords: I) -> Self {
        self.extra_coords = coords.into_iter().collect();
        self
    }

    /// Add one extra coordinate. `axis` is the data axis it runs along.
    pub fn with_extra_coord(mut self, name: &str, axis: Option<usize>, value: Quantity) -> Self {
        self.extra_coords.push((name.to_string(), axis, value));
        self
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_uncertainty<U: Into<Option<ArrayD<f64>>>>(mut self, uncertainty: U) -> Self {
        self.uncertainty = uncertainty.into();
        self
    }

    pub fn with_meta(mut self, meta: Header) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_mask<M: Into<Option<ArrayD<bool>>>>(mut self, mask: M) -> Self {
        self.mask = mask.into();
        self
    }

    pub fn build(self) -> Result<SpectrogramCube<W>, CubeError> {
        let cube = NdCube::new(
            self.data,
            self.wcs,
            self.uncertainty,
            self.mask,
            self.meta,
            self.unit,
            ExtraCoords::from_input(self.extra_coords),
        )?;
        Ok(SpectrogramCube::from_ndcube(cube))
    }
}

/// One line per quantity saying where it was found, for logging and the CLI.
pub fn describe_axis_locations<W: WorldCoordinates>(cube: &SpectrogramCube<W>) -> Vec<String> {
    PhysicalQuantity::iter()
        .map(|q| match cube.axis_location(q) {
            AxisLocation::Unresolved => format!("{q}: not found"),
            AxisLocation::Resolved { name, source: CoordSource::Wcs { axis } } => {
                format!("{q}: '{name}' (WCS axis {axis})")
            },
            AxisLocation::Resolved { name, source: CoordSource::SideTable } => {
                format!("{q}: '{name}' (extra coordinate)")
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::SUPPORTED_TIME_NAMES;
    use crate::test_utils::{exposure_times, raster_cube, raster_wcs, sit_and_stare_cube};
    use crate::wcs::LinearAxis;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array, IxDyn};
    use rstest::rstest;

    #[rstest]
    fn test_resolution_on_construction(raster_cube: SpectrogramCube) {
        assert_eq!(raster_cube.axis_location(PhysicalQuantity::Longitude).source(), Some(CoordSource::Wcs { axis: 0 }));
        assert_eq!(raster_cube.axis_location(PhysicalQuantity::Latitude).source(), Some(CoordSource::Wcs { axis: 1 }));
        assert_eq!(raster_cube.axis_location(PhysicalQuantity::Spectral).source(), Some(CoordSource::Wcs { axis: 2 }));
        assert_eq!(raster_cube.axis_location(PhysicalQuantity::Spectral).name(), Some("em.wl"));
        assert_eq!(raster_cube.axis_location(PhysicalQuantity::ExposureTime).source(), Some(CoordSource::SideTable));
        assert_eq!(raster_cube.axis_location(PhysicalQuantity::ExposureTime).name(), Some("exposure time"));
        assert_eq!(raster_cube.axis_location(PhysicalQuantity::Time).source(), Some(CoordSource::SideTable));
    }

    #[rstest]
    fn test_accessors(raster_cube: SpectrogramCube) {
        let wl = raster_cube.spectral_axis().unwrap();
        assert_eq!(wl.len(), 4);
        assert_eq!(wl.unit().to_string(), "nm");
        assert_abs_diff_eq!(wl.value()[[1]], 70.01, epsilon = 1e-9);

        assert_eq!(raster_cube.exposure_time().unwrap(), exposure_times(&[2.0, 4.0]));
        assert_eq!(raster_cube.lon().unwrap().unit(), &Unit::arcsec());
        assert_eq!(raster_cube.lat().unwrap().len(), 3);
        assert_eq!(raster_cube.time().unwrap().len(), 2);
    }

    #[test]
    fn test_unresolved_accessor_lists_names() {
        let wcs = LinearWcs::new(vec![
            LinearAxis::new("STOKES", Unit::dimensionless(), 1.0, 1.0, 1.0, 2),
            LinearAxis::new("WAVE", Unit::meter(), 1e-8, 1e-11, 1.0, 3),
        ]);
        let cube = SpectrogramCube::builder(Array::zeros(IxDyn(&[2, 3])), wcs).build().unwrap();
        let err = cube.time().unwrap_err();
        match &err {
            CubeError::AxisNotFound { quantity, supported } => {
                assert_eq!(quantity, "Time");
                assert_eq!(*supported, SUPPORTED_TIME_NAMES);
            },
            _ => panic!("Expected AxisNotFound, got {err:?}"),
        }
        let msg = err.to_string();
        assert!(msg.starts_with("Time axis not found"), "{msg}");
        assert!(msg.contains(r#"["time", "TIME", "Time"]"#), "{msg}");
        assert!(matches!(cube.exposure_time(), Err(CubeError::AxisNotFound { .. })));
        assert!(matches!(cube.apply_exposure_time_correction(false, false), Err(CubeError::AxisNotFound { .. })));
        assert!(cube.spectral_axis().is_ok());
    }

    #[rstest]
    fn test_round_trip_correction(raster_cube: SpectrogramCube) {
        let corrected = raster_cube.apply_exposure_time_correction(false, false).unwrap();
        assert_eq!(corrected.unit().to_string(), "ct / s");
        assert_abs_diff_eq!(corrected.data()[[1, 2, 3]], raster_cube.data()[[1, 2, 3]] / 4.0, epsilon = 1e-12);

        let restored = corrected.apply_exposure_time_correction(true, false).unwrap();
        assert_eq!(restored.unit(), raster_cube.unit());
        assert_abs_diff_eq!(restored.data(), raster_cube.data(), epsilon = 1e-12);
        assert_abs_diff_eq!(restored.uncertainty().unwrap(), raster_cube.uncertainty().unwrap(), epsilon = 1e-12);
    }

    #[rstest]
    fn test_correction_guard(raster_cube: SpectrogramCube) {
        let corrected = raster_cube.apply_exposure_time_correction(false, false).unwrap();
        let err = corrected.apply_exposure_time_correction(false, false).unwrap_err();
        assert!(matches!(err, CubeError::ApplyExposureTime));
        assert!(err.to_string().contains("already been applied"));

        let twice = corrected.apply_exposure_time_correction(false, true).unwrap();
        assert_eq!(twice.unit(), &(corrected.unit() / &Unit::second()));
        assert_eq!(twice.unit().to_string(), "ct / s2");

        let err = raster_cube.apply_exposure_time_correction(true, false).unwrap_err();
        assert!(matches!(err, CubeError::UndoExposureTime));
        let forced = raster_cube.apply_exposure_time_correction(true, true).unwrap();
        assert_eq!(forced.unit().to_string(), "ct s");
    }

    #[rstest]
    fn test_correction_keeps_other_fields(raster_cube: SpectrogramCube) {
        let corrected = raster_cube.apply_exposure_time_correction(false, false).unwrap();
        assert_eq!(corrected.wcs(), raster_cube.wcs());
        assert_eq!(corrected.mask(), raster_cube.mask());
        assert_eq!(corrected.meta(), raster_cube.meta());
        assert_eq!(corrected.extra_coords(), raster_cube.extra_coords());
        // The source cube is left alone
        assert_eq!(raster_cube.unit(), &Unit::count());
    }

    #[rstest]
    fn test_rows_scaled_by_exposure(sit_and_stare_cube: SpectrogramCube) {
        let corrected = sit_and_stare_cube.apply_exposure_time_correction(false, false).unwrap();
        assert_eq!(corrected.dimensions(), sit_and_stare_cube.dimensions());
        let exposure = [1.0, 2.0, 5.0];
        for ((i, j), &v) in corrected.data().clone().into_dimensionality::<ndarray::Ix2>().unwrap().indexed_iter() {
            assert_abs_diff_eq!(v, sit_and_stare_cube.data()[[i, j]] / exposure[i], epsilon = 1e-12);
        }
        assert!(corrected.uncertainty().is_none());
    }

    #[rstest]
    fn test_slicing_keeps_spectral_axis(sit_and_stare_cube: SpectrogramCube) {
        assert_eq!(sit_and_stare_cube.axis_location(PhysicalQuantity::Spectral).source(), Some(CoordSource::Wcs { axis: 1 }));

        let spectrum = sit_and_stare_cube.slice(&[AxisSlice::Index(1)]).unwrap();
        assert_eq!(spectrum.dimensions(), &[4]);
        assert_eq!(spectrum.spectral_axis().unwrap().len(), 4);
        assert_eq!(spectrum.axis_location(PhysicalQuantity::Spectral).source(), Some(CoordSource::Wcs { axis: 0 }));

        let subset = sit_and_stare_cube.slice(&[AxisSlice::range(0, 2), AxisSlice::range(1, 3)]).unwrap();
        assert_eq!(subset.dimensions(), &[2, 2]);
        let full = sit_and_stare_cube.spectral_axis().unwrap();
        let sub = subset.spectral_axis().unwrap();
        assert_eq!(sub.len(), 2);
        for (i, &v) in sub.value().iter().enumerate() {
            assert_abs_diff_eq!(v, full.value()[[i + 1]], epsilon = 1e-12);
        }
    }

    #[rstest]
    fn test_slicing_drops_spectral_axis(sit_and_stare_cube: SpectrogramCube) {
        let light_curve = sit_and_stare_cube.slice(&[AxisSlice::full(), AxisSlice::Index(2)]).unwrap();
        assert_eq!(light_curve.dimensions(), &[3]);
        assert!(matches!(light_curve.spectral_axis(), Err(CubeError::AxisNotFound { .. })));
        assert_eq!(light_curve.exposure_time().unwrap().len(), 3);
    }

    #[rstest]
    fn test_correction_on_light_curve(sit_and_stare_cube: SpectrogramCube) {
        let light_curve = sit_and_stare_cube.slice(&[AxisSlice::full(), AxisSlice::Index(2)]).unwrap();
        let corrected = light_curve.apply_exposure_time_correction(false, false).unwrap();
        assert_eq!(corrected.dimensions(), &[3]);
        assert_eq!(corrected.unit().to_string(), "ct / s");
        for (i, expected) in [12.0, 11.0, 6.4].into_iter().enumerate() {
            assert_abs_diff_eq!(corrected.data()[[i]], expected, epsilon = 1e-12);
        }

        let restored = corrected.apply_exposure_time_correction(true, false).unwrap();
        assert_abs_diff_eq!(restored.data(), light_curve.data(), epsilon = 1e-12);
    }

    #[rstest]
    fn test_scalar_exposure_after_slicing(raster_cube: SpectrogramCube) {
        let single = raster_cube.slice(&[AxisSlice::Index(1)]).unwrap();
        let exposure = single.exposure_time().unwrap();
        assert!(exposure.is_scalar());
        let corrected = single.apply_exposure_time_correction(false, false).unwrap();
        assert_abs_diff_eq!(corrected.data(), &single.data().mapv(|v| v / 4.0), epsilon = 1e-12);
    }

    #[test]
    fn test_exposure_time_unit_conversion() {
        let wcs = raster_wcs(2, 3, 4);
        let cube = SpectrogramCube::builder(Array::from_elem(IxDyn(&[2, 3, 4]), 10.0), wcs)
            .with_unit(Unit::count())
            .with_extra_coord("exp_time", Some(0), Quantity::from_vec(vec![500.0, 2000.0], "ms".parse().unwrap()))
            .build()
            .unwrap();
        let corrected = cube.apply_exposure_time_correction(false, false).unwrap();
        assert_abs_diff_eq!(corrected.data()[[0, 0, 0]], 20.0, epsilon = 1e-12);
        assert_abs_diff_eq!(corrected.data()[[1, 0, 0]], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_four_dimensions_rejected() {
        let wcs = LinearWcs::new(vec![
            LinearAxis::new("UTC", Unit::second(), 0.0, 1.0, 1.0, 2),
            LinearAxis::new("HPLN-TAN", Unit::arcsec(), 0.0, 1.0, 1.0, 2),
            LinearAxis::new("HPLT-TAN", Unit::arcsec(), 0.0, 1.0, 1.0, 2),
            LinearAxis::new("WAVE", Unit::meter(), 0.0, 1.0, 1.0, 2),
        ]);
        let cube = SpectrogramCube::builder(Array::ones(IxDyn(&[2, 2, 2, 2])), wcs)
            .with_unit(Unit::count())
            .with_extra_coord("exposure time", Some(0), exposure_times(&[1.0, 2.0]))
            .build()
            .unwrap();
        let err = cube.apply_exposure_time_correction(false, false).unwrap_err();
        assert!(matches!(err, CubeError::InvalidDimensionality(4)));
        assert_eq!(err.to_string(), "SpectrogramCube dimensions must be 2 or 3. Dimensions=4");
    }

    #[rstest]
    fn test_summary(raster_cube: SpectrogramCube) {
        let summary = raster_cube.to_string();
        let lines = summary.lines().collect_vec();
        assert_eq!(lines[0], "SpectrogramCube");
        assert_eq!(lines[1], "---------------");
        assert_eq!(lines[2], "Time Period: (0 s, 10 s)");
        assert_eq!(lines[3], "Pixel dimensions (Slit steps, Slit height, Spectral): [2, 3, 4]");
        assert!(lines[4].starts_with("Longitude range: ["), "{}", lines[4]);
        assert!(lines[6].starts_with("Spectral range: [70, 70.0"), "{}", lines[6]);
        assert!(lines[6].ends_with("] nm"), "{}", lines[6]);
        assert_eq!(lines[7], "Data unit: ct");
    }

    #[test]
    fn test_summary_without_axes() {
        let wcs = LinearWcs::new(vec![LinearAxis::new("STOKES", Unit::dimensionless(), 1.0, 1.0, 1.0, 2)]);
        let cube = SpectrogramCube::new(Array::zeros(IxDyn(&[2])), wcs, None, None, None, None, None).unwrap();
        let summary = cube.to_string();
        assert!(summary.contains("Time Period: None"));
        assert!(summary.contains("Spectral range: None"));
        assert!(summary.ends_with("Data unit: dimensionless"));
    }

    #[rstest]
    fn test_describe_axis_locations(raster_cube: SpectrogramCube) {
        let lines = describe_axis_locations(&raster_cube);
        assert_eq!(lines[0], "Spectral: 'em.wl' (WCS axis 2)");
        assert_eq!(lines[2], "Exposure time: 'exposure time' (extra coordinate)");
    }
}
