//! Working out which axis holds which physical quantity.
//!
//! Each quantity a spectrogram cube knows about has a fixed list of names it may
//! appear under, either as a WCS physical type or as the key of an extra
//! coordinate. Each list holds the base names, then their upper case forms, then
//! their capitalized forms.
use crate::ndcube::ExtraCoords;

pub const SUPPORTED_LONGITUDE_NAMES: &[&str] = &[
    "custom:pos.helioprojective.lon", "pos.helioprojective.lon", "longitude", "lon",
    "CUSTOM:POS.HELIOPROJECTIVE.LON", "POS.HELIOPROJECTIVE.LON", "LONGITUDE", "LON",
    "Custom:pos.helioprojective.lon", "Pos.helioprojective.lon", "Longitude", "Lon",
];

pub const SUPPORTED_LATITUDE_NAMES: &[&str] = &[
    "custom:pos.helioprojective.lat", "pos.helioprojective.lat", "latitude", "lat",
    "CUSTOM:POS.HELIOPROJECTIVE.LAT", "POS.HELIOPROJECTIVE.LAT", "LATITUDE", "LAT",
    "Custom:pos.helioprojective.lat", "Pos.helioprojective.lat", "Latitude", "Lat",
];

pub const SUPPORTED_SPECTRAL_NAMES: &[&str] = &[
    "em.wl", "em.energy", "em.freq", "wavelength", "energy", "frequency", "freq", "lambda", "spectral",
    "EM.WL", "EM.ENERGY", "EM.FREQ", "WAVELENGTH", "ENERGY", "FREQUENCY", "FREQ", "LAMBDA", "SPECTRAL",
    "Em.wl", "Em.energy", "Em.freq", "Wavelength", "Energy", "Frequency", "Freq", "Lambda", "Spectral",
];

pub const SUPPORTED_TIME_NAMES: &[&str] = &[
    "time",
    "TIME",
    "Time",
];

pub const SUPPORTED_EXPOSURE_NAMES: &[&str] = &[
    "exposure time", "exposure_time", "exposure times", "exposure_times", "exp time", "exp_time", "exp times", "exp_times",
    "EXPOSURE TIME", "EXPOSURE_TIME", "EXPOSURE TIMES", "EXPOSURE_TIMES", "EXP TIME", "EXP_TIME", "EXP TIMES", "EXP_TIMES",
    "Exposure time", "Exposure_time", "Exposure times", "Exposure_times", "Exp time", "Exp_time", "Exp times", "Exp_times",
];

/// The physical quantities a spectrogram cube resolves on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum PhysicalQuantity {
    Spectral,
    Time,
    #[strum(serialize = "Exposure time")]
    ExposureTime,
    Longitude,
    Latitude,
}

impl PhysicalQuantity {
    pub fn supported_names(&self) -> &'static [&'static str] {
        match self {
            Self::Spectral => SUPPORTED_SPECTRAL_NAMES,
            Self::Time => SUPPORTED_TIME_NAMES,
            Self::ExposureTime => SUPPORTED_EXPOSURE_NAMES,
            Self::Longitude => SUPPORTED_LONGITUDE_NAMES,
            Self::Latitude => SUPPORTED_LATITUDE_NAMES,
        }
    }
}

/// Where the values of a resolved quantity are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordSource {
    /// In the WCS; `axis` is the index of the matching physical type.
    Wcs { axis: usize },
    /// In the extra coordinates side table.
    SideTable,
}

/// The result of looking for one quantity in a cube.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AxisLocation {
    #[default]
    Unresolved,
    Resolved { name: String, source: CoordSource },
}

impl AxisLocation {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Unresolved => None,
            Self::Resolved { name, .. } => Some(name.as_str()),
        }
    }

    pub fn source(&self) -> Option<CoordSource> {
        match self {
            Self::Unresolved => None,
            Self::Resolved { source, .. } => Some(*source),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// Find the name a quantity is stored under.
///
/// The WCS physical types are searched first and the lowest matching axis wins.
/// Only if none match are the extra coordinate names searched, in their
/// insertion order.
pub fn resolve(
    supported_names: &[&str],
    wcs_physical_types: &[Option<String>],
    side_table: Option<&ExtraCoords>,
) -> AxisLocation {
    let wcs_match = wcs_physical_types.iter()
        .enumerate()
        .find_map(|(axis, ptype)| {
            ptype.as_deref()
                .filter(|t| supported_names.contains(t))
                .map(|t| (axis, t))
        });

    if let Some((axis, name)) = wcs_match {
        return AxisLocation::Resolved { name: name.to_string(), source: CoordSource::Wcs { axis } };
    }

    side_table
        .and_then(|table| table.keys().find(|k| supported_names.contains(k)))
        .map(|name| AxisLocation::Resolved { name: name.to_string(), source: CoordSource::SideTable })
        .unwrap_or(AxisLocation::Unresolved)
}
