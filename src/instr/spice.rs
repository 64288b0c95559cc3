//! Named accessors for the FITS keywords written by the Solar Orbiter/SPICE pipeline.
use std::fmt::Display;

use chrono::NaiveDateTime;

use crate::{
    header::{Header, HeaderError},
    units::{Quantity, Unit},
};

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetaError {
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error("Could not parse {key} = '{value}' as a date")]
    InvalidDate { key: &'static str, value: String },
    #[error("EXTNAME '{0}' does not look like a SPICE window name")]
    BadWindowName(String),
    #[error("Unknown DUMBBELL value {0}, expected 0, 1 or 2")]
    UnknownDumbbell(i64),
}

/// Which dumbbell (context window at the slit ends) a window contains, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Dumbbell {
    None,
    Lower,
    Upper,
}

impl TryFrom<i64> for Dumbbell {
    type Error = MetaError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Lower),
            2 => Ok(Self::Upper),
            _ => Err(MetaError::UnknownDumbbell(value)),
        }
    }
}

/// Heliographic Stonyhurst position of the spacecraft.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverCoordinate {
    pub lon: Quantity,
    pub lat: Quantity,
    pub radius: Quantity,
    pub obstime: NaiveDateTime,
}

impl Display for ObserverCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f, "HGS (lon={}, lat={}, radius={}) at {}",
            self.lon, self.lat, self.radius, self.obstime.format(DATE_FORMAT)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpiceMeta {
    header: Header,
}

impl From<Header> for SpiceMeta {
    fn from(value: Header) -> Self {
        Self::new(value)
    }
}

impl SpiceMeta {
    pub fn new(header: Header) -> Self {
        Self { header }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn into_header(self) -> Header {
        self.header
    }

    fn quantity(&self, key: &str, unit: Unit) -> Result<Quantity, MetaError> {
        Ok(Quantity::scalar(self.header.get_f64(key)?, unit))
    }

    fn date(&self, key: &'static str) -> Result<NaiveDateTime, MetaError> {
        let value = self.header.get_str(key)?;
        NaiveDateTime::parse_from_str(value, DATE_FORMAT)
            .map_err(|_| MetaError::InvalidDate { key, value: value.to_string() })
    }

    /// The spectral window name, i.e. EXTNAME without its "WINDOWn_" prefix.
    pub fn spectral_window(&self) -> Result<&str, MetaError> {
        let extname = self.header.get_str("EXTNAME")?;
        extname.get(8..)
            .filter(|w| !w.is_empty())
            .ok_or_else(|| MetaError::BadWindowName(extname.to_string()))
    }

    pub fn detector(&self) -> Result<&str, MetaError> {
        Ok(self.header.get_str("DETECTOR")?)
    }

    pub fn instrument(&self) -> Result<&str, MetaError> {
        Ok(self.header.get_str("INSTRUME")?)
    }

    pub fn observatory(&self) -> Result<&str, MetaError> {
        Ok(self.header.get_str("OBSRVTRY")?)
    }

    pub fn processing_level(&self) -> Result<&str, MetaError> {
        Ok(self.header.get_str("LEVEL")?)
    }

    pub fn rsun_meters(&self) -> Result<Quantity, MetaError> {
        self.quantity("RSUN_REF", Unit::meter())
    }

    pub fn rsun_angular(&self) -> Result<Quantity, MetaError> {
        self.quantity("RSUN_ARC", Unit::arcsec())
    }

    /// SPICE observation ID (SPIOBSID).
    pub fn observing_mode_id(&self) -> Result<i64, MetaError> {
        Ok(self.header.get_i64("SPIOBSID")?)
    }

    /// Solar Orbiter observation ID (OBS_ID), shared across instruments.
    pub fn observing_mode_id_solar_orbiter(&self) -> Result<i64, MetaError> {
        Ok(self.header.get_i64("OBS_ID")?)
    }

    pub fn observatory_radial_velocity(&self) -> Result<Quantity, MetaError> {
        self.quantity("OBS_VR", &Unit::meter() / &Unit::second())
    }

    pub fn distance_to_sun(&self) -> Result<Quantity, MetaError> {
        self.quantity("DSUN_OBS", Unit::meter())
    }

    pub fn date_reference(&self) -> Result<&str, MetaError> {
        Ok(self.header.get_str("DATE-OBS")?)
    }

    pub fn date_start(&self) -> Result<&str, MetaError> {
        Ok(self.header.get_str("DATE-BEG")?)
    }

    pub fn date_end(&self) -> Result<&str, MetaError> {
        Ok(self.header.get_str("DATE-END")?)
    }

    pub fn observer_coordinate(&self) -> Result<ObserverCoordinate, MetaError> {
        Ok(ObserverCoordinate {
            lon: self.quantity("HGLN_OBS", Unit::degree())?,
            lat: self.quantity("HGLT_OBS", Unit::degree())?,
            radius: self.distance_to_sun()?,
            obstime: self.date("DATE-OBS")?,
        })
    }

    pub fn darkmap_subtracted_onboard(&self) -> Result<bool, MetaError> {
        Ok(self.header.get_bool("DARKMAP")?)
    }

    pub fn bias_frame_subtracted_onboard(&self) -> Result<bool, MetaError> {
        Ok(self.header.get_bool("BLACKLEV")?)
    }

    pub fn window_type(&self) -> Result<&str, MetaError> {
        Ok(self.header.get_str("WIN_TYPE")?)
    }

    pub fn window_table_id(&self) -> Result<i64, MetaError> {
        Ok(self.header.get_i64("WINTABID")?)
    }

    pub fn slit_id(&self) -> Result<i64, MetaError> {
        Ok(self.header.get_i64("SLIT_ID")?)
    }

    pub fn slit_width(&self) -> Result<Quantity, MetaError> {
        self.quantity("SLIT_WID", Unit::arcsec())
    }

    pub fn contains_dumbbell(&self) -> Result<bool, MetaError> {
        Ok(self.dumbbell()? != Dumbbell::None)
    }

    pub fn dumbbell(&self) -> Result<Dumbbell, MetaError> {
        Dumbbell::try_from(self.header.get_i64("DUMBBELL")?)
    }

    pub fn solar_b0(&self) -> Result<Quantity, MetaError> {
        self.quantity("SOLAR_B0", Unit::degree())
    }

    pub fn solar_p0(&self) -> Result<Quantity, MetaError> {
        self.quantity("SOLAR_P0", Unit::degree())
    }

    pub fn solar_ep(&self) -> Result<Quantity, MetaError> {
        self.quantity("SOLAR_EP", Unit::degree())
    }

    pub fn carrington_rotation(&self) -> Result<i64, MetaError> {
        Ok(self.header.get_i64("CAR_ROT")?)
    }

    /// Start time of the observation as it would be seen from Earth.
    pub fn date_start_earth(&self) -> Result<NaiveDateTime, MetaError> {
        self.date("DATE_EAR")
    }

    /// Start time of the observation at the Sun.
    pub fn date_start_sun(&self) -> Result<NaiveDateTime, MetaError> {
        self.date("DATE_SUN")
    }

    /// Every accessor, formatted for display, paired with a label.
    pub fn summary_lines(&self) -> Vec<(&'static str, Result<String, MetaError>)> {
        fn fmt<T: Display>(r: Result<T, MetaError>) -> Result<String, MetaError> {
            r.map(|v| v.to_string())
        }

        vec![
            ("Spectral window", fmt(self.spectral_window())),
            ("Detector", fmt(self.detector())),
            ("Instrument", fmt(self.instrument())),
            ("Observatory", fmt(self.observatory())),
            ("Processing level", fmt(self.processing_level())),
            ("Observing mode ID", fmt(self.observing_mode_id())),
            ("Solar Orbiter observation ID", fmt(self.observing_mode_id_solar_orbiter())),
            ("Reference date", fmt(self.date_reference())),
            ("Start date", fmt(self.date_start())),
            ("End date", fmt(self.date_end())),
            ("Observer", fmt(self.observer_coordinate())),
            ("Radial velocity", fmt(self.observatory_radial_velocity())),
            ("Solar radius", fmt(self.rsun_angular())),
            ("Window type", fmt(self.window_type())),
            ("Window table ID", fmt(self.window_table_id())),
            ("Slit ID", fmt(self.slit_id())),
            ("Slit width", fmt(self.slit_width())),
            ("Dumbbell", fmt(self.dumbbell())),
            ("Dark map subtracted onboard", fmt(self.darkmap_subtracted_onboard())),
            ("Bias frame subtracted onboard", fmt(self.bias_frame_subtracted_onboard())),
            ("Carrington rotation", fmt(self.carrington_rotation())),
        ]
    }
}
