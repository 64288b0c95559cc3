//! Describing a spectrogram cube in a TOML file.
//!
//! This is mainly useful for small test cubes and for checking how a given set
//! of WCS axes and extra coordinates will be interpreted. An example:
//!
//! ```toml
//! unit = "ct"
//!
//! [[axes]]
//! ctype = "HPLN-TAN"
//! cunit = "arcsec"
//! crval = -100.0
//! cdelt = 4.0
//! crpix = 1.0
//! naxis = 2
//!
//! [[axes]]
//! ctype = "WAVE"
//! cunit = "nm"
//! crval = 70.0
//! cdelt = 0.01
//! crpix = 1.0
//! naxis = 3
//!
//! [[extra_coords]]
//! name = "exposure time"
//! axis = 0
//! unit = "s"
//! values = [2.0, 4.0]
//!
//! [meta]
//! INSTRUME = "SPICE"
//! ```
//!
//! Axes are listed in data order (slowest varying first). `data` and
//! `uncertainty` may be given as flat, row-major arrays; `data` defaults to all
//! ones. An extra coordinate without an `axis` must have exactly one value.
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use ndarray::{ArrayD, IxDyn};
use serde::Deserialize;

use crate::{
    error::CubeError,
    header::{Header, HeaderValue},
    spectrogram::SpectrogramCube,
    units::{Quantity, Unit},
    wcs::{LinearAxis, LinearWcs},
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Error reading cube description {}: {reason}", .path.display())]
    Io { path: PathBuf, reason: String },
    #[error("Error parsing cube description: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{what} has {actual} values, expected {expected}")]
    WrongLength { what: String, expected: usize, actual: usize },
    #[error("Metadata value for {0} must be a string, integer, float or boolean")]
    UnsupportedMeta(String),
    #[error(transparent)]
    Cube(#[from] CubeError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtraCoordConfig {
    pub name: String,
    #[serde(default)]
    pub axis: Option<usize>,
    #[serde(default)]
    pub unit: Unit,
    pub values: Vec<f64>,
}

impl ExtraCoordConfig {
    fn into_input(self) -> Result<(String, Option<usize>, Quantity), ConfigError> {
        let value = match (self.axis, self.values.as_slice()) {
            (None, [v]) => Quantity::scalar(*v, self.unit),
            (None, values) => {
                return Err(ConfigError::WrongLength {
                    what: format!("Extra coordinate '{}' (no axis)", self.name),
                    expected: 1,
                    actual: values.len(),
                })
            },
            (Some(_), _) => Quantity::from_vec(self.values, self.unit),
        };
        Ok((self.name, self.axis, value))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CubeConfig {
    pub axes: Vec<LinearAxis>,
    #[serde(default)]
    pub unit: Unit,
    #[serde(default)]
    pub data: Option<Vec<f64>>,
    #[serde(default)]
    pub uncertainty: Option<Vec<f64>>,
    #[serde(default)]
    pub extra_coords: Vec<ExtraCoordConfig>,
    #[serde(default)]
    pub meta: IndexMap<String, toml::Value>,
}

impl CubeConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file(p: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(p)
            .map_err(|e| ConfigError::Io { path: p.to_path_buf(), reason: e.to_string() })?;
        Self::from_toml_str(&s)
    }

    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.naxis).collect()
    }

    pub fn into_cube(self) -> Result<SpectrogramCube, ConfigError> {
        let shape = self.shape();
        let data = match self.data {
            Some(values) => to_array("data", values, &shape)?,
            None => ArrayD::ones(IxDyn(&shape)),
        };
        let uncertainty = self.uncertainty
            .map(|values| to_array("uncertainty", values, &shape))
            .transpose()?;

        let mut meta = Header::new();
        for (key, value) in self.meta {
            let value = match value {
                toml::Value::String(s) => HeaderValue::Str(s),
                toml::Value::Integer(i) => HeaderValue::Int(i),
                toml::Value::Float(v) => HeaderValue::Float(v),
                toml::Value::Boolean(b) => HeaderValue::Bool(b),
                _ => return Err(ConfigError::UnsupportedMeta(key)),
            };
            meta.insert(&key, value, "");
        }

        let extra_coords = self.extra_coords
            .into_iter()
            .map(|c| c.into_input())
            .collect::<Result<Vec<_>, _>>()?;

        let cube = SpectrogramCube::builder(data, LinearWcs::new(self.axes))
            .with_unit(self.unit)
            .with_uncertainty(uncertainty)
            .with_meta(meta)
            .with_extra_coords(extra_coords)
            .build()?;
        Ok(cube)
    }
}

fn to_array(what: &str, values: Vec<f64>, shape: &[usize]) -> Result<ArrayD<f64>, ConfigError> {
    let expected: usize = shape.iter().product();
    let actual = values.len();
    ArrayD::from_shape_vec(IxDyn(shape), values)
        .map_err(|_| ConfigError::WrongLength { what: what.to_string(), expected, actual })
}
