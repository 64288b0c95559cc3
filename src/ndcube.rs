//! A labelled N-dimensional data array with world coordinates.
//!
//! [`NdCube`] owns the data, its uncertainty and mask, metadata, the unit, a WCS
//! and the side table of extra coordinates, keeps their shapes consistent, and
//! knows how to slice all of them together.
use indexmap::IndexMap;
use ndarray::{ArrayD, Axis};

use crate::{
    error::CubeError,
    header::Header,
    slicing::{new_axis_index, resolve_slices, slice_array, AxisSlice, ResolvedSlice},
    units::{Quantity, Unit},
    wcs::{WcsError, WorldCoordinates},
};

/// The constructor input format for an extra coordinate: name, data axis
/// (`None` for a coordinate whose axis was sliced away) and values.
pub type ExtraCoordInput = (String, Option<usize>, Quantity);

/// One coordinate in the side table.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraCoord {
    pub value: Quantity,
    pub axis: Option<usize>,
}

/// Coordinates not described by the WCS, keyed by name in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraCoords {
    coords: IndexMap<String, ExtraCoord>,
}

impl ExtraCoords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, axis, value)` triples. A repeated name replaces the earlier entry.
    pub fn from_input<I: IntoIterator<Item = ExtraCoordInput>>(input: I) -> Self {
        let coords = input.into_iter()
            .map(|(name, axis, value)| (name, ExtraCoord { value, axis }))
            .collect();
        Self { coords }
    }

    /// Convert back to the `(name, axis, value)` triples accepted by [`ExtraCoords::from_input`].
    pub fn to_input(&self) -> Vec<ExtraCoordInput> {
        self.coords.iter()
            .map(|(name, c)| (name.clone(), c.axis, c.value.clone()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&ExtraCoord> {
        self.coords.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.coords.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtraCoord)> {
        self.coords.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    fn validate(&self, shape: &[usize]) -> Result<(), CubeError> {
        for (name, coord) in self.coords.iter() {
            let Some(axis) = coord.axis else { continue };
            if axis >= shape.len() {
                return Err(CubeError::ShapeMismatch {
                    what: format!("extra coordinate '{name}'"),
                    expected: format!("an axis below {}", shape.len()),
                    actual: format!("axis {axis}"),
                });
            }
            let value_shape = coord.value.value().shape();
            if value_shape != [shape[axis]].as_slice() {
                return Err(CubeError::ShapeMismatch {
                    what: format!("extra coordinate '{name}'"),
                    expected: format!("[{}]", shape[axis]),
                    actual: format!("{value_shape:?}"),
                });
            }
        }
        Ok(())
    }

    fn slice(&self, slices: &[ResolvedSlice]) -> Self {
        let coords = self.coords.iter()
            .map(|(name, coord)| {
                let new_coord = match coord.axis {
                    None => coord.clone(),
                    Some(axis) => {
                        let (value, unit) = coord.value.clone().into_parts();
                        let value = match slices.get(axis) {
                            Some(&ResolvedSlice::Drop(i)) => value.index_axis(Axis(0), i).to_owned(),
                            Some(&keep) => slice_array(&value, &[keep]),
                            None => value,
                        };
                        ExtraCoord { value: Quantity::new(value, unit), axis: new_axis_index(axis, slices) }
                    },
                };
                (name.clone(), new_coord)
            })
            .collect();
        Self { coords }
    }
}

/// The labelled array underneath a spectrogram cube.
#[derive(Debug, Clone)]
pub struct NdCube<W> {
    data: ArrayD<f64>,
    wcs: W,
    uncertainty: Option<ArrayD<f64>>,
    mask: Option<ArrayD<bool>>,
    meta: Header,
    unit: Unit,
    extra_coords: ExtraCoords,
}

impl<W: WorldCoordinates> NdCube<W> {
    /// Create a cube, checking that the WCS, uncertainty, mask and extra
    /// coordinates all agree with the shape of `data`.
    pub fn new(
        data: ArrayD<f64>,
        wcs: W,
        uncertainty: Option<ArrayD<f64>>,
        mask: Option<ArrayD<bool>>,
        meta: Header,
        unit: Unit,
        extra_coords: ExtraCoords,
    ) -> Result<Self, CubeError> {
        let wcs_shape = wcs.pixel_shape();
        if data.shape() != wcs_shape.as_slice() {
            return Err(CubeError::shape_mismatch("WCS", data.shape(), &wcs_shape));
        }
        if let Some(unc) = &uncertainty {
            if unc.shape() != data.shape() {
                return Err(CubeError::shape_mismatch("uncertainty", data.shape(), unc.shape()));
            }
        }
        if let Some(m) = &mask {
            if m.shape() != data.shape() {
                return Err(CubeError::shape_mismatch("mask", data.shape(), m.shape()));
            }
        }
        extra_coords.validate(data.shape())?;

        Ok(Self { data, wcs, uncertainty, mask, meta, unit, extra_coords })
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn wcs(&self) -> &W {
        &self.wcs
    }

    pub fn uncertainty(&self) -> Option<&ArrayD<f64>> {
        self.uncertainty.as_ref()
    }

    pub fn mask(&self) -> Option<&ArrayD<bool>> {
        self.mask.as_ref()
    }

    pub fn meta(&self) -> &Header {
        &self.meta
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn extra_coords(&self) -> &ExtraCoords {
        &self.extra_coords
    }

    /// The length of each data axis.
    pub fn dimensions(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn world_axis_physical_types(&self) -> Vec<Option<String>> {
        self.wcs.world_axis_physical_types()
    }

    pub fn axis_world_coords(&self, physical_type: &str) -> Result<Quantity, WcsError> {
        self.wcs.axis_world_coords(physical_type)
    }

    /// Slice every component the same way. `items` has at most one entry per
    /// data axis; missing trailing entries keep the whole axis.
    pub fn slice(&self, items: &[AxisSlice]) -> Result<Self, CubeError> {
        let slices = resolve_slices(items, self.data.shape())?;
        Ok(Self {
            data: slice_array(&self.data, &slices),
            wcs: self.wcs.slice(items)?,
            uncertainty: self.uncertainty.as_ref().map(|u| slice_array(u, &slices)),
            mask: self.mask.as_ref().map(|m| slice_array(m, &slices)),
            meta: self.meta.clone(),
            unit: self.unit.clone(),
            extra_coords: self.extra_coords.slice(&slices),
        })
    }

    pub fn into_parts(self) -> NdCubeParts<W> {
        NdCubeParts {
            data: self.data,
            wcs: self.wcs,
            uncertainty: self.uncertainty,
            mask: self.mask,
            meta: self.meta,
            unit: self.unit,
            extra_coords: self.extra_coords,
        }
    }
}

/// All fields of an [`NdCube`], for rebuilding a derived cube.
#[derive(Debug, Clone)]
pub struct NdCubeParts<W> {
    pub data: ArrayD<f64>,
    pub wcs: W,
    pub uncertainty: Option<ArrayD<f64>>,
    pub mask: Option<ArrayD<bool>>,
    pub meta: Header,
    pub unit: Unit,
    pub extra_coords: ExtraCoords,
}
