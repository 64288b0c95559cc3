//! Per-axis slice descriptions shared by the array, WCS and side table slicing.
use ndarray::{ArrayBase, ArrayD, Axis, Data, IxDyn, Slice};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SliceError {
    #[error("Got {n_items} slice items for a {ndim}-dimensional array")]
    TooManyItems { n_items: usize, ndim: usize },
    #[error("Index {index} is out of bounds for axis {axis} with length {len}")]
    OutOfBounds { axis: usize, index: isize, len: usize },
    #[error("Slice step must be positive, got {step} for axis {axis}")]
    InvalidStep { axis: usize, step: isize },
}

/// How to slice one data axis.
///
/// Negative indices and bounds count from the end of the axis, as in Python.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSlice {
    /// Select a single element, removing the axis.
    Index(isize),
    /// Keep the axis, selecting `start..stop` every `step` elements.
    Range { start: Option<isize>, stop: Option<isize>, step: isize },
}

impl AxisSlice {
    /// The whole axis.
    pub fn full() -> Self {
        Self::Range { start: None, stop: None, step: 1 }
    }

    pub fn range(start: isize, stop: isize) -> Self {
        Self::Range { start: Some(start), stop: Some(stop), step: 1 }
    }

    fn resolve(&self, axis: usize, len: usize) -> Result<ResolvedSlice, SliceError> {
        let ilen = len as isize;
        match *self {
            Self::Index(index) => {
                let i = if index < 0 { index + ilen } else { index };
                if i < 0 || i >= ilen {
                    return Err(SliceError::OutOfBounds { axis, index, len });
                }
                Ok(ResolvedSlice::Drop(i as usize))
            },
            Self::Range { start, stop, step } => {
                if step <= 0 {
                    return Err(SliceError::InvalidStep { axis, step });
                }
                let clamp = |b: isize| -> isize {
                    let b = if b < 0 { b + ilen } else { b };
                    b.clamp(0, ilen)
                };
                let start = start.map(clamp).unwrap_or(0);
                let stop = stop.map(clamp).unwrap_or(ilen);
                let n = if stop > start { (stop - start - 1) / step + 1 } else { 0 };
                Ok(ResolvedSlice::Keep { start: start as usize, step: step as usize, len: n as usize })
            },
        }
    }
}

impl From<usize> for AxisSlice {
    fn from(value: usize) -> Self {
        Self::Index(value as isize)
    }
}

impl From<std::ops::Range<usize>> for AxisSlice {
    fn from(value: std::ops::Range<usize>) -> Self {
        Self::range(value.start as isize, value.end as isize)
    }
}

impl From<std::ops::RangeFull> for AxisSlice {
    fn from(_: std::ops::RangeFull) -> Self {
        Self::full()
    }
}

/// An [`AxisSlice`] checked against the length of its axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedSlice {
    Drop(usize),
    Keep { start: usize, step: usize, len: usize },
}

impl ResolvedSlice {
    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Drop(_))
    }
}

/// Check `items` against `shape`, padding missing trailing axes with full slices.
pub fn resolve_slices(items: &[AxisSlice], shape: &[usize]) -> Result<Vec<ResolvedSlice>, SliceError> {
    if items.len() > shape.len() {
        return Err(SliceError::TooManyItems { n_items: items.len(), ndim: shape.len() });
    }

    shape.iter()
        .enumerate()
        .map(|(axis, &len)| {
            items.get(axis).copied().unwrap_or_else(AxisSlice::full).resolve(axis, len)
        })
        .collect()
}

/// Apply resolved slices to an array, returning an owned copy.
pub fn slice_array<A, S>(array: &ArrayBase<S, IxDyn>, slices: &[ResolvedSlice]) -> ArrayD<A>
where
    A: Clone,
    S: Data<Elem = A>,
{
    let mut view = array.view();
    // Go backwards so removing an axis does not shift the ones still to do.
    for (axis, slice) in slices.iter().enumerate().rev() {
        match *slice {
            ResolvedSlice::Drop(i) => {
                view = view.index_axis_move(Axis(axis), i);
            },
            ResolvedSlice::Keep { start, step, len } => {
                let end = if len == 0 { start } else { start + (len - 1) * step + 1 };
                view.slice_axis_inplace(Axis(axis), Slice::new(start as isize, Some(end as isize), step as isize));
            },
        }
    }
    view.to_owned()
}

/// The position an axis ends up at after the dropped axes before it are removed.
pub fn new_axis_index(axis: usize, slices: &[ResolvedSlice]) -> Option<usize> {
    match slices.get(axis) {
        Some(s) if s.is_dropped() => None,
        Some(_) => Some(axis - slices[..axis].iter().filter(|s| s.is_dropped()).count()),
        None => Some(axis),
    }
}
