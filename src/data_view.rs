//! Two dimensional views over n-dimensional data.
//!
//! A [`DataView2D`] displays a resource as a table.
//! Its default [`DataSlice`] must have exactly two range levels, the unbound dimensions, which become the rows and columns.
//! Every other level must select a single index.
//!
//! A view is never mutated by user interaction.
//! [`DataView2D::click`] returns the next selection, and [`DataView2D::with_selected_slices`] derives the next view from it.

use std::sync::Arc;

use thiserror::Error;

use crate::{
    data_slice::{DataSlice, DataSliceError, DataSliceKeysIterator},
    dimension::{Dimension, DimensionIndex},
    errors::{IncompatibleSliceError, InvariantError, UnsupportedError},
    index::{Index, UNBOUNDED},
    n_dim_data::NDimData,
    portion_of_data::{PortionOfData, PortionOfDataError},
    slice::{IndexSlice, RangeSlice, Slice},
};

/// A data view error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataViewError {
    /// The default data slice does not have exactly two unbound dimensions.
    #[error("a 2D data view needs exactly 2 unbound dimensions, found {0}")]
    UnboundDimensions(usize),
    /// A clicked indice has no index for an unbound dimension.
    #[error("clicked indice has no index at position {0}")]
    MissingIndex(usize),
    /// An index cannot address a range level.
    #[error("index {0} cannot address a range dimension")]
    InvalidIndex(Index),
    /// The unbound dimension does not exist.
    #[error("invalid unbound dimension {0}, expected 0 or 1")]
    InvalidAxis(usize),
    /// The number of selected slices does not match the view.
    #[error("expected {expected} selected slices, got {got}")]
    SelectedSlices {
        /// The number of slices given.
        got: usize,
        /// The number of levels of the view.
        expected: usize,
    },
    /// A data slice error.
    #[error(transparent)]
    DataSlice(#[from] DataSliceError),
    /// A portion of data error.
    #[error(transparent)]
    PortionOfData(#[from] PortionOfDataError),
    /// An incompatible slice.
    #[error(transparent)]
    IncompatibleSlice(#[from] IncompatibleSliceError),
    /// An unsupported operation.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedError),
    /// An internal invariant was broken.
    #[error(transparent)]
    Invariant(#[from] InvariantError),
}

/// An interactively paged level of a [`DataView2D`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnboundDim {
    dslice_id: String,
    slice_idx: usize,
    dim_id: String,
}

impl UnboundDim {
    /// The id of the data slice of this level.
    #[must_use]
    pub fn dslice_id(&self) -> &str {
        &self.dslice_id
    }

    /// The position of this level in the selected slices.
    #[must_use]
    pub fn slice_idx(&self) -> usize {
        self.slice_idx
    }

    /// The id of the dimension of this level.
    #[must_use]
    pub fn dim_id(&self) -> &str {
        &self.dim_id
    }
}

/// A table view of n-dimensional data with a cell selection.
#[derive(Debug, Clone)]
pub struct DataView2D {
    dimension: Arc<Dimension>,
    dslice: DataSlice,
    unbound_dims: [UnboundDim; 2],
    selected_slices: Vec<Slice>,
}

impl DataView2D {
    /// Create the default view of `data`, see [`DataSlice::from_dimension`].
    ///
    /// # Errors
    /// Returns a [`DataViewError`] if the default data slice does not have exactly two unbound dimensions, or selects more than one index at another level.
    pub fn from_data(data: &NDimData) -> Result<Self, DataViewError> {
        let dslice = DataSlice::from_dimension(data.dimension())?;
        Self::from_data_slice(data.dimension().clone(), dslice)
    }

    /// Create a view displaying `dslice` of `dimension`, with nothing selected.
    ///
    /// # Errors
    /// Returns a [`DataViewError`] if `dslice` does not have exactly two range levels, or selects more than one index at another level.
    pub fn from_data_slice(
        dimension: Arc<Dimension>,
        dslice: DataSlice,
    ) -> Result<Self, DataViewError> {
        let mut slices = Vec::new();
        let mut unbound_dims = Vec::new();
        for (data_slice, sub_dimension) in dslice.iter_dim(&dimension) {
            if let DataSlice::Range(_) = data_slice {
                unbound_dims.push(UnboundDim {
                    dslice_id: data_slice.id().to_string(),
                    slice_idx: slices.len(),
                    dim_id: sub_dimension.id().to_string(),
                });
                slices.push(if sub_dimension.is_range() {
                    Slice::Range(RangeSlice::unset())
                } else {
                    Slice::Index(IndexSlice::unset())
                });
            } else {
                slices.push(Slice::Index(IndexSlice::new(data_slice.to_index()?)));
            }
        }
        let unbound_dims = <[UnboundDim; 2]>::try_from(unbound_dims)
            .map_err(|unbound_dims| DataViewError::UnboundDimensions(unbound_dims.len()))?;
        Ok(Self {
            dimension,
            dslice,
            unbound_dims,
            selected_slices: slices,
        })
    }

    /// The dimension.
    #[must_use]
    pub fn dimension(&self) -> &Arc<Dimension> {
        &self.dimension
    }

    /// The displayed data slice.
    #[must_use]
    pub fn dslice(&self) -> &DataSlice {
        &self.dslice
    }

    /// The rows and columns levels.
    #[must_use]
    pub fn unbound_dims(&self) -> &[UnboundDim; 2] {
        &self.unbound_dims
    }

    /// The selection, one slice per level.
    #[must_use]
    pub fn selected_slices(&self) -> &[Slice] {
        &self.selected_slices
    }

    /// Returns a copy of this view with `selected_slices`, such as those returned by [`click`](Self::click).
    ///
    /// # Errors
    /// Returns [`DataViewError::SelectedSlices`] if `selected_slices` does not have one slice per level.
    pub fn with_selected_slices(&self, selected_slices: Vec<Slice>) -> Result<Self, DataViewError> {
        if selected_slices.len() != self.selected_slices.len() {
            return Err(DataViewError::SelectedSlices {
                got: selected_slices.len(),
                expected: self.selected_slices.len(),
            });
        }
        Ok(Self {
            selected_slices,
            ..self.clone()
        })
    }

    /// Returns a copy of this view with nothing selected.
    #[must_use]
    pub fn remove_selected_slices(&self) -> Self {
        let mut selected_slices = self.selected_slices.clone();
        clear_selected_slices(&mut selected_slices, &self.unbound_dims);
        Self {
            selected_slices,
            ..self.clone()
        }
    }

    /// The number of rows.
    ///
    /// This is the size of the rows dimension if it is bounded, and otherwise the fetched extent if the end of the rows is known.
    /// The result is [`None`] if the number of rows is not known yet.
    ///
    /// # Errors
    /// Returns a [`DataViewError`] if `pod` does not hold the data above the rows level.
    pub fn get_n_rows(&self, pod: &PortionOfData) -> Result<Option<u64>, DataViewError> {
        let stop = &self.unbound_dims[0].dslice_id;
        let mut portion = pod;
        for (data_slice, dimension) in self.dslice.iter_dim(&self.dimension) {
            if data_slice.id() == stop {
                return Ok(match dimension.size() {
                    Some(size) => Some(size),
                    None if portion.has_all_upper_indices() => portion.known_extent(),
                    None => None,
                });
            }
            portion = descend(portion, &data_slice.to_index()?)?;
        }
        Err(InvariantError::new(format!("unbound data slice {stop} is not in the view")).into())
    }

    /// The data slice displaying rows `start..end`.
    ///
    /// # Errors
    /// Returns [`DataViewError::Unsupported`] if the rows level is an index level or spans several buckets.
    pub fn get_rows_view(&self, start: u64, end: u64) -> Result<DataSlice, DataViewError> {
        let mut dslice = self.dslice.clone();
        let id = &self.unbound_dims[0].dslice_id;
        match dslice.find_mut(id) {
            Some(DataSlice::Range(slice)) => {
                if slice.values().len() != 1 {
                    return Err(UnsupportedError::new(format!(
                        "paging data slice {id} with more than one bucket"
                    ))
                    .into());
                }
                slice.set_bounds(start, end).map_err(DataSliceError::from)?;
            }
            Some(DataSlice::Index(_)) => {
                return Err(UnsupportedError::new(format!("paging index data slice {id}")).into());
            }
            None => {
                return Err(
                    InvariantError::new(format!("unbound data slice {id} is not in the view"))
                        .into(),
                );
            }
        }
        Ok(dslice)
    }

    /// Returns an iterator over the indices of unbound dimension `axis` (0 for rows, 1 for columns).
    ///
    /// The data of the columns is looked up in the first row held.
    ///
    /// # Errors
    /// Returns a [`DataViewError`] if `axis` is not 0 or 1, or `pod` does not hold the data above the level.
    pub fn iter_unbound_dimension_values<'a>(
        &'a self,
        axis: usize,
        pod: &'a PortionOfData,
    ) -> Result<DataSliceKeysIterator<'a>, DataViewError> {
        let target = &self
            .unbound_dims
            .get(axis)
            .ok_or(DataViewError::InvalidAxis(axis))?
            .dslice_id;
        let mut portion = pod;
        for (data_slice, _) in self.dslice.iter_dim(&self.dimension) {
            if data_slice.id() == target {
                return Ok(data_slice.iter_keys(portion));
            }
            let idx = if data_slice.is_select_one() {
                Some(data_slice.to_index()?)
            } else {
                data_slice.iter_keys(portion).find(|idx| portion.has(idx))
            };
            if let Some(idx) = idx {
                portion = descend(portion, &idx)?;
            }
        }
        Err(InvariantError::new(format!("unbound data slice {target} is not in the view")).into())
    }

    /// Returns true if the cell at row `row` and column `col` is selected.
    #[must_use]
    pub fn is_selected(&self, row: &Index, col: &Index) -> bool {
        if self.is_no_selection() {
            return false;
        }
        let [rows, cols] = &self.unbound_dims;
        self.selected_slices[rows.slice_idx].is_selected(row)
            && self.selected_slices[cols.slice_idx].is_selected(col)
    }

    /// The selection after a click on the cell at `indice`, one index per level.
    ///
    /// - With nothing selected, the clicked cell is selected. Cells at an unbounded index cannot be selected.
    /// - With one cell selected, the selection extends to the clicked cell. Clicking the selected cell again clears the selection.
    /// - With several cells selected, the selection is cleared.
    ///
    /// # Errors
    /// Returns a [`DataViewError`] if `indice` is too short or holds a key for a range level.
    pub fn click(&self, indice: &[Index]) -> Result<Vec<Slice>, DataViewError> {
        let mut selected_slices = self.selected_slices.clone();
        let [rows, cols] = &self.unbound_dims;
        let row = indice
            .get(rows.slice_idx)
            .ok_or(DataViewError::MissingIndex(rows.slice_idx))?;
        let col = indice
            .get(cols.slice_idx)
            .ok_or(DataViewError::MissingIndex(cols.slice_idx))?;

        if self.is_no_selection() {
            if is_unbounded(row) || is_unbounded(col) {
                log::warn!("cannot select an unbounded cell ({row}, {col})");
                return Ok(selected_slices);
            }
            select_cell(&mut selected_slices[rows.slice_idx], row)?;
            select_cell(&mut selected_slices[cols.slice_idx], col)?;
            return Ok(selected_slices);
        }

        if self.is_one_cell_selected() {
            let dimension_index = DimensionIndex::new(&self.dimension);
            let is_range = |unbound_dim: &UnboundDim| {
                dimension_index
                    .get(&unbound_dim.dim_id)
                    .is_some_and(Dimension::is_range)
            };
            let row_changed =
                extend_selection(&mut selected_slices[rows.slice_idx], row, is_range(rows))?;
            let col_changed =
                extend_selection(&mut selected_slices[cols.slice_idx], col, is_range(cols))?;
            if !row_changed && !col_changed {
                clear_selected_slices(&mut selected_slices, &self.unbound_dims);
            }
            return Ok(selected_slices);
        }

        clear_selected_slices(&mut selected_slices, &self.unbound_dims);
        Ok(selected_slices)
    }

    fn is_no_selection(&self) -> bool {
        self.selected_slices[self.unbound_dims[0].slice_idx].is_unset()
    }

    fn is_one_cell_selected(&self) -> bool {
        let [rows, cols] = &self.unbound_dims;
        !self.is_no_selection()
            && self.selected_slices[rows.slice_idx].is_select_one()
            && self.selected_slices[cols.slice_idx].is_select_one()
    }
}

fn descend<'a>(portion: &'a PortionOfData, idx: &Index) -> Result<&'a PortionOfData, DataViewError> {
    portion.get(idx)?.as_portion().ok_or_else(|| {
        InvariantError::new(format!("expected nested data at index {idx}")).into()
    })
}

fn is_unbounded(idx: &Index) -> bool {
    idx.as_number() == Some(UNBOUNDED)
}

fn as_number(idx: &Index) -> Result<u64, DataViewError> {
    idx.as_number()
        .ok_or_else(|| DataViewError::InvalidIndex(idx.clone()))
}

fn select_cell(slice: &mut Slice, idx: &Index) -> Result<(), DataViewError> {
    match slice {
        Slice::Range(slice) => {
            let idx = as_number(idx)?;
            slice.set_bounds(idx, idx + 1);
        }
        Slice::Index(slice) => slice.set_index(idx.clone()),
    }
    Ok(())
}

/// Extend a single cell selection to `idx`, returning true if it now selects another cell.
fn extend_selection(slice: &mut Slice, idx: &Index, is_range: bool) -> Result<bool, DataViewError> {
    match slice {
        Slice::Range(range_slice) => {
            let idx = as_number(idx)?;
            let Some(start) = range_slice.start() else {
                range_slice.set_bounds(idx, idx.saturating_add(1));
                return Ok(true);
            };
            if idx < start {
                range_slice.set_bounds(idx, start + 1);
            } else {
                range_slice.set_bounds(start, idx.saturating_add(1));
            }
            Ok(!range_slice.is_select_one())
        }
        Slice::Index(index_slice) => {
            let changed = !index_slice.is_selected(idx);
            if is_range {
                let anchor = index_slice
                    .index()
                    .map_or(Ok(0), as_number)?;
                let idx = as_number(idx)?;
                *slice = Slice::Range(RangeSlice::new(
                    anchor.min(idx),
                    anchor.max(idx).saturating_add(1),
                ));
            } else {
                index_slice.set_index(idx.clone());
            }
            Ok(changed)
        }
    }
}

fn clear_selected_slices(selected_slices: &mut [Slice], unbound_dims: &[UnboundDim; 2]) {
    for unbound_dim in unbound_dims {
        let slice = &mut selected_slices[unbound_dim.slice_idx];
        *slice = slice.unset_like();
    }
}
