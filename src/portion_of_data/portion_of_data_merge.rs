//! Building and merging portions of data against their data slices.
//!
//! `indices` tracks the path from the root to the current level and is recorded in every [`UnitOfData`].

use std::collections::BTreeMap;

use itertools::Itertools;
use serde_json::Value;

use crate::{
    data_slice::{ContinuousRangeDataSlice, DataSlice, IndexDataSlice},
    dimension::{Dimension, IndexDimension, RangeDimension},
    errors::{IncompatibleSliceError, InvariantError},
    index::{Index, UNBOUNDED},
};

use super::{
    ArrayPortionOfData, DiscontinuousArrayPortionOfData, HashMapPortionOfData, PortionItem,
    PortionOfData, PortionOfDataError, UnitOfData,
};

fn unexpected(indices: &[Index], expected: &'static str) -> PortionOfDataError {
    PortionOfDataError::UnexpectedData {
        indice: indices.iter().join(","),
        expected,
    }
}

fn mismatch(slice: &DataSlice, dimension: Option<&Dimension>) -> IncompatibleSliceError {
    match dimension {
        Some(dimension) => IncompatibleSliceError::new(format!(
            "data slice {} does not match dimension {}",
            slice.id(),
            dimension.id()
        )),
        None => IncompatibleSliceError::new(format!(
            "data slice {} is below a leaf of the dimension",
            slice.id()
        )),
    }
}

fn as_array<'a>(data: &'a Value, indices: &[Index]) -> Result<&'a [Value], PortionOfDataError> {
    data.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| unexpected(indices, "an array"))
}

/// The number of elements of `data` consumed by a range slice `[start, end)`.
fn n_consumed(data: &[Value], start: u64, end: u64) -> u64 {
    (data.len() as u64).min(end - start)
}

fn sub_slice(
    slice: &ContinuousRangeDataSlice,
    idx: u64,
) -> Result<Option<&DataSlice>, InvariantError> {
    slice.get_value(idx).ok_or_else(|| {
        InvariantError::new(format!("index {idx} is outside of data slice {}", slice.id()))
    })
}

fn item_from_data_slice(
    slice: Option<&DataSlice>,
    dimension: Option<&Dimension>,
    data: &Value,
    indices: &mut Vec<Index>,
) -> Result<PortionItem, PortionOfDataError> {
    let Some(slice) = slice else {
        return Ok(PortionItem::Unit(UnitOfData {
            indice: indices.clone(),
            value: data.clone(),
        }));
    };
    let dimension = dimension.ok_or_else(|| mismatch(slice, None))?;
    from_data_slice(slice, dimension, data, indices).map(PortionItem::Portion)
}

/// The item at `idx` of a range level whose data starts at `slice.start()`.
fn range_item(
    slice: &ContinuousRangeDataSlice,
    dimension: &RangeDimension,
    data: &[Value],
    idx: u64,
    indices: &mut Vec<Index>,
) -> Result<PortionItem, PortionOfDataError> {
    indices.push(Index::Number(idx));
    let item = usize::try_from(idx - slice.start())
        .ok()
        .and_then(|offset| data.get(offset))
        .ok_or_else(|| unexpected(indices, "an element"))
        .and_then(|value| {
            let sub_slice = sub_slice(slice, idx)?;
            item_from_data_slice(sub_slice, dimension.get(idx).flatten(), value, indices)
        });
    indices.pop();
    item
}

fn merge_range_item(
    item: &mut PortionItem,
    slice: &ContinuousRangeDataSlice,
    dimension: &RangeDimension,
    data: &[Value],
    idx: u64,
    indices: &mut Vec<Index>,
) -> Result<(), PortionOfDataError> {
    indices.push(Index::Number(idx));
    let result = usize::try_from(idx - slice.start())
        .ok()
        .and_then(|offset| data.get(offset))
        .ok_or_else(|| unexpected(indices, "an element"))
        .and_then(|value| {
            let sub_slice = sub_slice(slice, idx)?;
            merge_item(item, sub_slice, dimension.get(idx).flatten(), value, indices)
        });
    indices.pop();
    result
}

/// Build the portion of data held by `data` fetched for `slice`.
pub(super) fn from_data_slice(
    slice: &DataSlice,
    dimension: &Dimension,
    data: &Value,
    indices: &mut Vec<Index>,
) -> Result<PortionOfData, PortionOfDataError> {
    match (slice, dimension) {
        (DataSlice::Range(range_slice), Dimension::Range(range_dimension)) => {
            let data = as_array(data, indices)?;
            let (start, end) = (range_slice.start(), range_slice.end());
            let n = n_consumed(data, start, end);
            let items = (start..start + n)
                .map(|idx| range_item(range_slice, range_dimension, data, idx, indices))
                .collect::<Result<Vec<_>, _>>()?;
            let mut array = ArrayPortionOfData::new(start, items);

            let exhausted = end - start > n;
            let consumed_end = start + n;
            if start == range_dimension.start()
                && (consumed_end == range_dimension.end()
                    || (range_dimension.end() == UNBOUNDED && exhausted))
            {
                array.set_has_all_indices();
                return Ok(PortionOfData::Array(array));
            }
            let mut portion = DiscontinuousArrayPortionOfData::new(if array.is_empty() {
                Vec::new()
            } else {
                vec![array]
            });
            let reaches_end =
                range_dimension.end() != UNBOUNDED && consumed_end >= range_dimension.end();
            if n > 0 && (exhausted || reaches_end) {
                portion.set_has_all_upper_indices();
            }
            Ok(PortionOfData::DiscontinuousArray(portion))
        }
        (DataSlice::Index(index_slice), Dimension::Index(index_dimension)) => {
            let object = data
                .as_object()
                .ok_or_else(|| unexpected(indices, "an object"))?;
            let mut map = BTreeMap::new();
            for (idx, sub_slice) in index_slice.iter() {
                let key = idx.as_key();
                indices.push(idx.clone());
                let item = object
                    .get(key.as_ref())
                    .ok_or_else(|| unexpected(indices, "a value"))
                    .and_then(|value| {
                        item_from_data_slice(
                            sub_slice,
                            index_dimension.get(&key).flatten(),
                            value,
                            indices,
                        )
                    });
                indices.pop();
                map.insert(key.into_owned(), item?);
            }
            Ok(PortionOfData::HashMap(HashMapPortionOfData::new(
                map,
                index_dimension,
            )))
        }
        _ => Err(mismatch(slice, Some(dimension)).into()),
    }
}

fn merge_item(
    item: &mut PortionItem,
    slice: Option<&DataSlice>,
    dimension: Option<&Dimension>,
    data: &Value,
    indices: &mut Vec<Index>,
) -> Result<(), PortionOfDataError> {
    let Some(slice) = slice else {
        *item = PortionItem::Unit(UnitOfData {
            indice: indices.clone(),
            value: data.clone(),
        });
        return Ok(());
    };
    let dimension = dimension.ok_or_else(|| mismatch(slice, None))?;
    if let PortionItem::Portion(portion) = item {
        return merge_portion(portion, slice, dimension, data, indices);
    }
    // a leaf value replaced by nested data
    *item = PortionItem::Portion(from_data_slice(slice, dimension, data, indices)?);
    Ok(())
}

/// Merge `data` fetched for `slice` into `portion`, in place.
pub(super) fn merge_portion(
    portion: &mut PortionOfData,
    slice: &DataSlice,
    dimension: &Dimension,
    data: &Value,
    indices: &mut Vec<Index>,
) -> Result<(), PortionOfDataError> {
    let incompatible = || {
        IncompatibleSliceError::new(format!(
            "data slice {} does not match the portion of data",
            slice.id()
        ))
    };
    match portion {
        PortionOfData::HashMap(hash_map) => {
            let (DataSlice::Index(index_slice), Dimension::Index(index_dimension)) =
                (slice, dimension)
            else {
                return Err(incompatible().into());
            };
            merge_hash_map(hash_map, index_slice, index_dimension, data, indices)
        }
        PortionOfData::Array(array) => {
            let (DataSlice::Range(range_slice), Dimension::Range(range_dimension)) =
                (slice, dimension)
            else {
                return Err(incompatible().into());
            };
            merge_array(array, range_slice, range_dimension, data, indices)
        }
        PortionOfData::DiscontinuousArray(discontinuous) => {
            let (DataSlice::Range(range_slice), Dimension::Range(range_dimension)) =
                (slice, dimension)
            else {
                return Err(incompatible().into());
            };
            if !merge_discontinuous(discontinuous, range_slice, range_dimension, data, indices)? {
                return Ok(());
            }
            let arrays = std::mem::take(&mut discontinuous.arrays);
            let Ok([mut array]) = <[ArrayPortionOfData; 1]>::try_from(arrays) else {
                return Err(InvariantError::new(format!(
                    "collapsing data slice {} with more than one segment",
                    slice.id()
                ))
                .into());
            };
            log::debug!(
                "collapsing portion of data [{}, {}) of data slice {}",
                array.start(),
                array.end(),
                slice.id()
            );
            array.set_has_all_indices();
            *portion = PortionOfData::Array(array);
            Ok(())
        }
    }
}

fn merge_hash_map(
    portion: &mut HashMapPortionOfData,
    slice: &IndexDataSlice,
    dimension: &IndexDimension,
    data: &Value,
    indices: &mut Vec<Index>,
) -> Result<(), PortionOfDataError> {
    let object = data
        .as_object()
        .ok_or_else(|| unexpected(indices, "an object"))?;
    for (idx, sub_slice) in slice.iter() {
        let key = idx.as_key();
        indices.push(idx.clone());
        let result = object
            .get(key.as_ref())
            .ok_or_else(|| unexpected(indices, "a value"))
            .and_then(|value| {
                let sub_dimension = dimension.get(&key).flatten();
                if let Some(item) = portion.get_mut(&key) {
                    merge_item(item, sub_slice, sub_dimension, value, indices)
                } else {
                    let item = item_from_data_slice(sub_slice, sub_dimension, value, indices)?;
                    portion.insert(key.to_string(), item);
                    Ok(())
                }
            });
        indices.pop();
        result?;
    }
    portion.update_has_all_indices(dimension);
    Ok(())
}

fn merge_array(
    array: &mut ArrayPortionOfData,
    slice: &ContinuousRangeDataSlice,
    dimension: &RangeDimension,
    data: &Value,
    indices: &mut Vec<Index>,
) -> Result<(), PortionOfDataError> {
    let data = as_array(data, indices)?;
    let (start, end) = (slice.start(), slice.end());
    let data_end = start + n_consumed(data, start, end);
    for idx in start.max(array.start())..data_end.min(array.end()) {
        let Some(item) = array.get_mut(idx) else {
            continue;
        };
        merge_range_item(item, slice, dimension, data, idx, indices)?;
    }
    Ok(())
}

/// Merge into a discontinuous portion, returning true if it now holds every index and should collapse to a single array.
fn merge_discontinuous(
    portion: &mut DiscontinuousArrayPortionOfData,
    slice: &ContinuousRangeDataSlice,
    dimension: &RangeDimension,
    data: &Value,
    indices: &mut Vec<Index>,
) -> Result<bool, PortionOfDataError> {
    let data = as_array(data, indices)?;
    let (start, end) = (slice.start(), slice.end());
    let n = n_consumed(data, start, end);
    let data_end = start + n;

    // segments overlapping or adjacent to [start, data_end)
    let first = portion.arrays.partition_point(|array| array.end() < start);
    let last = portion
        .arrays
        .partition_point(|array| array.start() <= data_end);

    if first >= last {
        if n > 0 {
            log::debug!(
                "inserting segment [{start}, {data_end}) of data slice {}",
                slice.id()
            );
            let items = (start..data_end)
                .map(|idx| range_item(slice, dimension, data, idx, indices))
                .collect::<Result<Vec<_>, _>>()?;
            portion
                .arrays
                .insert(first, ArrayPortionOfData::new(start, items));
        }
    } else {
        let matched: Vec<_> = portion.arrays.drain(first..last).collect();
        log::debug!(
            "merging {} segments with [{start}, {data_end}) of data slice {}",
            matched.len(),
            slice.id()
        );
        let merged_start = matched
            .first()
            .map_or(start, |array| array.start().min(start));
        let mut items = Vec::new();
        let mut cursor = merged_start;
        for array in matched {
            let array_start = array.start();
            for idx in cursor..array_start {
                items.push(range_item(slice, dimension, data, idx, indices)?);
            }
            cursor = array.end();
            for (idx, mut item) in (array_start..).zip(array.into_items()) {
                if start <= idx && idx < data_end {
                    merge_range_item(&mut item, slice, dimension, data, idx, indices)?;
                }
                items.push(item);
            }
        }
        for idx in cursor..data_end {
            items.push(range_item(slice, dimension, data, idx, indices)?);
        }
        portion
            .arrays
            .insert(first, ArrayPortionOfData::new(merged_start, items));
    }

    // a segment reaching the end of a finite dimension also marks the end of the data
    let reaches_end = dimension.end() != UNBOUNDED
        && portion
            .known_extent()
            .is_some_and(|extent| extent >= dimension.end());
    let exhausted = reaches_end
        || (n == 0 && portion.known_extent() == Some(start))
        || (n > 0 && end - start > n);
    let (at_start, covers_dimension) = match portion.arrays.as_slice() {
        [array] => (
            array.start() == dimension.start(),
            array.start() == dimension.start()
                && dimension.end() != UNBOUNDED
                && array.end() >= dimension.end(),
        ),
        _ => (false, false),
    };
    if covers_dimension || (at_start && (exhausted || portion.has_all_upper_indices())) {
        return Ok(true);
    }
    if exhausted && !portion.has_all_upper_indices() {
        log::debug!(
            "no data past {:?} for data slice {}",
            portion.known_extent(),
            slice.id()
        );
        portion.set_has_all_upper_indices();
    }
    Ok(false)
}
