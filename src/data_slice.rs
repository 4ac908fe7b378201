//! Requested and displayed regions of a resource.
//!
//! A [`DataSlice`] mirrors the shape of a [`Dimension`] but only covers the indices that are currently requested, fetched or displayed.
//! Every node carries a synthetic id, `rds_N` for a [`ContinuousRangeDataSlice`] and `ids_N` for an [`IndexDataSlice`].
//!
//! Data slices are built:
//!  - from a [`Dimension`], selecting a bounded default window ([`DataSlice::from_dimension`]),
//!  - from a list of [`Slice`]s, selecting exactly that region resized to a bounded window ([`DataSlice::from_slices`]), or
//!  - from their JSON representation ([`DataSlice::deserialize`]).

mod data_slice_index;
mod data_slice_iterators;
mod fixed_cost_model;

pub use data_slice_index::DataSliceIndex;
pub use data_slice_iterators::{DataSliceDfsIterator, DataSliceDimIterator, DataSliceKeysIterator};

use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::{
    dimension::Dimension,
    errors::IncompatibleSliceError,
    index::{IdGenerator, Index, UNBOUNDED},
    portion_of_data::{PortionItem, PortionOfData},
    range_util::{boundary_from_json, boundary_to_json, bucket_index, RangeUtilError},
    slice::Slice,
};

/// A data slice error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataSliceError {
    /// The data slice is not a JSON object.
    #[error("expected a data slice object, got {0}")]
    NotAnObject(Value),
    /// A field is missing or has the wrong type.
    #[error("data slice field {0} is missing or malformed")]
    MalformedField(&'static str),
    /// The data slice type is not recognised.
    #[error("unknown data slice type {0}")]
    UnknownType(String),
    /// A boundary is not a non-negative integer, `inf` or `null`.
    #[error("invalid data slice boundary {0}")]
    InvalidBoundary(Value),
    /// An index is not a non-negative integer or a string.
    #[error("invalid data slice index {0}")]
    InvalidIndex(Value),
    /// An invalid bucketed range.
    #[error(transparent)]
    RangeUtilError(#[from] RangeUtilError),
    /// A slice is incompatible with the dimension.
    #[error(transparent)]
    IncompatibleSliceError(#[from] IncompatibleSliceError),
}

/// A data slice over a range dimension.
///
/// The bucket `[range[i], range[i + 1])` selects the sub-slice `values[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousRangeDataSlice {
    id: String,
    range: Vec<u64>,
    values: Vec<Option<DataSlice>>,
}

impl ContinuousRangeDataSlice {
    /// Create a new continuous range data slice.
    ///
    /// # Errors
    /// Returns [`RangeUtilError`] if `range` does not have one more boundary than `values` or is not monotonic.
    pub fn new(
        id: impl Into<String>,
        range: Vec<u64>,
        values: Vec<Option<DataSlice>>,
    ) -> Result<Self, RangeUtilError> {
        if range.len() != values.len() + 1 {
            return Err(RangeUtilError::InvalidLength(range.len(), values.len()));
        }
        if range.windows(2).any(|w| w[0] > w[1]) {
            return Err(RangeUtilError::NonMonotonic(range));
        }
        Ok(Self {
            id: id.into(),
            range,
            values,
        })
    }

    /// The id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The bucket boundaries.
    #[must_use]
    pub fn range(&self) -> &[u64] {
        &self.range
    }

    /// The bucket sub-slices.
    #[must_use]
    pub fn values(&self) -> &[Option<DataSlice>] {
        &self.values
    }

    /// The first selected index.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.range[0]
    }

    /// The exclusive end. May be [`UNBOUNDED`].
    #[must_use]
    pub fn end(&self) -> u64 {
        self.range[self.range.len() - 1]
    }

    /// Replace the bounds of a single bucket slice.
    ///
    /// # Errors
    /// Returns [`RangeUtilError`] if the slice has more than one bucket or `start > end`.
    pub fn set_bounds(&mut self, start: u64, end: u64) -> Result<(), RangeUtilError> {
        if self.values.len() != 1 {
            return Err(RangeUtilError::InvalidLength(self.range.len(), 1));
        }
        if start > end {
            return Err(RangeUtilError::NonMonotonic(vec![start, end]));
        }
        self.range = vec![start, end];
        Ok(())
    }

    /// Returns the sub-slice of the bucket containing `idx`, or [`None`] if `idx` is not selected.
    #[must_use]
    pub fn get_value(&self, idx: u64) -> Option<Option<&DataSlice>> {
        bucket_index(&self.range, idx).map(|bucket| self.values[bucket].as_ref())
    }

    /// Replace the sub-slice of the bucket containing `idx`.
    ///
    /// # Errors
    /// Returns [`IncompatibleSliceError`] if `idx` is not selected.
    pub fn set_value(
        &mut self,
        idx: u64,
        value: Option<DataSlice>,
    ) -> Result<(), IncompatibleSliceError> {
        let bucket = bucket_index(&self.range, idx).ok_or_else(|| {
            IncompatibleSliceError::new(format!("index {idx} is not in data slice {}", self.id))
        })?;
        self.values[bucket] = value;
        Ok(())
    }

    /// Returns true if `idx` is selected.
    #[must_use]
    pub fn is_selected(&self, idx: u64) -> bool {
        self.start() <= idx && idx < self.end()
    }
}

/// A data slice over an index dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDataSlice {
    id: String,
    index2slice: Vec<(Index, Option<DataSlice>)>,
}

impl IndexDataSlice {
    /// Create a new index data slice from its keys and sub-slices in order.
    #[must_use]
    pub fn new(id: impl Into<String>, index2slice: Vec<(Index, Option<DataSlice>)>) -> Self {
        Self {
            id: id.into(),
            index2slice,
        }
    }

    /// The id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The number of selected keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index2slice.len()
    }

    /// Returns true if no keys are selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index2slice.is_empty()
    }

    /// Returns an iterator over the selected keys and their sub-slices in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Index, Option<&DataSlice>)> {
        self.index2slice
            .iter()
            .map(|(index, value)| (index, value.as_ref()))
    }

    /// Returns an iterator over the selected keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &Index> {
        self.index2slice.iter().map(|(index, _)| index)
    }

    fn position(&self, idx: &Index) -> Option<usize> {
        self.index2slice
            .iter()
            .position(|(index, _)| index.same_key(idx))
    }

    /// Returns the sub-slice of `idx`, or [`None`] if `idx` is not selected.
    #[must_use]
    pub fn get_value(&self, idx: &Index) -> Option<Option<&DataSlice>> {
        self.position(idx)
            .map(|position| self.index2slice[position].1.as_ref())
    }

    /// Set the sub-slice of `idx`, selecting `idx` if it is not already selected.
    pub fn set_value(&mut self, idx: Index, value: Option<DataSlice>) {
        match self.position(&idx) {
            Some(position) => self.index2slice[position].1 = value,
            None => self.index2slice.push((idx, value)),
        }
    }

    /// Returns true if `idx` is selected.
    #[must_use]
    pub fn is_selected(&self, idx: &Index) -> bool {
        self.position(idx).is_some()
    }
}

/// The requested or displayed region of a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSlice {
    /// A slice over a range dimension.
    Range(ContinuousRangeDataSlice),
    /// A slice over an index dimension.
    Index(IndexDataSlice),
}

impl DataSlice {
    /// The id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Range(slice) => slice.id(),
            Self::Index(slice) => slice.id(),
        }
    }

    /// Returns true if `idx` is selected at this level.
    #[must_use]
    pub fn is_selected(&self, idx: &Index) -> bool {
        match self {
            Self::Range(slice) => idx.as_number().is_some_and(|idx| slice.is_selected(idx)),
            Self::Index(slice) => slice.is_selected(idx),
        }
    }

    /// Returns the sub-slice of `idx`, or [`None`] if `idx` is not selected.
    #[must_use]
    pub fn get_value(&self, idx: &Index) -> Option<Option<&DataSlice>> {
        match self {
            Self::Range(slice) => idx.as_number().and_then(|idx| slice.get_value(idx)),
            Self::Index(slice) => slice.get_value(idx),
        }
    }

    /// Set the sub-slice of `idx`.
    ///
    /// # Errors
    /// Returns [`IncompatibleSliceError`] if this is a range slice and `idx` is not a selected number.
    pub fn set_value(
        &mut self,
        idx: Index,
        value: Option<DataSlice>,
    ) -> Result<(), IncompatibleSliceError> {
        match self {
            Self::Range(slice) => {
                let number = idx.as_number().ok_or_else(|| {
                    IncompatibleSliceError::new(format!("key {idx} on range data slice {}", slice.id))
                })?;
                slice.set_value(number, value)
            }
            Self::Index(slice) => {
                slice.set_value(idx, value);
                Ok(())
            }
        }
    }

    /// Returns true if this level selects every index of `dimension` (non-recursive).
    #[must_use]
    pub fn is_slicing_all_indices(&self, dimension: &Dimension) -> bool {
        match (self, dimension) {
            (Self::Range(slice), Dimension::Range(dimension)) => {
                slice.start() == dimension.start() && slice.end() == dimension.end()
            }
            (Self::Index(slice), Dimension::Index(dimension)) => {
                slice.len() == dimension.len()
                    && slice.keys().all(|key| dimension.contains_key(&key.as_key()))
            }
            _ => false,
        }
    }

    /// Returns true if this level selects exactly one index.
    #[must_use]
    pub fn is_select_one(&self) -> bool {
        match self {
            Self::Range(slice) => slice.end() != UNBOUNDED && slice.end() - slice.start() == 1,
            Self::Index(slice) => slice.len() == 1,
        }
    }

    /// Returns the single index selected at this level.
    ///
    /// # Errors
    /// Returns [`IncompatibleSliceError`] if this level does not select exactly one index.
    pub fn to_index(&self) -> Result<Index, IncompatibleSliceError> {
        if !self.is_select_one() {
            return Err(IncompatibleSliceError::new(format!(
                "data slice {} selects more than one element",
                self.id()
            )));
        }
        match self {
            Self::Range(slice) => Ok(Index::Number(slice.start())),
            Self::Index(slice) => Ok(slice.index2slice[0].0.clone()),
        }
    }

    /// Returns an iterator over the indices of this level present in `data`.
    ///
    /// A bounded range yields every selected index.
    /// An unbounded range yields indices until the first one not known to be in `data`.
    #[must_use]
    pub fn iter_keys<'a>(&'a self, data: &'a PortionOfData) -> DataSliceKeysIterator<'a> {
        DataSliceKeysIterator::new(self, data)
    }

    /// Returns an iterator over the indices of this level and the data held for them.
    ///
    /// The data is [`None`] if it has not been fetched.
    pub fn iter_entries<'a>(
        &'a self,
        data: &'a PortionOfData,
    ) -> impl Iterator<Item = (Index, Option<&'a PortionItem>)> + 'a {
        self.iter_keys(data).map(move |idx| {
            let item = data.get(&idx).ok();
            (idx, item)
        })
    }

    /// Returns a pre-order depth-first iterator over this slice and its sub-slices, with their depth.
    #[must_use]
    pub fn iter_dfs(&self) -> DataSliceDfsIterator<'_> {
        DataSliceDfsIterator::new(self)
    }

    /// Returns a pre-order depth-first iterator over this slice and its sub-slices, paired with their dimension.
    ///
    /// Sub-slices without a matching sub-dimension are not visited, see [`Dimension::is_valid_slice`].
    #[must_use]
    pub fn iter_dim<'a>(&'a self, dimension: &'a Dimension) -> DataSliceDimIterator<'a> {
        DataSliceDimIterator::new(self, dimension)
    }

    /// Returns true if every level of this slice overlaps the slice of the same depth.
    ///
    /// Range levels must overlap their slice, index levels must contain their slice.
    /// Levels deeper than `slices` are unconstrained.
    /// `slices` should be validated against the dimension first.
    #[must_use]
    pub fn is_overlapped_with_slices(&self, slices: &[Slice]) -> bool {
        self.iter_dfs().all(|(data_slice, depth)| {
            let Some(slice) = slices.get(depth) else {
                return true;
            };
            match (data_slice, slice) {
                (Self::Range(data_slice), Slice::Range(slice)) => {
                    slice.is_range_overlapped(data_slice.start(), data_slice.end())
                }
                (Self::Range(data_slice), Slice::Index(slice)) => slice
                    .index()
                    .and_then(Index::as_number)
                    .is_some_and(|idx| data_slice.is_selected(idx)),
                (Self::Index(data_slice), Slice::Range(slice)) => data_slice
                    .keys()
                    .filter_map(Index::as_number)
                    .any(|idx| slice.is_selected(idx)),
                (Self::Index(data_slice), Slice::Index(slice)) => slice
                    .index()
                    .is_some_and(|idx| data_slice.is_selected(idx)),
            }
        })
    }

    /// Returns true if `self` and `other` select the same region, ignoring ids.
    #[must_use]
    pub fn is_equivalent(&self, other: &DataSlice) -> bool {
        fn equivalent(a: Option<&DataSlice>, b: Option<&DataSlice>) -> bool {
            match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => a.is_equivalent(b),
                _ => false,
            }
        }
        match (self, other) {
            (Self::Range(a), Self::Range(b)) => {
                a.range == b.range
                    && a.values
                        .iter()
                        .zip(&b.values)
                        .all(|(a, b)| equivalent(a.as_ref(), b.as_ref()))
            }
            (Self::Index(a), Self::Index(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(key, a)| {
                        b.get_value(key)
                            .is_some_and(|b| equivalent(a, b))
                    })
            }
            _ => false,
        }
    }

    /// Find this slice or a sub-slice by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&DataSlice> {
        self.iter_dfs()
            .map(|(data_slice, _)| data_slice)
            .find(|data_slice| data_slice.id() == id)
    }

    /// Find this slice or a sub-slice by id, mutably.
    pub fn find_mut(&mut self, id: &str) -> Option<&mut DataSlice> {
        if self.id() == id {
            return Some(self);
        }
        let children: Box<dyn Iterator<Item = &mut Option<DataSlice>> + '_> = match self {
            Self::Range(slice) => Box::new(slice.values.iter_mut()),
            Self::Index(slice) => Box::new(slice.index2slice.iter_mut().map(|(_, value)| value)),
        };
        children.flatten().find_map(|child| child.find_mut(id))
    }

    /// Deserialize a data slice from its JSON representation.
    ///
    /// Ids are assigned in pre-order from a new [`IdGenerator`].
    ///
    /// # Errors
    /// Returns a [`DataSliceError`] if `value` is not a valid data slice.
    pub fn deserialize(value: &Value) -> Result<Self, DataSliceError> {
        Self::deserialize_with_id_generator(value, &mut IdGenerator::new())
    }

    /// Deserialize a data slice from its JSON representation, assigning ids from `id_generator`.
    ///
    /// # Errors
    /// Returns a [`DataSliceError`] if `value` is not a valid data slice.
    pub fn deserialize_with_id_generator(
        value: &Value,
        id_generator: &mut IdGenerator,
    ) -> Result<Self, DataSliceError> {
        let object = value
            .as_object()
            .ok_or_else(|| DataSliceError::NotAnObject(value.clone()))?;
        let slice_type = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DataSliceError::MalformedField("type"))?;
        let deserialize_value = |value: &Value, id_generator: &mut IdGenerator| {
            if value.is_null() {
                Ok(None)
            } else {
                Self::deserialize_with_id_generator(value, id_generator).map(Some)
            }
        };
        match slice_type {
            "range" => {
                let id = format!("rds_{}", id_generator.next_id());
                let range = object
                    .get("range")
                    .and_then(Value::as_array)
                    .ok_or(DataSliceError::MalformedField("range"))?
                    .iter()
                    .map(|boundary| {
                        if boundary.is_null() {
                            Ok(UNBOUNDED)
                        } else {
                            boundary_from_json(boundary)
                                .ok_or_else(|| DataSliceError::InvalidBoundary(boundary.clone()))
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let values = object
                    .get("values")
                    .and_then(Value::as_array)
                    .ok_or(DataSliceError::MalformedField("values"))?
                    .iter()
                    .map(|value| deserialize_value(value, id_generator))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::Range(ContinuousRangeDataSlice::new(id, range, values)?))
            }
            "index" => {
                let id = format!("ids_{}", id_generator.next_id());
                let index2slice = match object.get("index2slice") {
                    Some(Value::Array(pairs)) => pairs
                        .iter()
                        .map(|pair| match pair.as_array().map(Vec::as_slice) {
                            Some([index, value]) => Ok((
                                index_from_json(index)?,
                                deserialize_value(value, id_generator)?,
                            )),
                            _ => Err(DataSliceError::MalformedField("index2slice")),
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                    Some(Value::Object(map)) => map
                        .iter()
                        .map(|(key, value)| {
                            Ok((Index::Key(key.clone()), deserialize_value(value, id_generator)?))
                        })
                        .collect::<Result<Vec<_>, DataSliceError>>()?,
                    _ => return Err(DataSliceError::MalformedField("index2slice")),
                };
                Ok(Self::Index(IndexDataSlice::new(id, index2slice)))
            }
            other => Err(DataSliceError::UnknownType(other.to_string())),
        }
    }
}

fn index_from_json(index: &Value) -> Result<Index, DataSliceError> {
    match index {
        Value::Number(number) => number
            .as_u64()
            .map(Index::Number)
            .ok_or_else(|| DataSliceError::InvalidIndex(index.clone())),
        Value::String(key) => Ok(Index::Key(key.clone())),
        _ => Err(DataSliceError::InvalidIndex(index.clone())),
    }
}

struct IndexPairs<'a>(&'a [(Index, Option<DataSlice>)]);

impl Serialize for IndexPairs<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|(index, value)| (index, value)))
    }
}

impl Serialize for DataSlice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        match self {
            Self::Range(slice) => {
                map.serialize_entry("type", "range")?;
                let range: Vec<Value> = slice.range.iter().copied().map(boundary_to_json).collect();
                map.serialize_entry("range", &range)?;
                map.serialize_entry("values", &slice.values)?;
            }
            Self::Index(slice) => {
                map.serialize_entry("type", "index")?;
                map.serialize_entry("index2slice", &IndexPairs(&slice.index2slice))?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::slice::{IndexSlice, RangeSlice};

    fn nested() -> Value {
        json!({
            "type": "range",
            "range": [0, 10, 100],
            "values": [
                null,
                {"type": "index", "index2slice": [["name", null], ["phone", {"type": "range", "range": [0, 10], "values": [null]}]]}
            ]
        })
    }

    #[test]
    fn data_slice_deserialize() {
        let data_slice = DataSlice::deserialize(&nested()).unwrap();
        let ids: Vec<_> = data_slice
            .iter_dfs()
            .map(|(data_slice, depth)| (data_slice.id().to_string(), depth))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("rds_0".to_string(), 0),
                ("ids_1".to_string(), 1),
                ("rds_2".to_string(), 2)
            ]
        );
        assert_eq!(serde_json::to_value(&data_slice).unwrap(), nested());
    }

    #[test]
    fn data_slice_deserialize_forms() {
        let data_slice = DataSlice::deserialize(&json!({
            "type": "range", "range": [0, null], "values": [{"type": "index", "index2slice": {"a": null}}]
        }))
        .unwrap();
        let DataSlice::Range(range) = &data_slice else {
            panic!()
        };
        assert_eq!(range.end(), UNBOUNDED);
        assert_eq!(
            serde_json::to_value(&data_slice).unwrap(),
            json!({"type": "range", "range": [0, "inf"], "values": [{"type": "index", "index2slice": [["a", null]]}]})
        );
        assert_eq!(
            DataSlice::deserialize(&json!({"type": "range", "range": [0, 1, 2], "values": [null]})),
            Err(DataSliceError::RangeUtilError(RangeUtilError::InvalidLength(3, 1)))
        );
        assert!(DataSlice::deserialize(&json!({"type": "index", "index2slice": [[1.5, null]]})).is_err());
        assert!(DataSlice::deserialize(&json!({"type": "cube"})).is_err());
    }

    #[test]
    fn data_slice_values() {
        let mut data_slice = DataSlice::deserialize(&nested()).unwrap();
        assert_eq!(data_slice.get_value(&Index::Number(3)), Some(None));
        assert_eq!(data_slice.get_value(&Index::Number(100)), None);
        let sub_slice = data_slice.get_value(&Index::Number(50)).unwrap().unwrap();
        assert!(sub_slice.is_selected(&Index::from("phone")));
        assert!(!sub_slice.is_selected(&Index::from("age")));
        assert!(!sub_slice.is_select_one());
        assert!(sub_slice.to_index().is_err());

        data_slice.set_value(Index::Number(5), None).unwrap();
        assert!(data_slice.set_value(Index::from("a"), None).is_err());
        assert!(data_slice.set_value(Index::Number(200), None).is_err());

        let phone = data_slice.find_mut("rds_2").unwrap();
        let DataSlice::Range(phone) = phone else {
            panic!()
        };
        phone.set_bounds(3, 4).unwrap();
        let phone = data_slice.find("rds_2").unwrap();
        assert!(phone.is_select_one());
        assert_eq!(phone.to_index().unwrap(), Index::Number(3));
    }

    #[test]
    fn data_slice_overlap() {
        let data_slice = DataSlice::deserialize(&nested()).unwrap();
        let overlapped = |layout: Vec<Slice>| data_slice.is_overlapped_with_slices(&layout);
        assert!(overlapped(vec![
            RangeSlice::new(5, 20).into(),
            IndexSlice::new("phone").into(),
            RangeSlice::new(0, 1).into(),
        ]));
        assert!(overlapped(vec![IndexSlice::new(99u64).into()]));
        assert!(!overlapped(vec![RangeSlice::new(100, 120).into()]));
        assert!(!overlapped(vec![IndexSlice::new(100u64).into()]));
        assert!(!overlapped(vec![
            RangeSlice::new(0, 20).into(),
            IndexSlice::new("age").into(),
        ]));
        assert!(!overlapped(vec![
            RangeSlice::new(0, 20).into(),
            RangeSlice::new(0, 20).into(),
        ]));
        assert!(!overlapped(vec![RangeSlice::unset().into()]));
    }

    #[test]
    fn data_slice_is_slicing_all_indices() {
        use crate::dimension::tests::{people, table};

        let slice = |value| DataSlice::deserialize(&value).unwrap();
        let dimension = table(42, 3);
        assert!(slice(json!({"type": "range", "range": [0, 42], "values": [null]}))
            .is_slicing_all_indices(&dimension));
        assert!(!slice(json!({"type": "range", "range": [0, 10], "values": [null]}))
            .is_slicing_all_indices(&dimension));
        assert!(!slice(json!({"type": "index", "index2slice": [["0", null]]}))
            .is_slicing_all_indices(&dimension));

        let dimension = people();
        let row = dimension
            .get(&Index::Number(0))
            .flatten()
            .unwrap();
        assert!(slice(json!({"type": "index", "index2slice": [["company", null], ["artists", null]]}))
            .is_slicing_all_indices(row));
        assert!(!slice(json!({"type": "index", "index2slice": [["company", null]]}))
            .is_slicing_all_indices(row));
        assert!(!slice(json!({"type": "index", "index2slice": [["company", null], ["age", null]]}))
            .is_slicing_all_indices(row));
    }

    #[test]
    fn data_slice_equivalent() {
        let a = DataSlice::deserialize(&nested()).unwrap();
        let b = DataSlice::deserialize_with_id_generator(&nested(), &mut IdGenerator::starting_at(10)).unwrap();
        assert_ne!(a, b);
        assert!(a.is_equivalent(&b));
        let c = DataSlice::deserialize(&json!({"type": "range", "range": [0, 10, 100], "values": [null, null]})).unwrap();
        assert!(!a.is_equivalent(&c));
    }
}
