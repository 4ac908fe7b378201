//! The shape of a resource.
//!
//! A [`Dimension`] is an immutable tree describing how a resource is indexed.
//! A [`RangeDimension`] spans contiguous numeric indices, split into buckets that may each have a different sub-dimension.
//! An [`IndexDimension`] maps string keys to sub-dimensions.
//! A [`None`] sub-dimension marks a leaf.
//!
//! ```
//! # use ndwindow::{dimension::Dimension, index::{IdGenerator, Index}};
//! let dimension = Dimension::deserialize(
//!     &serde_json::json!({
//!         "type": "range",
//!         "range": [0, 100],
//!         "values": [{"type": "index", "values": {"name": null, "phone": null}}]
//!     }),
//!     &mut IdGenerator::new(),
//! )?;
//! assert_eq!(dimension.size(), Some(100));
//! assert_eq!(dimension.max_n_dims(), 2);
//! assert!(dimension.get(&Index::Number(42)).is_some());
//! assert!(dimension.get(&Index::Number(100)).is_none());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod dimension_index;
mod dimension_iterators;

use std::collections::HashMap;

pub use dimension_index::DimensionIndex;
pub use dimension_iterators::DimensionDfsIterator;

use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::{
    data_slice::DataSlice,
    index::{IdGenerator, Index, UNBOUNDED},
    range_util::{boundary_from_json, boundary_to_json, bucket_index},
};

/// A dimension deserialization error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DimensionError {
    /// The dimension is not a JSON object.
    #[error("expected a dimension object, got {0}")]
    NotAnObject(Value),
    /// A field is missing or has the wrong type.
    #[error("dimension field {0} is missing or malformed")]
    MalformedField(&'static str),
    /// The dimension type is not recognised.
    #[error("unknown dimension type {0}")]
    UnknownType(String),
    /// The number of boundaries is not one more than the number of values.
    #[error("range dimension has {0} boundaries but {1} values")]
    InvalidLength(usize, usize),
    /// A range dimension has no values.
    #[error("range dimension has no values")]
    EmptyValues,
    /// A boundary is not a non-negative integer or `inf`.
    #[error("invalid range boundary {0}")]
    InvalidBoundary(Value),
    /// The boundaries decrease.
    #[error("range boundaries {0:?} are not monotonic")]
    NonMonotonic(Vec<u64>),
}

/// A range dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeDimension {
    id: String,
    depth: usize,
    range: Vec<u64>,
    values: Vec<Option<Dimension>>,
}

impl RangeDimension {
    /// The bucket boundaries. The last boundary may be [`UNBOUNDED`].
    #[must_use]
    pub fn range(&self) -> &[u64] {
        &self.range
    }

    /// The sub-dimension of each bucket.
    #[must_use]
    pub fn values(&self) -> &[Option<Dimension>] {
        &self.values
    }

    /// The first index.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.range[0]
    }

    /// The last boundary (exclusive).
    #[must_use]
    pub fn end(&self) -> u64 {
        self.range[self.range.len() - 1]
    }

    /// Returns the sub-dimension owning `idx`, or [`None`] if `idx` is outside of the dimension.
    #[must_use]
    pub fn get(&self, idx: u64) -> Option<Option<&Dimension>> {
        bucket_index(&self.range, idx).map(|bucket| self.values[bucket].as_ref())
    }
}

/// An index dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDimension {
    id: String,
    depth: usize,
    entries: Vec<(String, Option<Dimension>)>,
    positions: HashMap<String, usize>,
}

impl IndexDimension {
    /// The number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the dimension has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Returns an iterator over the keys and sub-dimensions in order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&Dimension>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_ref()))
    }

    /// Returns true if the dimension has `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Returns the sub-dimension of `key`, or [`None`] if the key does not exist.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Option<&Dimension>> {
        self.positions
            .get(key)
            .map(|&position| self.entries[position].1.as_ref())
    }
}

/// The shape of a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Dimension {
    /// A range dimension.
    Range(RangeDimension),
    /// An index dimension.
    Index(IndexDimension),
}

impl Dimension {
    /// Deserialize a dimension from its JSON representation, assigning ids from `id_generator`.
    ///
    /// # Errors
    /// Returns a [`DimensionError`] if `value` is not a valid dimension.
    pub fn deserialize(
        value: &Value,
        id_generator: &mut IdGenerator,
    ) -> Result<Self, DimensionError> {
        Self::deserialize_at_depth(value, id_generator, 0)
    }

    fn deserialize_optional(
        value: &Value,
        id_generator: &mut IdGenerator,
        depth: usize,
    ) -> Result<Option<Self>, DimensionError> {
        if value.is_null() {
            Ok(None)
        } else {
            Self::deserialize_at_depth(value, id_generator, depth).map(Some)
        }
    }

    fn deserialize_at_depth(
        value: &Value,
        id_generator: &mut IdGenerator,
        depth: usize,
    ) -> Result<Self, DimensionError> {
        let object = value
            .as_object()
            .ok_or_else(|| DimensionError::NotAnObject(value.clone()))?;
        let dimension_type = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DimensionError::MalformedField("type"))?;
        match dimension_type {
            "range" => {
                let range = object
                    .get("range")
                    .and_then(Value::as_array)
                    .ok_or(DimensionError::MalformedField("range"))?;
                let values = object
                    .get("values")
                    .and_then(Value::as_array)
                    .ok_or(DimensionError::MalformedField("values"))?;
                if range.len() != values.len() + 1 {
                    return Err(DimensionError::InvalidLength(range.len(), values.len()));
                }
                if values.is_empty() {
                    return Err(DimensionError::EmptyValues);
                }
                let range = range
                    .iter()
                    .map(|boundary| {
                        boundary_from_json(boundary)
                            .ok_or_else(|| DimensionError::InvalidBoundary(boundary.clone()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if range.windows(2).any(|w| w[0] > w[1]) {
                    return Err(DimensionError::NonMonotonic(range));
                }
                let values = values
                    .iter()
                    .map(|value| Self::deserialize_optional(value, id_generator, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::Range(RangeDimension {
                    id: format!("rd_{}", id_generator.next_id()),
                    depth,
                    range,
                    values,
                }))
            }
            "index" => {
                let values = object
                    .get("values")
                    .and_then(Value::as_object)
                    .ok_or(DimensionError::MalformedField("values"))?;
                let entries = values
                    .iter()
                    .map(|(key, value)| {
                        Ok((
                            key.clone(),
                            Self::deserialize_optional(value, id_generator, depth + 1)?,
                        ))
                    })
                    .collect::<Result<Vec<_>, DimensionError>>()?;
                let positions = entries
                    .iter()
                    .enumerate()
                    .map(|(position, (key, _))| (key.clone(), position))
                    .collect();
                Ok(Self::Index(IndexDimension {
                    id: format!("id_{}", id_generator.next_id()),
                    depth,
                    entries,
                    positions,
                }))
            }
            other => Err(DimensionError::UnknownType(other.to_string())),
        }
    }

    /// The id of the dimension.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Range(dimension) => &dimension.id,
            Self::Index(dimension) => &dimension.id,
        }
    }

    /// The depth of the dimension in the tree it was deserialized with.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Range(dimension) => dimension.depth,
            Self::Index(dimension) => dimension.depth,
        }
    }

    /// Returns true if this is a range dimension.
    #[must_use]
    pub fn is_range(&self) -> bool {
        matches!(self, Self::Range(_))
    }

    /// Returns the range dimension, if this is one.
    #[must_use]
    pub fn as_range(&self) -> Option<&RangeDimension> {
        match self {
            Self::Range(dimension) => Some(dimension),
            Self::Index(_) => None,
        }
    }

    /// Returns the index dimension, if this is one.
    #[must_use]
    pub fn as_index(&self) -> Option<&IndexDimension> {
        match self {
            Self::Range(_) => None,
            Self::Index(dimension) => Some(dimension),
        }
    }

    /// Returns the sub-dimension owning `idx`.
    ///
    /// The result is [`None`] if `idx` is outside of the dimension, and `Some(None)` if `idx` is a leaf.
    #[must_use]
    pub fn get(&self, idx: &Index) -> Option<Option<&Dimension>> {
        match self {
            Self::Range(dimension) => idx.as_number().and_then(|idx| dimension.get(idx)),
            Self::Index(dimension) => dimension.get(&idx.as_key()),
        }
    }

    /// The number of elements of this level, or [`None`] if the dimension is unbounded.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        match self {
            Self::Range(dimension) => {
                let end = dimension.end();
                (end != UNBOUNDED).then(|| end - dimension.start())
            }
            Self::Index(dimension) => Some(dimension.len() as u64),
        }
    }

    /// The maximum number of nested levels, including this one.
    #[must_use]
    pub fn max_n_dims(&self) -> usize {
        let children: Box<dyn Iterator<Item = Option<&Dimension>> + '_> = match self {
            Self::Range(dimension) => Box::new(dimension.values.iter().map(Option::as_ref)),
            Self::Index(dimension) => Box::new(dimension.entries().map(|(_, value)| value)),
        };
        children
            .map(|child| child.map_or(0, Dimension::max_n_dims))
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Returns true if `slice` has a shape compatible with this dimension.
    ///
    /// A range slice may span several buckets as long as each overlapped part is valid.
    /// An empty range slice exactly at the last boundary is always valid.
    /// If `allow_past_end` is true, a range slice may extend past the last boundary.
    #[must_use]
    pub fn is_valid_slice(&self, slice: &DataSlice, allow_past_end: bool) -> bool {
        match (self, slice) {
            (Self::Range(dimension), DataSlice::Range(slice)) => {
                let (start, end) = (slice.start(), slice.end());
                if start < dimension.start() {
                    return false;
                }
                if !allow_past_end && end != UNBOUNDED && end > dimension.end() {
                    return false;
                }
                if start == end && start == dimension.end() {
                    return true;
                }
                let n_buckets = slice.values().len();
                for (bucket, sub_slice) in slice.values().iter().enumerate() {
                    let (bucket_start, bucket_end) =
                        (slice.range()[bucket], slice.range()[bucket + 1]);
                    if bucket_start == bucket_end && n_buckets > 1 {
                        continue;
                    }
                    let Some(mut idx) = bucket_index(dimension.range(), bucket_start) else {
                        // past the last boundary, shaped like the last bucket
                        if !allow_past_end
                            || !Self::is_valid_sub_slice(
                                dimension.values.last().and_then(Option::as_ref),
                                sub_slice.as_ref(),
                                allow_past_end,
                            )
                        {
                            return false;
                        }
                        continue;
                    };
                    loop {
                        if !Self::is_valid_sub_slice(
                            dimension.values[idx].as_ref(),
                            sub_slice.as_ref(),
                            allow_past_end,
                        ) {
                            return false;
                        }
                        idx += 1;
                        if idx >= dimension.values.len() || dimension.range[idx] >= bucket_end {
                            break;
                        }
                    }
                }
                true
            }
            (Self::Index(dimension), DataSlice::Index(slice)) => {
                slice
                    .iter()
                    .all(|(key, sub_slice)| match dimension.get(&key.as_key()) {
                        Some(sub_dimension) => Self::is_valid_sub_slice(
                            sub_dimension,
                            sub_slice,
                            allow_past_end,
                        ),
                        None => false,
                    })
            }
            _ => false,
        }
    }

    fn is_valid_sub_slice(
        dimension: Option<&Dimension>,
        slice: Option<&DataSlice>,
        allow_past_end: bool,
    ) -> bool {
        match (dimension, slice) {
            (None, None) => true,
            (Some(dimension), Some(slice)) => dimension.is_valid_slice(slice, allow_past_end),
            _ => false,
        }
    }

    /// Returns a pre-order depth-first iterator over this dimension and its descendants, with their depth relative to this dimension.
    #[must_use]
    pub fn iter_dfs(&self) -> DimensionDfsIterator<'_> {
        DimensionDfsIterator::new(self)
    }

    /// Find a descendant (or this dimension) by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Dimension> {
        self.iter_dfs()
            .map(|(dimension, _)| dimension)
            .find(|dimension| dimension.id() == id)
    }
}

struct IndexValues<'a>(&'a [(String, Option<Dimension>)]);

impl Serialize for IndexValues<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(key, value)| (key, value)))
    }
}

impl Serialize for Dimension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Range(dimension) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "range")?;
                let range: Vec<Value> = dimension.range.iter().copied().map(boundary_to_json).collect();
                map.serialize_entry("range", &range)?;
                map.serialize_entry("values", &dimension.values)?;
                map.end()
            }
            Self::Index(dimension) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "index")?;
                map.serialize_entry("values", &IndexValues(&dimension.entries))?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;

    /// `[0, 100) -> {artists: [0, 100) -> {name, phone}, company}`
    pub(crate) fn people() -> Dimension {
        Dimension::deserialize(
            &json!({
                "type": "range",
                "range": [0, 100],
                "values": [{
                    "type": "index",
                    "values": {
                        "artists": {
                            "type": "range",
                            "range": [0, 100],
                            "values": [{"type": "index", "values": {"name": null, "phone": null}}]
                        },
                        "company": null
                    }
                }]
            }),
            &mut IdGenerator::new(),
        )
        .unwrap()
    }

    /// `[0, n_rows) -> [0, n_cols)`
    pub(crate) fn table(n_rows: u64, n_cols: u64) -> Dimension {
        Dimension::deserialize(
            &json!({
                "type": "range",
                "range": [0, n_rows],
                "values": [{"type": "range", "range": [0, n_cols], "values": [null]}]
            }),
            &mut IdGenerator::new(),
        )
        .unwrap()
    }

    #[test]
    fn dimension_deserialize() {
        let dimension = people();
        assert_eq!(dimension.id(), "rd_3");
        assert_eq!(dimension.depth(), 0);
        let ids: Vec<_> = dimension
            .iter_dfs()
            .map(|(dimension, depth)| (dimension.id().to_string(), depth))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("rd_3".to_string(), 0),
                ("id_2".to_string(), 1),
                ("rd_1".to_string(), 2),
                ("id_0".to_string(), 3),
            ]
        );
        assert_eq!(dimension.find("rd_1").unwrap().depth(), 2);
    }

    #[test]
    fn dimension_deserialize_errors() {
        let mut id_generator = IdGenerator::new();
        let mut deserialize = |value: Value| Dimension::deserialize(&value, &mut id_generator);
        assert_eq!(
            deserialize(json!({"type": "range", "range": [0, 10, 20], "values": [null]})),
            Err(DimensionError::InvalidLength(3, 1))
        );
        assert_eq!(
            deserialize(json!({"type": "range", "range": [0], "values": []})),
            Err(DimensionError::EmptyValues)
        );
        assert_eq!(
            deserialize(json!({"type": "range", "range": [-1, 10], "values": [null]}))
                .unwrap_err()
                .to_string(),
            "invalid range boundary -1"
        );
        assert!(deserialize(json!({"type": "range", "range": ["a", 10], "values": [null]})).is_err());
        assert_eq!(
            deserialize(json!({"type": "range", "range": [10, 5], "values": [null]})),
            Err(DimensionError::NonMonotonic(vec![10, 5]))
        );
        assert_eq!(
            deserialize(json!({"type": "tensor", "values": []})),
            Err(DimensionError::UnknownType("tensor".to_string()))
        );
        assert!(deserialize(json!([1, 2])).is_err());
    }

    #[test]
    fn dimension_round_trip() {
        let value = json!({
            "type": "range",
            "range": [0, 10, "inf"],
            "values": [
                null,
                {"type": "index", "values": {"b": null, "a": {"type": "range", "range": [0, 3], "values": [null]}}}
            ]
        });
        let dimension = Dimension::deserialize(&value, &mut IdGenerator::new()).unwrap();
        assert_eq!(serde_json::to_value(&dimension).unwrap(), value);
        let again = Dimension::deserialize(&serde_json::to_value(&dimension).unwrap(), &mut IdGenerator::new()).unwrap();
        assert_eq!(again, dimension);
    }

    #[test]
    fn dimension_get_and_size() {
        let dimension = Dimension::deserialize(
            &json!({"type": "range", "range": [0, 10, "inf"], "values": [null, {"type": "index", "values": {"a": null}}]}),
            &mut IdGenerator::new(),
        )
        .unwrap();
        assert_eq!(dimension.get(&Index::Number(3)), Some(None));
        assert!(dimension.get(&Index::Number(10)).unwrap().unwrap().as_index().is_some());
        assert!(dimension.get(&Index::Number(1_000_000)).unwrap().is_some());
        assert_eq!(dimension.get(&Index::from("a")), None);
        assert_eq!(dimension.size(), None);
        assert_eq!(dimension.max_n_dims(), 2);

        let sub_dimension = dimension.get(&Index::Number(10)).unwrap().unwrap();
        assert_eq!(sub_dimension.size(), Some(1));
        assert_eq!(sub_dimension.get(&Index::from("a")), Some(None));
        assert_eq!(sub_dimension.get(&Index::from("b")), None);

        assert_eq!(table(42, 3).size(), Some(42));
        assert_eq!(people().max_n_dims(), 4);
    }

    #[test]
    fn dimension_is_valid_slice_past_end() {
        use crate::data_slice::DataSlice;

        let dimension = table(42, 3);
        let slice = |value| DataSlice::deserialize(&value).unwrap();
        let past_end = slice(json!({
            "type": "range",
            "range": [50, "inf"],
            "values": [{"type": "range", "range": [0, 1], "values": [null]}]
        }));
        assert!(!dimension.is_valid_slice(&past_end, false));
        assert!(dimension.is_valid_slice(&past_end, true));

        let past_end_index = slice(json!({
            "type": "range",
            "range": [50, "inf"],
            "values": [{"type": "index", "index2slice": [["a", null]]}]
        }));
        assert!(!dimension.is_valid_slice(&past_end_index, false));
        assert!(!dimension.is_valid_slice(&past_end_index, true));

        let overlapping_end = slice(json!({
            "type": "range",
            "range": [40, 50],
            "values": [{"type": "range", "range": [0, 3], "values": [null]}]
        }));
        assert!(!dimension.is_valid_slice(&overlapping_end, false));
        assert!(dimension.is_valid_slice(&overlapping_end, true));

        let at_end = slice(json!({"type": "range", "range": [42, 42], "values": [null]}));
        assert!(dimension.is_valid_slice(&at_end, false));
    }
}
