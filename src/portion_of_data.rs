//! Fetched data held in memory.
//!
//! A [`PortionOfData`] mirrors the shape of the [`DataSlice`]s used to fetch it.
//! It is created from the first fetched batch with [`PortionOfData::from_slices`] and grows in place with [`PortionOfData::add_data`] as further batches arrive.
//!
//! Range levels are held as an [`ArrayPortionOfData`] once every index is known, and otherwise as a [`DiscontinuousArrayPortionOfData`]: sorted, non-overlapping segments with gaps that have not been fetched yet.
//! Index levels are held as a [`HashMapPortionOfData`].

mod array_portion_of_data;
mod discontinuous_array_portion_of_data;
mod hash_map_portion_of_data;
mod portion_of_data_merge;

pub use array_portion_of_data::ArrayPortionOfData;
pub use discontinuous_array_portion_of_data::DiscontinuousArrayPortionOfData;
pub use hash_map_portion_of_data::HashMapPortionOfData;

use serde_json::Value;
use thiserror::Error;

use crate::{
    data_slice::DataSlice,
    dimension::Dimension,
    errors::{IncompatibleSliceError, InvariantError},
    index::Index,
};

/// A portion of data error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PortionOfDataError {
    /// The slice does not match the dimension or the portion of data.
    #[error(transparent)]
    IncompatibleSlice(#[from] IncompatibleSliceError),
    /// An internal invariant was broken.
    #[error(transparent)]
    Invariant(#[from] InvariantError),
    /// An index is not held.
    #[error("index {0} is not in the portion of data")]
    MissingIndex(Index),
    /// The fetched data does not have the shape of the slice.
    #[error("expected {expected} in the data at [{indice}]")]
    UnexpectedData {
        /// The indices of the unexpected value, joined by `,`.
        indice: String,
        /// A description of the expected value.
        expected: &'static str,
    },
    /// An indice does not address a unit of data.
    #[error("indice of length {0} does not address a unit of data")]
    NotAUnit(usize),
}

/// A single fetched value, addressed by the indices leading to it.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitOfData {
    /// The indices of the value, one per level.
    pub indice: Vec<Index>,
    /// The value.
    pub value: Value,
}

/// An element of a [`PortionOfData`].
#[derive(Debug, Clone, PartialEq, derive_more::From)]
pub enum PortionItem {
    /// A nested portion of data.
    Portion(PortionOfData),
    /// A leaf value.
    Unit(UnitOfData),
}

impl PortionItem {
    /// Returns the nested portion of data, if this is one.
    #[must_use]
    pub fn as_portion(&self) -> Option<&PortionOfData> {
        match self {
            Self::Portion(portion) => Some(portion),
            Self::Unit(_) => None,
        }
    }

    /// Returns the unit of data, if this is one.
    #[must_use]
    pub fn as_unit(&self) -> Option<&UnitOfData> {
        match self {
            Self::Portion(_) => None,
            Self::Unit(unit) => Some(unit),
        }
    }

    /// Convert the item to JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Portion(portion) => portion.to_json(),
            Self::Unit(unit) => unit.value.clone(),
        }
    }
}

/// Fetched data of a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum PortionOfData {
    /// A range level with every index held.
    Array(ArrayPortionOfData),
    /// A range level with gaps.
    DiscontinuousArray(DiscontinuousArrayPortionOfData),
    /// An index level.
    HashMap(HashMapPortionOfData),
}

impl PortionOfData {
    /// Create a portion of data from `data` fetched for `slice`.
    ///
    /// A range level consumes elements of `data` until either is exhausted.
    ///
    /// # Errors
    /// Returns a [`PortionOfDataError`] if `slice` is not valid for `dimension` or `data` does not have the shape of `slice`.
    pub fn from_slices(
        slice: &DataSlice,
        dimension: &Dimension,
        data: &Value,
    ) -> Result<Self, PortionOfDataError> {
        if !dimension.is_valid_slice(slice, false) {
            return Err(IncompatibleSliceError::new(format!(
                "data slice {} does not match dimension {}",
                slice.id(),
                dimension.id()
            ))
            .into());
        }
        portion_of_data_merge::from_data_slice(slice, dimension, data, &mut Vec::new())
    }

    /// Merge `data` fetched for `slice` into this portion of data.
    ///
    /// Indices already held are merged recursively and new indices are inserted.
    /// A batch shorter than the range requested (or empty and at the end of the known data) marks the end of the data.
    ///
    /// # Errors
    /// Returns a [`PortionOfDataError`] if `slice` is not valid for `dimension` or does not match this portion of data, or if `data` does not have the shape of `slice`.
    pub fn add_data(
        &mut self,
        slice: &DataSlice,
        dimension: &Dimension,
        data: &Value,
    ) -> Result<(), PortionOfDataError> {
        if !dimension.is_valid_slice(slice, true) {
            return Err(IncompatibleSliceError::new(format!(
                "data slice {} does not match dimension {}",
                slice.id(),
                dimension.id()
            ))
            .into());
        }
        portion_of_data_merge::merge_portion(self, slice, dimension, data, &mut Vec::new())
    }

    /// Returns true if every index of this level is held.
    ///
    /// This does not mean that every nested level is complete.
    #[must_use]
    pub fn has_all_indices(&self) -> bool {
        match self {
            Self::Array(portion) => portion.has_all_indices(),
            Self::DiscontinuousArray(_) => false,
            Self::HashMap(portion) => portion.has_all_indices(),
        }
    }

    /// Returns true if the end of this level is known.
    #[must_use]
    pub fn has_all_upper_indices(&self) -> bool {
        match self {
            Self::Array(portion) => portion.has_all_indices(),
            Self::DiscontinuousArray(portion) => portion.has_all_upper_indices(),
            Self::HashMap(portion) => portion.has_all_indices(),
        }
    }

    /// Returns the item held for `idx`.
    ///
    /// # Errors
    /// Returns [`PortionOfDataError::MissingIndex`] if `idx` is not held.
    pub fn get(&self, idx: &Index) -> Result<&PortionItem, PortionOfDataError> {
        let item = match self {
            Self::Array(portion) => idx.as_number().and_then(|idx| portion.get(idx)),
            Self::DiscontinuousArray(portion) => idx.as_number().and_then(|idx| portion.get(idx)),
            Self::HashMap(portion) => portion.get(&idx.as_key()),
        };
        item.ok_or_else(|| PortionOfDataError::MissingIndex(idx.clone()))
    }

    /// Returns the unit of data at `indice`, one index per level.
    ///
    /// # Errors
    /// Returns [`PortionOfDataError::MissingIndex`] if an index is not held, or [`PortionOfDataError::NotAUnit`] if `indice` is shorter or longer than the data.
    pub fn get_data(&self, indice: &[Index]) -> Result<&UnitOfData, PortionOfDataError> {
        let Some((last, path)) = indice.split_last() else {
            return Err(PortionOfDataError::NotAUnit(0));
        };
        let mut portion = self;
        for idx in path {
            portion = portion
                .get(idx)?
                .as_portion()
                .ok_or(PortionOfDataError::NotAUnit(indice.len()))?;
        }
        portion
            .get(last)?
            .as_unit()
            .ok_or(PortionOfDataError::NotAUnit(indice.len()))
    }

    /// Returns true if `idx` may exist.
    ///
    /// This is true if `idx` is held, and also if it is not held but not every index of this level is known.
    #[must_use]
    pub fn may_has(&self, idx: &Index) -> bool {
        self.has(idx) || !self.has_all_indices()
    }

    /// Returns true if `idx` is held.
    #[must_use]
    pub fn has(&self, idx: &Index) -> bool {
        self.get(idx).is_ok()
    }

    /// The number of indices held at this level.
    #[must_use]
    pub fn portion_size(&self) -> usize {
        match self {
            Self::Array(portion) => portion.len(),
            Self::DiscontinuousArray(portion) => portion.portion_size(),
            Self::HashMap(portion) => portion.len(),
        }
    }

    /// The end of the last range held, or [`None`] for an index level or if nothing is held.
    #[must_use]
    pub fn known_extent(&self) -> Option<u64> {
        match self {
            Self::Array(portion) => Some(portion.end()),
            Self::DiscontinuousArray(portion) => portion.known_extent(),
            Self::HashMap(_) => None,
        }
    }

    /// Convert the data to JSON.
    ///
    /// Range levels are arrays indexed from zero, with `null` for indices that are not held.
    /// Index levels are objects.
    ///
    /// The length of a range level is its known extent, so data held far from zero allocates one `null` per leading index.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Array(portion) => Value::Array(portion.to_json()),
            Self::DiscontinuousArray(portion) => Value::Array(portion.to_json()),
            Self::HashMap(portion) => Value::Object(portion.to_json()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        dimension::tests::{people, table},
        index::{IdGenerator, UNBOUNDED},
        location::Location,
        slice::Slice,
    };

    /// A data slice with one level per token of `layout`, e.g. `0..10:..`.
    pub(crate) fn data_slice(layout: &str) -> DataSlice {
        let location = Location::from_string("r", layout).unwrap();
        let value = location
            .slices()
            .iter()
            .rev()
            .fold(Value::Null, |value, slice| match slice {
                Slice::Range(slice) => {
                    let end = slice.end().unwrap();
                    let end = if end == UNBOUNDED { json!("inf") } else { json!(end) };
                    json!({"type": "range", "range": [slice.start().unwrap(), end], "values": [value]})
                }
                Slice::Index(slice) => {
                    json!({"type": "index", "index2slice": [[slice.index().unwrap(), value]]})
                }
            });
        DataSlice::deserialize(&value).unwrap()
    }

    fn rows(start: u64, end: u64) -> Vec<Value> {
        (start..end)
            .map(|row| json!([row, row * 10, format!("r{row}")]))
            .collect()
    }

    fn nulls(n: usize) -> Vec<Value> {
        vec![Value::Null; n]
    }

    fn concat(parts: &[Vec<Value>]) -> Value {
        Value::Array(parts.concat())
    }

    #[test]
    fn portion_of_data_to_json() {
        let dimension = Dimension::deserialize(
            &json!({"type": "range", "range": [0, 100], "values": [{"type": "range", "range": [0, 3], "values": [null]}]}),
            &mut IdGenerator::new(),
        )
        .unwrap();
        let data = json!([[1, 2, 3], [6, 7, 8]]);
        let portion = PortionOfData::from_slices(&data_slice("0..2:..3"), &dimension, &data).unwrap();
        assert_eq!(portion.to_json(), data);
        let portion = PortionOfData::from_slices(&data_slice("3..5:..3"), &dimension, &data).unwrap();
        assert_eq!(
            portion.to_json(),
            json!([null, null, null, [1, 2, 3], [6, 7, 8]])
        );
        assert!(PortionOfData::from_slices(&data_slice("0..2:..3"), &dimension, &json!({"a": 1})).is_err());
    }

    #[test]
    fn portion_of_data_add_data() {
        let dimension = table(42, 3);
        let data = rows(0, 42);
        let window = |start: u64, end: u64| Value::Array(rows(start, end));

        let mut portion =
            PortionOfData::from_slices(&data_slice("0..10:.."), &dimension, &window(0, 10)).unwrap();
        assert_eq!(portion.to_json(), window(0, 10));

        portion.add_data(&data_slice("20..30:.."), &dimension, &window(20, 30)).unwrap();
        assert_eq!(
            portion.to_json(),
            concat(&[rows(0, 10), nulls(10), rows(20, 30)])
        );
        assert_eq!(portion.portion_size(), 20);

        portion.add_data(&data_slice("10..20:.."), &dimension, &window(10, 20)).unwrap();
        assert_eq!(portion.to_json(), window(0, 30));

        portion.add_data(&data_slice("30..40:.."), &dimension, &window(30, 40)).unwrap();
        assert_eq!(portion.to_json(), window(0, 40));
        assert!(!portion.has_all_indices());

        portion.add_data(&data_slice("40..:.."), &dimension, &window(40, 42)).unwrap();
        assert_eq!(portion.to_json(), Value::Array(data.clone()));
        assert!(matches!(portion, PortionOfData::Array(_)));
        assert!(portion.has_all_indices());
        assert!(portion.has_all_upper_indices());

        portion.add_data(&data_slice("40..50:.."), &dimension, &window(40, 42)).unwrap();
        assert_eq!(portion.to_json(), Value::Array(data.clone()));
        assert!(portion.has_all_indices());
        assert!(portion.has_all_upper_indices());

        let mut portion =
            PortionOfData::from_slices(&data_slice("20..30:.."), &dimension, &window(20, 30)).unwrap();
        portion.add_data(&data_slice("42..42:.."), &dimension, &json!([])).unwrap();
        assert_eq!(portion.to_json(), concat(&[nulls(20), rows(20, 30)]));
        assert!(!portion.has_all_upper_indices());

        // the segment reaches the end of the dimension
        portion.add_data(&data_slice("30..42:.."), &dimension, &window(30, 42)).unwrap();
        assert_eq!(portion.to_json(), concat(&[nulls(20), rows(20, 42)]));
        assert!(!portion.has_all_indices());
        assert!(portion.has_all_upper_indices());

        let tail =
            PortionOfData::from_slices(&data_slice("30..42:.."), &dimension, &window(30, 42)).unwrap();
        assert!(!tail.has_all_indices());
        assert!(tail.has_all_upper_indices());

        portion.add_data(&data_slice("42..42:.."), &dimension, &json!([])).unwrap();
        assert_eq!(portion.to_json(), concat(&[nulls(20), rows(20, 42)]));
        assert!(!portion.has_all_indices());
        assert!(portion.has_all_upper_indices());
        assert_eq!(portion.known_extent(), Some(42));
    }

    #[test]
    fn portion_of_data_merge_is_idempotent() {
        let dimension = table(42, 3);
        let batch = Value::Array(rows(5, 15));
        let mut portion =
            PortionOfData::from_slices(&data_slice("5..15:.."), &dimension, &batch).unwrap();
        let expected = portion.clone();
        portion.add_data(&data_slice("5..15:.."), &dimension, &batch).unwrap();
        assert_eq!(portion, expected);
    }

    #[test]
    fn portion_of_data_merge_order() {
        let dimension = table(42, 3);
        let batches = [(0, 10), (30, 42), (20, 30), (10, 20)];
        let build = |order: &[usize]| {
            let (start, end) = batches[order[0]];
            let mut portion = PortionOfData::from_slices(
                &data_slice(&format!("{start}..{end}:..")),
                &dimension,
                &Value::Array(rows(start, end)),
            )
            .unwrap();
            for &i in &order[1..] {
                let (start, end) = batches[i];
                portion
                    .add_data(
                        &data_slice(&format!("{start}..{end}:..")),
                        &dimension,
                        &Value::Array(rows(start, end)),
                    )
                    .unwrap();
            }
            portion
        };
        let a = build(&[0, 1, 2, 3]);
        let b = build(&[1, 3, 0, 2]);
        assert_eq!(a.to_json(), b.to_json());
        assert_eq!(a.to_json(), Value::Array(rows(0, 42)));
        // a segment covering the whole dimension collapses
        assert!(a.has_all_indices());
        assert!(b.has_all_indices());
    }

    #[test]
    fn portion_of_data_get() {
        let dimension = table(42, 3);
        let portion = PortionOfData::from_slices(
            &data_slice("4..6:0..2"),
            &dimension,
            &json!([[1, 2], [3, 4]]),
        )
        .unwrap();
        let unit = portion.get_data(&[Index::Number(5), Index::Number(1)]).unwrap();
        assert_eq!(unit.value, json!(4));
        assert_eq!(unit.indice, vec![Index::Number(5), Index::Number(1)]);
        assert_eq!(
            portion.get_data(&[Index::Number(6), Index::Number(0)]),
            Err(PortionOfDataError::MissingIndex(Index::Number(6)))
        );
        assert_eq!(
            portion.get_data(&[Index::Number(5)]),
            Err(PortionOfDataError::NotAUnit(1))
        );
        assert!(portion.has(&Index::Number(4)));
        assert!(!portion.has(&Index::Number(3)));
        assert!(portion.may_has(&Index::Number(3)));
        assert_eq!(portion.known_extent(), Some(6));

        let inner = portion.get(&Index::Number(4)).unwrap().as_portion().unwrap();
        assert!(!inner.has_all_indices());
        assert!(!inner.has(&Index::Number(2)));
        assert!(inner.may_has(&Index::Number(2)));
    }

    #[test]
    fn portion_of_data_hash_map() {
        let dimension = people();
        let mut portion = PortionOfData::from_slices(
            &data_slice("0..2:company"),
            &dimension,
            &json!([{"company": "a"}, {"company": "b"}]),
        )
        .unwrap();
        let row = portion.get(&Index::Number(0)).unwrap().as_portion().unwrap();
        assert!(!row.has_all_indices());
        assert!(row.may_has(&Index::from("artists")));

        portion
            .add_data(
                &data_slice("0..2:artists:0..1:name"),
                &dimension,
                &json!([{"artists": [{"name": "x"}]}, {"artists": [{"name": "y"}]}]),
            )
            .unwrap();
        assert_eq!(
            portion.to_json(),
            json!([
                {"artists": [{"name": "x"}], "company": "a"},
                {"artists": [{"name": "y"}], "company": "b"}
            ])
        );
        let row = portion.get(&Index::Number(1)).unwrap().as_portion().unwrap();
        assert!(row.has_all_indices());
        assert!(!row.may_has(&Index::from("age")));
        assert_eq!(row.portion_size(), 2);
        assert_eq!(
            portion
                .get_data(&[Index::Number(1), "artists".into(), Index::Number(0), "name".into()])
                .unwrap()
                .value,
            json!("y")
        );
    }

    #[test]
    fn portion_of_data_incompatible() {
        let dimension = table(42, 3);
        let mut portion =
            PortionOfData::from_slices(&data_slice("0..10:.."), &dimension, &Value::Array(rows(0, 10)))
                .unwrap();
        assert!(matches!(
            portion.add_data(&data_slice("0..2:name"), &dimension, &json!([])),
            Err(PortionOfDataError::IncompatibleSlice(_))
        ));
        assert!(PortionOfData::from_slices(&data_slice("0..50:.."), &dimension, &json!([])).is_err());
        assert!(matches!(
            portion.add_data(&data_slice("12..14:.."), &dimension, &json!(5)),
            Err(PortionOfDataError::UnexpectedData { .. })
        ));
    }
}
