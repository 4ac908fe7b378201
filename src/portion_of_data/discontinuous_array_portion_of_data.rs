use serde_json::Value;

use super::{array_portion_of_data::pad_json, ArrayPortionOfData, PortionItem};

/// A range level held as sorted, non-overlapping runs.
///
/// The gaps between runs have not been fetched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiscontinuousArrayPortionOfData {
    pub(super) arrays: Vec<ArrayPortionOfData>,
    has_all_upper_indices: bool,
}

impl DiscontinuousArrayPortionOfData {
    pub(super) fn new(arrays: Vec<ArrayPortionOfData>) -> Self {
        Self {
            arrays,
            has_all_upper_indices: false,
        }
    }

    /// The runs, sorted by start.
    #[must_use]
    pub fn arrays(&self) -> &[ArrayPortionOfData] {
        &self.arrays
    }

    /// Returns true if no index past the last run exists.
    #[must_use]
    pub fn has_all_upper_indices(&self) -> bool {
        self.has_all_upper_indices
    }

    pub(super) fn set_has_all_upper_indices(&mut self) {
        self.has_all_upper_indices = true;
    }

    /// Returns the item held for `idx`.
    #[must_use]
    pub fn get(&self, idx: u64) -> Option<&PortionItem> {
        let position = self.arrays.partition_point(|array| array.start() <= idx);
        position
            .checked_sub(1)
            .and_then(|position| self.arrays[position].get(idx))
    }

    /// The total number of items held.
    #[must_use]
    pub fn portion_size(&self) -> usize {
        self.arrays.iter().map(ArrayPortionOfData::len).sum()
    }

    /// The end of the last run.
    #[must_use]
    pub fn known_extent(&self) -> Option<u64> {
        self.arrays.last().map(ArrayPortionOfData::end)
    }

    pub(super) fn to_json(&self) -> Vec<Value> {
        let mut json = Vec::with_capacity(self.portion_size());
        for array in &self.arrays {
            pad_json(&mut json, array.start());
            array.extend_json(&mut json);
        }
        json
    }
}
