use std::collections::HashMap;

use super::DataSlice;

/// A lookup table from data slice id to data slice.
#[derive(Debug, Clone)]
pub struct DataSliceIndex<'a> {
    id2slice: HashMap<&'a str, &'a DataSlice>,
}

impl<'a> DataSliceIndex<'a> {
    /// Index `data_slice` and all of its sub-slices.
    #[must_use]
    pub fn new(data_slice: &'a DataSlice) -> Self {
        Self {
            id2slice: data_slice
                .iter_dfs()
                .map(|(data_slice, _)| (data_slice.id(), data_slice))
                .collect(),
        }
    }

    /// Returns the data slice with `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&'a DataSlice> {
        self.id2slice.get(id).copied()
    }

    /// Returns true if a data slice with `id` is indexed.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.id2slice.contains_key(id)
    }
}
