use std::collections::HashMap;

use super::Dimension;

/// A lookup table from dimension id to dimension.
#[derive(Debug, Clone)]
pub struct DimensionIndex<'a> {
    id2dimension: HashMap<&'a str, &'a Dimension>,
}

impl<'a> DimensionIndex<'a> {
    /// Index `dimension` and all of its descendants.
    #[must_use]
    pub fn new(dimension: &'a Dimension) -> Self {
        Self {
            id2dimension: dimension
                .iter_dfs()
                .map(|(dimension, _)| (dimension.id(), dimension))
                .collect(),
        }
    }

    /// Returns the dimension with `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&'a Dimension> {
        self.id2dimension.get(id).copied()
    }

    /// The number of indexed dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.id2dimension.len()
    }

    /// Returns true if no dimensions are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id2dimension.is_empty()
    }
}
