use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::dimension::IndexDimension;

use super::PortionItem;

/// An index level.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HashMapPortionOfData {
    map: BTreeMap<String, PortionItem>,
    has_all_indices: bool,
}

impl HashMapPortionOfData {
    pub(super) fn new(map: BTreeMap<String, PortionItem>, dimension: &IndexDimension) -> Self {
        let mut portion = Self {
            map,
            has_all_indices: false,
        };
        portion.update_has_all_indices(dimension);
        portion
    }

    /// The number of keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no keys are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The keys held, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    /// Returns true if every key of the dimension is held.
    #[must_use]
    pub fn has_all_indices(&self) -> bool {
        self.has_all_indices
    }

    /// Returns the item held for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PortionItem> {
        self.map.get(key)
    }

    pub(super) fn get_mut(&mut self, key: &str) -> Option<&mut PortionItem> {
        self.map.get_mut(key)
    }

    pub(super) fn insert(&mut self, key: String, item: PortionItem) {
        self.map.insert(key, item);
    }

    /// Set [`has_all_indices`](Self::has_all_indices) if the keys held are exactly those of `dimension`.
    pub(super) fn update_has_all_indices(&mut self, dimension: &IndexDimension) {
        if !self.has_all_indices
            && self.map.len() == dimension.len()
            && dimension.keys().all(|key| self.map.contains_key(key))
        {
            self.has_all_indices = true;
        }
    }

    pub(super) fn to_json(&self) -> Map<String, Value> {
        self.map
            .iter()
            .map(|(key, item)| (key.clone(), item.to_json()))
            .collect()
    }
}
