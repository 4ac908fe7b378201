use serde_json::Value;

use super::PortionItem;

/// A contiguous run of a range level, starting at [`start`](ArrayPortionOfData::start).
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPortionOfData {
    start: u64,
    items: Vec<PortionItem>,
    has_all_indices: bool,
}

impl ArrayPortionOfData {
    pub(super) fn new(start: u64, items: Vec<PortionItem>) -> Self {
        Self {
            start,
            items,
            has_all_indices: false,
        }
    }

    /// The first index held.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// One past the last index held.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.start + self.items.len() as u64
    }

    /// The items, in index order.
    #[must_use]
    pub fn items(&self) -> &[PortionItem] {
        &self.items
    }

    /// The number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no items are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true if this run holds every index of its level.
    #[must_use]
    pub fn has_all_indices(&self) -> bool {
        self.has_all_indices
    }

    pub(super) fn set_has_all_indices(&mut self) {
        self.has_all_indices = true;
    }

    fn offset(&self, idx: u64) -> Option<usize> {
        idx.checked_sub(self.start)
            .and_then(|offset| usize::try_from(offset).ok())
    }

    /// Returns the item held for `idx`.
    #[must_use]
    pub fn get(&self, idx: u64) -> Option<&PortionItem> {
        self.offset(idx).and_then(|offset| self.items.get(offset))
    }

    pub(super) fn get_mut(&mut self, idx: u64) -> Option<&mut PortionItem> {
        self.offset(idx).and_then(|offset| self.items.get_mut(offset))
    }

    pub(super) fn into_items(self) -> Vec<PortionItem> {
        self.items
    }

    pub(super) fn extend_json(&self, json: &mut Vec<Value>) {
        json.extend(self.items.iter().map(PortionItem::to_json));
    }

    pub(super) fn to_json(&self) -> Vec<Value> {
        let mut json = Vec::with_capacity(self.items.len());
        pad_json(&mut json, self.start);
        self.extend_json(&mut json);
        json
    }
}

/// Pad `json` with `null` up to `len` elements.
pub(super) fn pad_json(json: &mut Vec<Value>, len: u64) {
    let len = usize::try_from(len).unwrap_or(usize::MAX);
    if json.len() < len {
        json.resize(len, Value::Null);
    }
}
