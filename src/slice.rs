//! Flat per-level selectors.
//!
//! A [`Slice`] selects part of a single level of a [`Dimension`](crate::dimension::Dimension).
//! A list of slices, one per level, forms a [`Location`](crate::location::Location).

use std::fmt::Display;

use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::index::{Index, UNBOUNDED};

/// A strided half-open range selector `start..end;step`.
///
/// A range slice may be unset, in which case it selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeSlice {
    bounds: Option<(u64, u64)>,
    step: u64,
}

impl Default for RangeSlice {
    fn default() -> Self {
        Self::unset()
    }
}

impl RangeSlice {
    /// Create a new range slice with a step of one.
    #[must_use]
    pub fn new(start: u64, end: u64) -> Self {
        Self::new_with_step(start, end, 1)
    }

    /// Create a new range slice.
    ///
    /// A zero `step` is treated as one.
    #[must_use]
    pub fn new_with_step(start: u64, end: u64, step: u64) -> Self {
        Self {
            bounds: Some((start, end)),
            step: step.max(1),
        }
    }

    /// Create an unset range slice.
    #[must_use]
    pub fn unset() -> Self {
        Self {
            bounds: None,
            step: 1,
        }
    }

    /// Returns true if the slice is unset.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.bounds.is_none()
    }

    /// The start, or [`None`] if unset.
    #[must_use]
    pub fn start(&self) -> Option<u64> {
        self.bounds.map(|(start, _)| start)
    }

    /// The exclusive end, or [`None`] if unset. May be [`UNBOUNDED`].
    #[must_use]
    pub fn end(&self) -> Option<u64> {
        self.bounds.map(|(_, end)| end)
    }

    /// The step.
    #[must_use]
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Set the start and end.
    pub fn set_bounds(&mut self, start: u64, end: u64) {
        self.bounds = Some((start, end));
    }

    /// Unset the slice.
    pub fn clear(&mut self) {
        self.bounds = None;
    }

    /// The number of selected elements, or [`None`] if the end is unbounded.
    #[must_use]
    pub fn n_elements(&self) -> Option<u64> {
        match self.bounds {
            None => Some(0),
            Some((_, UNBOUNDED)) => None,
            Some((start, end)) => Some(end.saturating_sub(start).div_ceil(self.step)),
        }
    }

    /// Returns true if the slice selects exactly one element.
    #[must_use]
    pub fn is_select_one(&self) -> bool {
        self.n_elements() == Some(1)
    }

    /// Returns true if `idx` is selected.
    #[must_use]
    pub fn is_selected(&self, idx: u64) -> bool {
        self.bounds
            .is_some_and(|(start, end)| start <= idx && idx < end && (idx - start) % self.step == 0)
    }

    /// Returns true if the half-open range `start..end` overlaps the slice bounds.
    #[must_use]
    pub fn is_range_overlapped(&self, start: u64, end: u64) -> bool {
        self.bounds
            .is_some_and(|(slice_start, slice_end)| end > slice_start && slice_end > start)
    }
}

impl Display for RangeSlice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some((start, end)) = self.bounds else {
            return write!(f, " ");
        };
        if end != UNBOUNDED && end == start.saturating_add(self.step) {
            return write!(f, "{start}");
        }
        let step = if self.step == 1 {
            String::new()
        } else {
            format!(";{}", self.step)
        };
        if end == UNBOUNDED {
            write!(f, "{start}..{step}")
        } else {
            write!(f, "{start}..{end}{step}")
        }
    }
}

/// A single index selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct IndexSlice {
    index: Option<Index>,
}

impl IndexSlice {
    /// Create a new index slice.
    #[must_use]
    pub fn new(index: impl Into<Index>) -> Self {
        Self {
            index: Some(index.into()),
        }
    }

    /// Create an unset index slice.
    #[must_use]
    pub fn unset() -> Self {
        Self { index: None }
    }

    /// Returns true if the slice is unset.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.index.is_none()
    }

    /// The selected index, or [`None`] if unset.
    #[must_use]
    pub fn index(&self) -> Option<&Index> {
        self.index.as_ref()
    }

    /// Set the selected index.
    pub fn set_index(&mut self, index: Index) {
        self.index = Some(index);
    }

    /// Unset the slice.
    pub fn clear(&mut self) {
        self.index = None;
    }

    /// Returns true if `idx` is selected.
    #[must_use]
    pub fn is_selected(&self, idx: &Index) -> bool {
        self.index.as_ref().is_some_and(|index| index.same_key(idx))
    }
}

impl Display for IndexSlice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.index {
            Some(index) => write!(f, "{index}"),
            None => write!(f, " "),
        }
    }
}

/// A selector over one level of a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::From)]
pub enum Slice {
    /// A range selector.
    Range(RangeSlice),
    /// An index selector.
    Index(IndexSlice),
}

impl Slice {
    /// Returns true if the slice is unset.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        match self {
            Self::Range(slice) => slice.is_unset(),
            Self::Index(slice) => slice.is_unset(),
        }
    }

    /// Returns true if the slice selects exactly one element.
    #[must_use]
    pub fn is_select_one(&self) -> bool {
        match self {
            Self::Range(slice) => slice.is_select_one(),
            Self::Index(_) => true,
        }
    }

    /// Returns true if `idx` is selected.
    #[must_use]
    pub fn is_selected(&self, idx: &Index) -> bool {
        match self {
            Self::Range(slice) => idx.as_number().is_some_and(|idx| slice.is_selected(idx)),
            Self::Index(slice) => slice.is_selected(idx),
        }
    }

    /// Returns an unset slice of the same kind.
    #[must_use]
    pub fn unset_like(&self) -> Self {
        match self {
            Self::Range(_) => Self::Range(RangeSlice::unset()),
            Self::Index(_) => Self::Index(IndexSlice::unset()),
        }
    }
}

impl Display for Slice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Range(slice) => slice.fmt(f),
            Self::Index(slice) => slice.fmt(f),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum SliceMetadata {
    Range {
        start: u64,
        end: Option<u64>,
        #[serde(default = "default_step")]
        step: u64,
    },
    Index {
        idx: Index,
    },
}

fn default_step() -> u64 {
    1
}

impl Serialize for Slice {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let metadata = match self {
            Self::Range(slice) => {
                let (start, end) = slice
                    .bounds
                    .ok_or_else(|| S::Error::custom("an unset range slice cannot be serialized"))?;
                SliceMetadata::Range {
                    start,
                    end: (end != UNBOUNDED).then_some(end),
                    step: slice.step,
                }
            }
            Self::Index(slice) => SliceMetadata::Index {
                idx: slice
                    .index
                    .clone()
                    .ok_or_else(|| S::Error::custom("an unset index slice cannot be serialized"))?,
            },
        };
        metadata.serialize(s)
    }
}

impl<'de> Deserialize<'de> for Slice {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        match SliceMetadata::deserialize(d)? {
            SliceMetadata::Range { start, end, step } => {
                if step == 0 {
                    return Err(D::Error::custom("a range slice step must be positive"));
                }
                Ok(Self::Range(RangeSlice::new_with_step(
                    start,
                    end.unwrap_or(UNBOUNDED),
                    step,
                )))
            }
            SliceMetadata::Index { idx } => Ok(Self::Index(IndexSlice::new(idx))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_slice_select() {
        let slice = RangeSlice::new_with_step(2, 9, 3);
        assert!(slice.is_selected(2));
        assert!(!slice.is_selected(3));
        assert!(slice.is_selected(8));
        assert!(!slice.is_selected(9));
        assert_eq!(slice.n_elements(), Some(3));
        assert!(!slice.is_select_one());
        assert!(RangeSlice::new(4, 5).is_select_one());
        assert!(RangeSlice::new_with_step(4, 6, 2).is_select_one());
        assert!(!RangeSlice::new(4, UNBOUNDED).is_select_one());
        assert!(!RangeSlice::unset().is_selected(0));
    }

    #[test]
    fn range_slice_overlap() {
        let slice = RangeSlice::new(5, 10);
        assert!(slice.is_range_overlapped(0, 6));
        assert!(slice.is_range_overlapped(9, 20));
        assert!(!slice.is_range_overlapped(0, 5));
        assert!(!slice.is_range_overlapped(10, 20));
        assert!(RangeSlice::new(5, UNBOUNDED).is_range_overlapped(100, 101));
    }

    #[test]
    fn slice_display() {
        assert_eq!(RangeSlice::unset().to_string(), " ");
        assert_eq!(RangeSlice::new(3, 4).to_string(), "3");
        assert_eq!(RangeSlice::new(3, 10).to_string(), "3..10");
        assert_eq!(RangeSlice::new_with_step(3, 10, 2).to_string(), "3..10;2");
        assert_eq!(RangeSlice::new(0, UNBOUNDED).to_string(), "0..");
        assert_eq!(RangeSlice::new_with_step(0, UNBOUNDED, 2).to_string(), "0..;2");
        let near_max = UNBOUNDED - 2;
        assert_eq!(
            RangeSlice::new_with_step(near_max, near_max + 1, 5).to_string(),
            format!("{near_max}..{};5", near_max + 1)
        );
        assert_eq!(IndexSlice::new("name").to_string(), "name");
        assert_eq!(IndexSlice::unset().to_string(), " ");
    }

    #[test]
    fn slice_serde() {
        let slices: Vec<Slice> = serde_json::from_str(
            r#"[{"type": "range", "start": 0, "end": null, "step": 1}, {"type": "index", "idx": "name"}, {"type": "range", "start": 2, "end": 5}]"#,
        )
        .unwrap();
        assert_eq!(
            slices,
            vec![
                Slice::Range(RangeSlice::new(0, UNBOUNDED)),
                Slice::Index(IndexSlice::new("name")),
                Slice::Range(RangeSlice::new(2, 5)),
            ]
        );
        assert_eq!(
            serde_json::to_value(&slices[0]).unwrap(),
            serde_json::json!({"type": "range", "start": 0, "end": null, "step": 1})
        );
        assert!(serde_json::to_value(Slice::Range(RangeSlice::unset())).is_err());
        assert!(serde_json::from_str::<Slice>(r#"{"type": "band"}"#).is_err());
    }
}
