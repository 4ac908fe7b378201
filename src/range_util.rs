//! Helpers for bucketed ranges.
//!
//! A bucketed range is a non-decreasing list of boundaries `range` paired with `values`, where `values[i]` belongs to the half-open bucket `[range[i], range[i + 1])`.

use serde_json::Value;
use thiserror::Error;

use crate::index::UNBOUNDED;

/// A bucketed range error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeUtilError {
    /// The number of boundaries is not one more than the number of values.
    #[error("a range with {0} boundaries cannot hold {1} values")]
    InvalidLength(usize, usize),
    /// The boundaries decrease.
    #[error("range boundaries {0:?} are not monotonic")]
    NonMonotonic(Vec<u64>),
    /// The start is outside of the range.
    #[error("invalid start {start} for range {first}..{last}")]
    InvalidStart {
        /// The requested start.
        start: u64,
        /// The first boundary.
        first: u64,
        /// The last boundary.
        last: u64,
    },
}

/// Returns the index of the bucket containing `idx`, or [`None`] if `idx` is outside of `range`.
///
/// Empty buckets never contain an index.
#[must_use]
pub fn bucket_index(range: &[u64], idx: u64) -> Option<usize> {
    let (first, last) = (*range.first()?, *range.last()?);
    if idx < first || idx >= last {
        return None;
    }
    Some(range.partition_point(|&boundary| boundary <= idx) - 1)
}

/// Format a boundary, writing [`UNBOUNDED`] as `inf`.
#[must_use]
pub fn format_boundary(boundary: u64) -> String {
    if boundary == UNBOUNDED {
        "inf".to_string()
    } else {
        boundary.to_string()
    }
}

pub(crate) fn boundary_to_json(boundary: u64) -> Value {
    if boundary == UNBOUNDED {
        Value::String("inf".to_string())
    } else {
        Value::from(boundary)
    }
}

/// Parse a boundary from a non-negative integer or `"inf"`.
pub(crate) fn boundary_from_json(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(string) if string == "inf" || string == "Infinity" => Some(UNBOUNDED),
        _ => None,
    }
}

/// A bucketed range and its values.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeUtil<T> {
    range: Vec<u64>,
    values: Vec<T>,
}

impl<T: Clone> RangeUtil<T> {
    /// Create a new bucketed range.
    ///
    /// # Errors
    /// Returns [`RangeUtilError`] if the lengths do not match or the boundaries are not monotonic.
    pub fn new(range: Vec<u64>, values: Vec<T>) -> Result<Self, RangeUtilError> {
        let range_util = Self { range, values };
        range_util.validate()?;
        Ok(range_util)
    }

    /// Validate the bucketed range.
    ///
    /// # Errors
    /// Returns [`RangeUtilError`] if the lengths do not match or the boundaries are not monotonic.
    pub fn validate(&self) -> Result<(), RangeUtilError> {
        if self.range.len() != self.values.len() + 1 {
            return Err(RangeUtilError::InvalidLength(
                self.range.len(),
                self.values.len(),
            ));
        }
        if self.range.windows(2).any(|w| w[0] > w[1]) {
            return Err(RangeUtilError::NonMonotonic(self.range.clone()));
        }
        Ok(())
    }

    /// The boundaries.
    #[must_use]
    pub fn range(&self) -> &[u64] {
        &self.range
    }

    /// The bucket values.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Consume and return the boundaries and values.
    #[must_use]
    pub fn into_parts(self) -> (Vec<u64>, Vec<T>) {
        (self.range, self.values)
    }

    fn first(&self) -> u64 {
        self.range.first().copied().unwrap_or_default()
    }

    fn last(&self) -> u64 {
        self.range.last().copied().unwrap_or_default()
    }

    /// Return a new bucketed range starting at `start` and covering at most `size` elements.
    ///
    /// The values of every bucket overlapping the new range are kept.
    /// An empty range is returned unchanged when `start` is its only boundary.
    ///
    /// # Errors
    /// Returns [`RangeUtilError::InvalidStart`] if `start` is before the first boundary or not before the last boundary.
    pub fn change_range(&self, start: u64, size: u64) -> Result<Self, RangeUtilError> {
        let (first, last) = (self.first(), self.last());
        if first == last && start == first && !self.values.is_empty() {
            return Ok(Self {
                range: vec![start, start],
                values: vec![self.values[0].clone()],
            });
        }
        let Some(mut idx) = bucket_index(&self.range, start) else {
            return Err(RangeUtilError::InvalidStart { start, first, last });
        };
        let size = size.min(last - start);
        let end = start + size;

        let mut range = vec![start];
        let mut values = vec![self.values[idx].clone()];
        idx += 1;
        while idx < self.range.len() {
            if self.range[idx] >= end {
                range.push(end);
                break;
            }
            range.push(self.range[idx]);
            values.push(self.values[idx].clone());
            idx += 1;
        }
        Ok(Self { range, values })
    }

    /// Merge adjacent buckets whose values are `equivalent`.
    #[must_use]
    pub fn optimize_by(self, equivalent: impl Fn(&T, &T) -> bool) -> Self {
        let last = self.last();
        let mut range = Vec::with_capacity(self.range.len());
        let mut values: Vec<T> = Vec::with_capacity(self.values.len());
        for (boundary, value) in self.range.into_iter().zip(self.values) {
            if values.last().is_some_and(|previous| equivalent(previous, &value)) {
                continue;
            }
            range.push(boundary);
            values.push(value);
        }
        range.push(last);
        Self { range, values }
    }
}

impl<T: Clone + PartialEq> RangeUtil<T> {
    /// Merge adjacent buckets with equal values.
    #[must_use]
    pub fn optimize(self) -> Self {
        self.optimize_by(PartialEq::eq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> RangeUtil<char> {
        RangeUtil::new(vec![5, 7, 19], vec!['a', 'b']).unwrap()
    }

    #[test]
    fn range_util_validate() {
        assert_eq!(
            RangeUtil::new(vec![5, 7], vec!['a', 'b']).unwrap_err(),
            RangeUtilError::InvalidLength(2, 2)
        );
        assert!(RangeUtil::new(vec![5, 3], vec!['a']).is_err());
        assert!(RangeUtil::new(vec![5, 5], vec!['a']).is_ok());
    }

    #[test]
    fn range_util_change_range() {
        let range_util = abc().change_range(6, 10).unwrap();
        assert_eq!(range_util.range(), &[6, 7, 16]);
        assert_eq!(range_util.values(), &['a', 'b']);

        let range_util = abc().change_range(6, 13).unwrap();
        assert_eq!(range_util.range(), &[6, 7, 19]);
        let range_util = abc().change_range(6, 15).unwrap();
        assert_eq!(range_util.range(), &[6, 7, 19]);
        assert_eq!(range_util.values(), &['a', 'b']);

        let range_util = abc().change_range(8, 1).unwrap();
        assert_eq!(range_util.range(), &[8, 9]);
        assert_eq!(range_util.values(), &['b']);

        assert_eq!(
            abc().change_range(3, 10).unwrap_err().to_string(),
            "invalid start 3 for range 5..19"
        );
        assert!(abc().change_range(20, 10).is_err());
        assert!(abc().change_range(19, 10).is_err());
    }

    #[test]
    fn range_util_change_range_unbounded() {
        let range_util = RangeUtil::new(vec![0, UNBOUNDED], vec![()]).unwrap();
        let changed = range_util.change_range(10, 20).unwrap();
        assert_eq!(changed.range(), &[10, 30]);
    }

    #[test]
    fn range_util_change_range_empty() {
        let range_util = RangeUtil::new(vec![0, 0], vec!['a']).unwrap();
        assert_eq!(range_util.change_range(0, 10).unwrap().range(), &[0, 0]);
    }

    #[test]
    fn range_util_optimize() {
        let range_util = RangeUtil::new(vec![5, 7, 9, 19], vec!['a', 'b', 'b'])
            .unwrap()
            .optimize();
        assert_eq!(range_util.range(), &[5, 7, 19]);
        assert_eq!(range_util.values(), &['a', 'b']);

        let range_util = RangeUtil::new(vec![5, 6, 7, 9, 13, 19], vec!['a', 'a', 'b', 'b', 'c'])
            .unwrap()
            .optimize();
        assert_eq!(range_util.range(), &[5, 7, 13, 19]);
        assert_eq!(range_util.values(), &['a', 'b', 'c']);
    }

    #[test]
    fn bucket_index_lookup() {
        let range = [0, 10, 10, 100];
        assert_eq!(bucket_index(&range, 0), Some(0));
        assert_eq!(bucket_index(&range, 9), Some(0));
        assert_eq!(bucket_index(&range, 10), Some(2));
        assert_eq!(bucket_index(&range, 100), None);
        assert_eq!(bucket_index(&[5, 8], 4), None);
    }

    #[test]
    fn boundary_json() {
        assert_eq!(boundary_from_json(&Value::from(3)), Some(3));
        assert_eq!(boundary_from_json(&Value::from("inf")), Some(UNBOUNDED));
        assert_eq!(boundary_from_json(&Value::from(-1)), None);
        assert_eq!(boundary_from_json(&Value::from("x")), None);
        assert_eq!(boundary_to_json(UNBOUNDED), Value::from("inf"));
        assert_eq!(format_boundary(4), "4");
    }
}
