//! Locations of variables within resources.
//!
//! A [`Location`] is a resource id and a list of [`Slice`]s, one per level of the resource [`Dimension`].
//! Its layout string joins the slices with `:`, e.g. `0..3:artists:0..25:name`.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    dimension::Dimension,
    index::{Index, UNBOUNDED},
    slice::{IndexSlice, RangeSlice, Slice},
};

static SLICE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let token = r"(\d+|\$\{[^}]+\})";
    Regex::new(&format!(r"^(?:{token}?\.\.{token}?(?:;{token})?|{token})$"))
        .unwrap_or_else(|_| unreachable!())
});

/// A location parse error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationParseError {
    /// A range bound is a template placeholder.
    #[error("template placeholder in range slice {0} is not supported")]
    TemplateInRange(String),
    /// A number does not fit in a coordinate.
    #[error("invalid number in slice {0}")]
    InvalidNumber(String),
    /// A range step is zero.
    #[error("zero step in slice {0}")]
    ZeroStep(String),
    /// A serialized slice is malformed.
    #[error("invalid serialized slice: {0}")]
    InvalidSerializedSlice(String),
}

/// The location of a variable within a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    resource_id: String,
    slices: Vec<Slice>,
}

impl Location {
    /// Create a new location.
    #[must_use]
    pub fn new(resource_id: impl Into<String>, slices: Vec<Slice>) -> Self {
        Self {
            resource_id: resource_id.into(),
            slices,
        }
    }

    /// Parse a location from a layout string such as `0..3:artists:0..25:name`.
    ///
    /// Tokens of the form `start..end;step` (each part optional) are range slices, with a default start of zero, an unbounded end and a step of one.
    /// A bare integer is a numeric index slice, and anything else (including a template `${...}`) is a key index slice.
    ///
    /// # Errors
    /// Returns a [`LocationParseError`] if a range slice contains a template placeholder, a number overflows, or a step is zero.
    pub fn from_string(resource_id: impl Into<String>, layout: &str) -> Result<Self, LocationParseError> {
        let slices = layout
            .split(':')
            .map(parse_slice)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(resource_id, slices))
    }

    /// Create a location from serialized slices, e.g. `[{"type": "range", "start": 0, "end": null, "step": 1}]`.
    ///
    /// # Errors
    /// Returns [`LocationParseError::InvalidSerializedSlice`] if a slice is malformed.
    pub fn from_serialized_slices(
        resource_id: impl Into<String>,
        slices: &[Value],
    ) -> Result<Self, LocationParseError> {
        let slices = slices
            .iter()
            .map(|slice| {
                Slice::deserialize(slice)
                    .map_err(|err| LocationParseError::InvalidSerializedSlice(err.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(resource_id, slices))
    }

    /// The resource id.
    #[must_use]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// The slices, one per level.
    #[must_use]
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    /// Consume the location and return its slices.
    #[must_use]
    pub fn into_slices(self) -> Vec<Slice> {
        self.slices
    }

    /// Format the location, prefixed by `resource_id@` unless `without_resource_id` is true.
    #[must_use]
    pub fn to_string(&self, without_resource_id: bool) -> String {
        let layout = self.slices.iter().join(":");
        if without_resource_id {
            layout
        } else {
            format!("{}@{layout}", self.resource_id)
        }
    }

    /// Returns true if the slices consume every level of `dimension` exactly.
    #[must_use]
    pub fn validate(&self, dimension: &Dimension) -> bool {
        validate_slices(0, &self.slices, dimension)
    }
}

fn parse_number(number: &str, token: &str) -> Result<u64, LocationParseError> {
    if number.starts_with('$') {
        return Err(LocationParseError::TemplateInRange(token.to_string()));
    }
    number
        .parse()
        .map_err(|_| LocationParseError::InvalidNumber(token.to_string()))
}

fn parse_slice(token: &str) -> Result<Slice, LocationParseError> {
    let Some(captures) = SLICE_REGEX.captures(token) else {
        return Ok(Slice::Index(IndexSlice::new(token)));
    };
    if let Some(index) = captures.get(4) {
        let index = index.as_str();
        return Ok(Slice::Index(if index.starts_with('$') {
            IndexSlice::new(index)
        } else {
            IndexSlice::new(parse_number(index, token)?)
        }));
    }
    let start = captures
        .get(1)
        .map_or(Ok(0), |start| parse_number(start.as_str(), token))?;
    let end = captures
        .get(2)
        .map_or(Ok(UNBOUNDED), |end| parse_number(end.as_str(), token))?;
    let step = captures
        .get(3)
        .map_or(Ok(1), |step| parse_number(step.as_str(), token))?;
    if step == 0 {
        return Err(LocationParseError::ZeroStep(token.to_string()));
    }
    Ok(Slice::Range(RangeSlice::new_with_step(start, end, step)))
}

fn validate_sub_dimension(
    slice_idx: usize,
    slices: &[Slice],
    sub_dimension: Option<Option<&Dimension>>,
) -> bool {
    match sub_dimension {
        None => false,
        Some(None) => slice_idx + 1 == slices.len(),
        Some(Some(sub_dimension)) => validate_slices(slice_idx + 1, slices, sub_dimension),
    }
}

fn validate_slices(slice_idx: usize, slices: &[Slice], dimension: &Dimension) -> bool {
    let Some(slice) = slices.get(slice_idx) else {
        // ran out of slices before reaching a leaf
        return false;
    };
    match (slice, dimension) {
        (Slice::Range(slice), Dimension::Range(dimension)) => {
            let (Some(start), Some(end)) = (slice.start(), slice.end()) else {
                return false;
            };
            if start < dimension.start() || (end != UNBOUNDED && end > dimension.end()) {
                return false;
            }
            let range = dimension.range();
            let n_buckets = dimension.values().len();
            let first_bucket = if start < dimension.end() {
                range.partition_point(|&boundary| boundary <= start) - 1
            } else if start == end {
                // empty slice at the last boundary
                n_buckets.saturating_sub(1)
            } else {
                return false;
            };
            for bucket in first_bucket..n_buckets {
                let sub_dimension = dimension.values()[bucket].as_ref();
                if !validate_sub_dimension(slice_idx, slices, Some(sub_dimension)) {
                    return false;
                }
                if range[bucket + 1] >= end {
                    break;
                }
            }
            true
        }
        (Slice::Range(_), Dimension::Index(_)) => false,
        (Slice::Index(slice), dimension) => {
            let Some(index) = slice.index() else {
                return false;
            };
            if dimension.is_range() && !matches!(index, Index::Number(_)) {
                return false;
            }
            validate_sub_dimension(slice_idx, slices, dimension.get(index))
        }
    }
}
