//! Variables: named slices of resources.
//!
//! A [`Variable`] persists a [`Location`] together with value metadata used when the variable is aligned and modelled.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{dimension::Dimension, location::Location};

/// The sort order of the values of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sorted {
    /// Values are sorted in ascending order.
    #[display("ascending")]
    Ascending,
    /// Values are sorted in descending order.
    #[display("descending")]
    Descending,
    /// Values are not sorted.
    #[default]
    #[display("none")]
    None,
}

/// The type of the values of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
pub enum VariableType {
    /// The type is not specified.
    #[default]
    #[serde(rename = "unspecified")]
    #[display("unspecified")]
    Unspecified,
    /// A string.
    #[serde(rename = "string")]
    #[display("string")]
    String,
    /// An integer.
    #[serde(rename = "int")]
    #[display("int")]
    Int,
    /// A floating point number.
    #[serde(rename = "float")]
    #[display("float")]
    Float,
    /// A list of integers.
    #[serde(rename = "list[int]")]
    #[display("list[int]")]
    ListInt,
    /// A list of strings.
    #[serde(rename = "list[string]")]
    #[display("list[string]")]
    ListString,
    /// A list of floating point numbers.
    #[serde(rename = "list[float]")]
    #[display("list[float]")]
    ListFloat,
}

/// A variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// The variable id.
    pub id: String,
    /// The sort order of the values.
    #[serde(default)]
    pub sorted: Sorted,
    /// The value type.
    #[serde(rename = "value_type", default)]
    pub variable_type: VariableType,
    /// Whether values are unique.
    #[serde(default)]
    pub unique: bool,
    /// Values treated as missing.
    #[serde(default)]
    pub missing_values: Vec<String>,
    /// The location of the variable.
    pub location: Location,
}

impl Variable {
    /// Create a new variable at `location` with unspecified value metadata.
    #[must_use]
    pub fn new(id: impl Into<String>, location: Location) -> Self {
        Self {
            id: id.into(),
            sorted: Sorted::default(),
            variable_type: VariableType::default(),
            unique: false,
            missing_values: Vec::new(),
            location,
        }
    }

    /// Returns true if `value` is one of the missing values of the variable.
    #[must_use]
    pub fn is_missing(&self, value: &str) -> bool {
        self.missing_values.iter().any(|missing| missing == value)
    }

    /// Returns true if the location of the variable is valid for `dimension`, see [`Location::validate`].
    #[must_use]
    pub fn validate(&self, dimension: &Dimension) -> bool {
        self.location.validate(dimension)
    }
}
