//! Alignments between variables.
//!
//! A [`ValueAlignment`] pairs two variables whose values coincide, and a [`DimensionAlignment`] pairs dimensions of two variables.
//! Both are identified by an id derived from their content.

use derive_more::From;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::variable::Variable;

/// An alignment between a source and a target variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, From)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Alignment {
    /// A value alignment.
    Value(ValueAlignment),
    /// A dimension alignment.
    Dimension(DimensionAlignment),
}

impl Alignment {
    /// The alignment id.
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            Self::Value(alignment) => alignment.id(),
            Self::Dimension(alignment) => alignment.id(),
        }
    }

    /// The source variable id.
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Value(alignment) => &alignment.source,
            Self::Dimension(alignment) => &alignment.source,
        }
    }

    /// The target variable id.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Value(alignment) => &alignment.target,
            Self::Dimension(alignment) => &alignment.target,
        }
    }
}

/// Aligns the values of the source variable with the values of the target variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueAlignment {
    /// The source variable id.
    pub source: String,
    /// The target variable id.
    pub target: String,
}

impl ValueAlignment {
    /// Create a new value alignment.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// The alignment id, `value:{source}---{target}`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("value:{}---{}", self.source, self.target)
    }
}

/// A pair of aligned dimensions, given as positions of the unbound slices of each variable location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlignedDimension {
    /// The position in the source variable.
    pub source: usize,
    /// The position in the target variable.
    pub target: usize,
}

/// Aligns dimensions of the source variable with dimensions of the target variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimensionAlignment {
    /// The source variable id.
    pub source: String,
    /// The target variable id.
    pub target: String,
    /// The aligned dimensions.
    pub aligned_dims: Vec<AlignedDimension>,
}

impl DimensionAlignment {
    /// Create a new dimension alignment.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        aligned_dims: Vec<AlignedDimension>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            aligned_dims,
        }
    }

    /// Align dimension `source` of the source variable with dimension `target` of the target variable.
    pub fn add_aligned_dimension(&mut self, source: usize, target: usize) {
        self.aligned_dims.push(AlignedDimension { source, target });
    }

    /// The alignment id, `index:{source}---{target}---{s0-t0,s1-t1,...}`.
    #[must_use]
    pub fn id(&self) -> String {
        format!(
            "index:{}---{}---{}",
            self.source,
            self.target,
            self.aligned_dims
                .iter()
                .map(|dim| format!("{}-{}", dim.source, dim.target))
                .join(",")
        )
    }

    /// Returns true if the alignment refers to `source` and `target` and every aligned position is an unbound slice of their locations.
    #[must_use]
    pub fn validate(&self, source: &Variable, target: &Variable) -> bool {
        let n_unbound = |variable: &Variable| {
            variable
                .location
                .slices()
                .iter()
                .filter(|slice| !slice.is_select_one())
                .count()
        };
        let (n_source, n_target) = (n_unbound(source), n_unbound(target));
        source.id == self.source
            && target.id == self.target
            && self
                .aligned_dims
                .iter()
                .all(|dim| dim.source < n_source && dim.target < n_target)
    }
}
