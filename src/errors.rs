//! Errors shared across the windowing engine.

use thiserror::Error;

/// A slice is incompatible with the shape of a dimension.
///
/// Callers typically respond by refetching the whole window.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("incompatible slice: {_0}")]
pub struct IncompatibleSliceError(String);

impl IncompatibleSliceError {
    /// Create a new incompatible slice error.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self(description.into())
    }
}

/// An internal invariant was broken.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("internal invariant broken: {_0}")]
pub struct InvariantError(String);

impl InvariantError {
    /// Create a new invariant error, logging it at error level.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        let description = description.into();
        log::error!("internal invariant broken: {description}");
        Self(description)
    }
}

/// An operation is not supported for the given shape.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unsupported: {_0}")]
pub struct UnsupportedError(String);

impl UnsupportedError {
    /// Create a new unsupported error.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self(description.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            IncompatibleSliceError::new("expected a range slice").to_string(),
            "incompatible slice: expected a range slice"
        );
        assert_eq!(
            InvariantError::new("array portion does not start at zero").to_string(),
            "internal invariant broken: array portion does not start at zero"
        );
        assert_eq!(
            UnsupportedError::new("multiple buckets").to_string(),
            "unsupported: multiple buckets"
        );
    }
}
