//! Fetched data of a resource.

use std::sync::Arc;

use serde_json::Value;

use crate::{
    data_slice::DataSlice,
    dimension::Dimension,
    portion_of_data::{PortionOfData, PortionOfDataError},
};

/// The fetched data of a resource together with its dimension.
///
/// The dimension is immutable and may be shared, while the portion of data is owned and grows with every merged batch.
#[derive(Debug, Clone)]
pub struct NDimData {
    resource_id: String,
    dimension: Arc<Dimension>,
    pod: PortionOfData,
}

impl NDimData {
    /// Create a new n-dimensional data.
    #[must_use]
    pub fn new(resource_id: impl Into<String>, dimension: Arc<Dimension>, pod: PortionOfData) -> Self {
        Self {
            resource_id: resource_id.into(),
            dimension,
            pod,
        }
    }

    /// Create n-dimensional data from the first batch `data` fetched for `slice`.
    ///
    /// # Errors
    /// Returns a [`PortionOfDataError`] if `slice` does not match `dimension` or `data`.
    pub fn from_slices(
        resource_id: impl Into<String>,
        dimension: Arc<Dimension>,
        slice: &DataSlice,
        data: &Value,
    ) -> Result<Self, PortionOfDataError> {
        let pod = PortionOfData::from_slices(slice, &dimension, data)?;
        Ok(Self::new(resource_id, dimension, pod))
    }

    /// The resource id.
    #[must_use]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// The dimension.
    #[must_use]
    pub fn dimension(&self) -> &Arc<Dimension> {
        &self.dimension
    }

    /// The fetched data.
    #[must_use]
    pub fn pod(&self) -> &PortionOfData {
        &self.pod
    }

    /// Merge `data` fetched for `slice`, see [`PortionOfData::add_data`].
    ///
    /// # Errors
    /// Returns a [`PortionOfDataError`] if `slice` does not match the dimension, the fetched data, or `data`.
    pub fn add_data(&mut self, slice: &DataSlice, data: &Value) -> Result<(), PortionOfDataError> {
        self.pod.add_data(slice, &self.dimension, data)
    }
}
