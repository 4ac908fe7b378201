//! The seam to the collaborator serving resource data.
//!
//! A fetcher receives a resource id and a [`DataSlice`] and answers with a [`FetchResponse`]: the data of the slice, and the slice actually served.
//! The served slice may be shorter than the one requested, which marks the end of the resource data.
//!
//! [`MemoryResource`] serves windows of a JSON document held in memory.

#[cfg(feature = "async")]
mod fetch_async;
mod memory_resource;

#[cfg(feature = "async")]
pub use fetch_async::AsyncResourceFetcher;
pub use memory_resource::MemoryResource;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    data_slice::{DataSlice, DataSliceError},
    dimension::Dimension,
    n_dim_data::NDimData,
    portion_of_data::PortionOfDataError,
};

/// A fetch error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    /// The resource is not known to the fetcher.
    #[error("unknown resource {0}")]
    UnknownResource(String),
    /// The fetcher failed to serve the resource.
    #[error("failed to fetch resource {resource_id}: {message}")]
    Resource {
        /// The resource id.
        resource_id: String,
        /// A description of the failure.
        message: String,
    },
    /// The data slice could not be serialized.
    #[error("failed to serialize data slice: {0}")]
    Serialization(String),
    /// The served data slice is invalid.
    #[error(transparent)]
    DataSlice(#[from] DataSliceError),
    /// The served data could not be merged.
    #[error(transparent)]
    PortionOfData(#[from] PortionOfDataError),
}

/// The answer of a fetcher: the data and the serialized data slice it was served for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    /// The fetched data, nested like the data slice.
    pub data: Value,
    /// The serialized data slice served.
    pub slice: Value,
}

impl FetchResponse {
    /// Create a response serving `data` for `slice`.
    ///
    /// # Errors
    /// Returns [`FetchError::Serialization`] if `slice` cannot be serialized.
    pub fn new(data: Value, slice: &DataSlice) -> Result<Self, FetchError> {
        let slice =
            serde_json::to_value(slice).map_err(|err| FetchError::Serialization(err.to_string()))?;
        Ok(Self { data, slice })
    }

    /// Deserialize the data slice served.
    ///
    /// # Errors
    /// Returns a [`DataSliceError`] if the served data slice is invalid.
    pub fn data_slice(&self) -> Result<DataSlice, DataSliceError> {
        DataSlice::deserialize(&self.slice)
    }
}

/// Synchronous resource fetching.
pub trait ResourceFetcher {
    /// Fetch the data of `slice` of resource `resource_id`.
    ///
    /// # Errors
    /// Returns a [`FetchError`] if the resource is unknown or cannot be served.
    fn fetch(&self, resource_id: &str, slice: &DataSlice) -> Result<FetchResponse, FetchError>;
}

impl NDimData {
    /// Mount resource `resource_id`: fetch its default window (see [`DataSlice::from_dimension`]) with `fetcher`.
    ///
    /// # Errors
    /// Returns a [`FetchError`] if the fetch fails or the fetched data does not match `dimension`.
    pub fn mount<TFetcher: ResourceFetcher + ?Sized>(
        fetcher: &TFetcher,
        resource_id: impl Into<String>,
        dimension: Arc<Dimension>,
    ) -> Result<Self, FetchError> {
        let resource_id = resource_id.into();
        let slice = DataSlice::from_dimension(&dimension)?;
        let response = fetcher.fetch(&resource_id, &slice)?;
        let slice = response.data_slice()?;
        log::debug!("mounted resource {resource_id}");
        Ok(Self::from_slices(resource_id, dimension, &slice, &response.data)?)
    }

    /// Fetch `slice` with `fetcher` and merge the served data.
    ///
    /// # Errors
    /// Returns a [`FetchError`] if the fetch fails or the served data does not match.
    pub fn fetch<TFetcher: ResourceFetcher + ?Sized>(
        &mut self,
        fetcher: &TFetcher,
        slice: &DataSlice,
    ) -> Result<(), FetchError> {
        let response = fetcher.fetch(self.resource_id(), slice)?;
        self.merge_response(&response)
    }

    /// Merge a [`FetchResponse`].
    ///
    /// Responses must be merged in the order their fetches were issued.
    ///
    /// # Errors
    /// Returns a [`FetchError`] if the served data slice is invalid or the served data does not match.
    pub fn merge_response(&mut self, response: &FetchResponse) -> Result<(), FetchError> {
        let slice = response.data_slice()?;
        Ok(self.add_data(&slice, &response.data)?)
    }
}
