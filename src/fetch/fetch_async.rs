use std::sync::Arc;

use crate::{data_slice::DataSlice, dimension::Dimension, n_dim_data::NDimData};

use super::{FetchError, FetchResponse, MemoryResource, ResourceFetcher};

/// Asynchronous resource fetching.
#[async_trait::async_trait]
pub trait AsyncResourceFetcher: Send + Sync {
    /// Fetch the data of `slice` of resource `resource_id`.
    ///
    /// # Errors
    /// Returns a [`FetchError`] if the resource is unknown or cannot be served.
    async fn fetch(
        &self,
        resource_id: &str,
        slice: &DataSlice,
    ) -> Result<FetchResponse, FetchError>;
}

#[async_trait::async_trait]
impl AsyncResourceFetcher for MemoryResource {
    async fn fetch(
        &self,
        resource_id: &str,
        slice: &DataSlice,
    ) -> Result<FetchResponse, FetchError> {
        ResourceFetcher::fetch(self, resource_id, slice)
    }
}

impl NDimData {
    /// Asynchronously mount resource `resource_id`, see [`NDimData::mount`].
    ///
    /// # Errors
    /// Returns a [`FetchError`] if the fetch fails or the fetched data does not match `dimension`.
    pub async fn async_mount<TFetcher: AsyncResourceFetcher + ?Sized>(
        fetcher: &TFetcher,
        resource_id: impl Into<String>,
        dimension: Arc<Dimension>,
    ) -> Result<Self, FetchError> {
        let resource_id = resource_id.into();
        let slice = DataSlice::from_dimension(&dimension)?;
        let response = fetcher.fetch(&resource_id, &slice).await?;
        let slice = response.data_slice()?;
        Ok(Self::from_slices(resource_id, dimension, &slice, &response.data)?)
    }

    /// Asynchronously fetch `slice` with `fetcher` and merge the served data, see [`NDimData::fetch`].
    ///
    /// # Errors
    /// Returns a [`FetchError`] if the fetch fails or the served data does not match.
    pub async fn async_fetch<TFetcher: AsyncResourceFetcher + ?Sized>(
        &mut self,
        fetcher: &TFetcher,
        slice: &DataSlice,
    ) -> Result<(), FetchError> {
        let response = fetcher.fetch(self.resource_id(), slice).await?;
        self.merge_response(&response)
    }
}
