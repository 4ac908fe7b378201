use serde_json::{Map, Value};

use crate::data_slice::DataSlice;

use super::{FetchError, FetchResponse, ResourceFetcher};

/// A resource held in memory as a JSON document.
///
/// Range levels of a data slice select elements of arrays, and index levels select entries of objects.
/// Windows past the end of an array are clamped, so the served data is shorter than the requested slice.
#[derive(Debug, Clone)]
pub struct MemoryResource {
    resource_id: String,
    data: Value,
}

impl MemoryResource {
    /// Create a new memory resource.
    #[must_use]
    pub fn new(resource_id: impl Into<String>, data: Value) -> Self {
        Self {
            resource_id: resource_id.into(),
            data,
        }
    }

    /// The resource id.
    #[must_use]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// The whole document.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Extract the window of `slice` from the document.
    ///
    /// # Errors
    /// Returns [`FetchError::Resource`] if the document does not have the shape of `slice`.
    pub fn window(&self, slice: &DataSlice) -> Result<Value, FetchError> {
        self.window_of(&self.data, slice)
    }

    fn error(&self, message: String) -> FetchError {
        FetchError::Resource {
            resource_id: self.resource_id.clone(),
            message,
        }
    }

    fn window_of(&self, data: &Value, slice: &DataSlice) -> Result<Value, FetchError> {
        match slice {
            DataSlice::Range(slice) => {
                let array = data
                    .as_array()
                    .ok_or_else(|| self.error(format!("data slice {} expects an array", slice.id())))?;
                let start = usize::try_from(slice.start()).unwrap_or(usize::MAX);
                let end = usize::try_from(slice.end()).unwrap_or(usize::MAX);
                let window = array
                    .iter()
                    .enumerate()
                    .take(end.min(array.len()))
                    .skip(start)
                    .map(|(idx, value)| match slice.get_value(idx as u64).flatten() {
                        Some(sub_slice) => self.window_of(value, sub_slice),
                        None => Ok(value.clone()),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(window))
            }
            DataSlice::Index(slice) => {
                let object = data
                    .as_object()
                    .ok_or_else(|| self.error(format!("data slice {} expects an object", slice.id())))?;
                let mut window = Map::new();
                for (idx, sub_slice) in slice.iter() {
                    let key = idx.as_key();
                    let value = object
                        .get(key.as_ref())
                        .ok_or_else(|| self.error(format!("missing key {key}")))?;
                    let value = match sub_slice {
                        Some(sub_slice) => self.window_of(value, sub_slice)?,
                        None => value.clone(),
                    };
                    window.insert(key.into_owned(), value);
                }
                Ok(Value::Object(window))
            }
        }
    }
}

impl ResourceFetcher for MemoryResource {
    fn fetch(&self, resource_id: &str, slice: &DataSlice) -> Result<FetchResponse, FetchError> {
        if resource_id != self.resource_id {
            return Err(FetchError::UnknownResource(resource_id.to_string()));
        }
        log::debug!("serving data slice {} of resource {resource_id}", slice.id());
        FetchResponse::new(self.window(slice)?, slice)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn memory_resource_window() {
        let resource = MemoryResource::new(
            "r",
            json!([{"a": [1, 2, 3], "b": 0}, {"a": [4, 5, 6], "b": 1}, {"a": [7, 8, 9], "b": 2}]),
        );
        let slice = DataSlice::deserialize(&json!({
            "type": "range",
            "range": [1, 5],
            "values": [{
                "type": "index",
                "index2slice": [["a", {"type": "range", "range": [0, 2], "values": [null]}]]
            }]
        }))
        .unwrap();
        assert_eq!(
            resource.window(&slice).unwrap(),
            json!([{"a": [4, 5]}, {"a": [7, 8]}])
        );
        let response = resource.fetch("r", &slice).unwrap();
        assert!(response.data_slice().unwrap().is_equivalent(&slice));
        assert_eq!(
            resource.fetch("s", &slice),
            Err(FetchError::UnknownResource("s".to_string()))
        );
    }
}
