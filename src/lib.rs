//! A rust library for sparse, lazily materialised windowing over heterogeneous N-dimensional resources.
//!
//! A resource (a table, a JSON document, an array file) is described by a [`Dimension`](dimension::Dimension) tree.
//! Clients never hold a whole resource: they request [`DataSlice`](data_slice::DataSlice)s sized by a [`CostModel`](config::CostModel), and merge the fetched batches into a [`PortionOfData`](portion_of_data::PortionOfData) that tracks which regions are known and whether the end of the data has been reached.
//! A [`DataView2D`](data_view::DataView2D) projects a data slice onto two paged axes and drives cell selection.
//!
//! ## Getting Started
//! - Describe a resource with [`Dimension::deserialize`](dimension::Dimension::deserialize).
//! - Mount it with [`NDimData::mount`](n_dim_data::NDimData::mount) against a [`ResourceFetcher`](fetch::ResourceFetcher), e.g. a [`MemoryResource`](fetch::MemoryResource).
//! - Fetch more with [`NDimData::fetch`](n_dim_data::NDimData::fetch) and read values with [`PortionOfData::get_data`](portion_of_data::PortionOfData::get_data).
//!
//! ## Example
//! ```rust
//! # use std::sync::Arc;
//! use ndwindow::{
//!     data_slice::DataSlice, dimension::Dimension, fetch::MemoryResource, index::IdGenerator,
//!     n_dim_data::NDimData,
//! };
//! use serde_json::json;
//!
//! let dimension = Arc::new(Dimension::deserialize(
//!     &json!({"type": "range", "range": [0, "inf"], "values": [null]}),
//!     &mut IdGenerator::new(),
//! )?);
//! let resource = MemoryResource::new("numbers", json!((0..15).collect::<Vec<_>>()));
//! let mut data = NDimData::mount(&resource, "numbers", dimension)?;
//! assert!(!data.pod().has_all_indices());
//!
//! let slice = DataSlice::deserialize(&json!({"type": "range", "range": [10, "inf"], "values": [null]}))?;
//! data.fetch(&resource, &slice)?;
//! assert!(data.pod().has_all_indices());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Features
//! #### Non-Default
//!  - `async`: an asynchronous fetch API, [`AsyncResourceFetcher`](fetch::AsyncResourceFetcher).
//!
//! ## Logging
//! `ndwindow` logs merge and resizing decisions through the [`log`] facade. No logger is installed by the library.

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
// #![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod alignment;
pub mod config;
pub mod data_slice;
pub mod data_view;
pub mod dimension;
pub mod errors;
pub mod fetch;
pub mod index;
pub mod location;
pub mod n_dim_data;
pub mod portion_of_data;
pub mod range_util;
pub mod slice;
pub mod variable;
