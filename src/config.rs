//! Global configuration options.

use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The fixed-cost model bounding how many elements a [`DataSlice`](crate::data_slice::DataSlice) may select.
///
/// The number of elements selected along any root-to-leaf path is at most [`max_n_elements`](CostModel::max_n_elements).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostModel {
    max_n_elements: u64,
    max_elements_per_range_dim: u64,
    max_elements_per_nested_range_dim: u64,
    max_elements_per_index_dim: u64,
}

impl CostModel {
    /// Create a new cost model.
    #[must_use]
    pub fn new(
        max_n_elements: u64,
        max_elements_per_range_dim: u64,
        max_elements_per_nested_range_dim: u64,
        max_elements_per_index_dim: u64,
    ) -> Self {
        Self {
            max_n_elements,
            max_elements_per_range_dim,
            max_elements_per_nested_range_dim,
            max_elements_per_index_dim,
        }
    }

    /// The cost model of the default fetch window of a resource.
    #[must_use]
    pub fn fetch_window() -> Self {
        Self::new(2000, 10, 20, 30)
    }

    /// The cost model used to resize a selection made from slices.
    #[must_use]
    pub fn selection_window() -> Self {
        Self::new(1000, 10, 10, 20)
    }

    /// The maximum number of elements along any root-to-leaf path.
    #[must_use]
    pub fn max_n_elements(&self) -> u64 {
        self.max_n_elements
    }

    /// The maximum number of elements of the first range level.
    #[must_use]
    pub fn max_elements_per_range_dim(&self) -> u64 {
        self.max_elements_per_range_dim
    }

    /// The maximum number of elements of a range level nested below another range level.
    #[must_use]
    pub fn max_elements_per_nested_range_dim(&self) -> u64 {
        self.max_elements_per_nested_range_dim
    }

    /// The maximum number of keys of an index level.
    #[must_use]
    pub fn max_elements_per_index_dim(&self) -> u64 {
        self.max_elements_per_index_dim
    }
}

/// Global configuration options for the ndwindow crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
///
/// ## Fetch Window
/// > default: [`CostModel::fetch_window`]`()`, 2000 elements, 10 rows, 20 columns and 30 keys
///
/// The cost model applied by [`DataSlice::from_dimension`](crate::data_slice::DataSlice::from_dimension).
///
/// ## Selection Window
/// > default: [`CostModel::selection_window`]`()`, 1000 elements, 10 per range level and 20 keys
///
/// The cost model applied by [`DataSlice::from_slices`](crate::data_slice::DataSlice::from_slices).
#[derive(Debug)]
pub struct Config {
    fetch_window: CostModel,
    selection_window: CostModel,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            fetch_window: CostModel::fetch_window(),
            selection_window: CostModel::selection_window(),
        }
    }
}

impl Config {
    /// Get the [fetch window](#fetch-window) configuration.
    #[must_use]
    pub fn fetch_window(&self) -> CostModel {
        self.fetch_window
    }

    /// Set the [fetch window](#fetch-window) configuration.
    pub fn set_fetch_window(&mut self, cost_model: CostModel) {
        self.fetch_window = cost_model;
    }

    /// Get the [selection window](#selection-window) configuration.
    #[must_use]
    pub fn selection_window(&self) -> CostModel {
        self.selection_window
    }

    /// Set the [selection window](#selection-window) configuration.
    pub fn set_selection_window(&mut self, cost_model: CostModel) {
        self.selection_window = cost_model;
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global ndwindow configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .read()
        .unwrap()
}

/// Returns a mutable reference to the global ndwindow configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .write()
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_selection_window() {
        assert_eq!(
            global_config().selection_window(),
            CostModel::selection_window()
        );
        global_config_mut().set_selection_window(CostModel::new(100, 5, 5, 5));
        assert_eq!(global_config().selection_window().max_elements_per_index_dim(), 5);
        global_config_mut().set_selection_window(CostModel::selection_window());
    }

    #[test]
    fn cost_model_defaults() {
        let cost_model = CostModel::fetch_window();
        assert_eq!(cost_model.max_n_elements(), 2000);
        assert_eq!(cost_model.max_elements_per_range_dim(), 10);
        assert_eq!(cost_model.max_elements_per_nested_range_dim(), 20);
        assert_eq!(cost_model.max_elements_per_index_dim(), 30);
    }
}
