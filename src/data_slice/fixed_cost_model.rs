//! Bounded windows over a dimension.
//!
//! Every level of a window is capped by the [`CostModel`]: the first range level by [`CostModel::max_elements_per_range_dim`], deeper range levels by [`CostModel::max_elements_per_nested_range_dim`] and index levels by [`CostModel::max_elements_per_index_dim`].
//! The product of the level sizes along any path is further capped by [`CostModel::max_n_elements`].

use crate::{
    config::{global_config, CostModel},
    dimension::Dimension,
    errors::IncompatibleSliceError,
    index::{IdGenerator, Index},
    range_util::RangeUtil,
    slice::Slice,
};

use super::{ContinuousRangeDataSlice, DataSlice, DataSliceError, IndexDataSlice};

#[derive(Debug, Clone, Copy)]
struct Caps<'a> {
    cost_model: &'a CostModel,
    range: u64,
    budget: u64,
}

impl<'a> Caps<'a> {
    fn new(cost_model: &'a CostModel) -> Self {
        Self {
            cost_model,
            range: cost_model.max_elements_per_range_dim(),
            budget: cost_model.max_n_elements(),
        }
    }

    fn range_size(&self) -> u64 {
        self.range.min(self.budget).max(1)
    }

    fn index_size(&self) -> u64 {
        self.cost_model
            .max_elements_per_index_dim()
            .min(self.budget)
            .max(1)
    }

    /// The caps of the levels below a range level of `n_elements`.
    fn below_range(&self, n_elements: u64) -> Self {
        Self {
            cost_model: self.cost_model,
            range: self.cost_model.max_elements_per_nested_range_dim(),
            budget: self.budget / n_elements.max(1),
        }
    }

    /// The caps of the levels below an index level of `n_elements`.
    fn below_index(&self, n_elements: u64) -> Self {
        Self {
            cost_model: self.cost_model,
            range: self.range,
            budget: self.budget / n_elements.max(1),
        }
    }
}

fn default_start(dimension: &Dimension) -> u64 {
    dimension.as_range().map_or(0, |dimension| dimension.start())
}

/// Select a bounded window of `dimension`, starting at `start` if it is a range dimension.
fn generate(
    start: u64,
    dimension: &Dimension,
    caps: Caps,
    id_generator: &mut IdGenerator,
) -> Result<DataSlice, DataSliceError> {
    match dimension {
        Dimension::Range(dimension) => {
            let id = format!("rds_{}", id_generator.next_id());
            let range_util = RangeUtil::new(
                dimension.range().to_vec(),
                dimension.values().iter().map(Option::as_ref).collect(),
            )?
            .change_range(start, caps.range_size())?;
            let (range, sub_dimensions) = range_util.into_parts();
            let below = caps.below_range(range[range.len() - 1] - range[0]);
            let values = sub_dimensions
                .into_iter()
                .map(|sub_dimension| {
                    sub_dimension
                        .map(|sub_dimension| {
                            generate(
                                default_start(sub_dimension),
                                sub_dimension,
                                below,
                                id_generator,
                            )
                        })
                        .transpose()
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DataSlice::Range(ContinuousRangeDataSlice::new(
                id, range, values,
            )?))
        }
        Dimension::Index(dimension) => {
            let id = format!("ids_{}", id_generator.next_id());
            let n_keys = usize::try_from(caps.index_size())
                .unwrap_or(usize::MAX)
                .min(dimension.len());
            let below = caps.below_index(n_keys as u64);
            let index2slice = dimension
                .entries()
                .take(n_keys)
                .map(|(key, sub_dimension)| {
                    let value = sub_dimension
                        .map(|sub_dimension| {
                            generate(
                                default_start(sub_dimension),
                                sub_dimension,
                                below,
                                id_generator,
                            )
                        })
                        .transpose()?;
                    Ok((Index::Key(key.to_string()), value))
                })
                .collect::<Result<Vec<_>, DataSliceError>>()?;
            Ok(DataSlice::Index(IndexDataSlice::new(id, index2slice)))
        }
    }
}

/// The exact data slice of `slices`, with one level per slice.
///
/// A numeric index slice over a range dimension becomes a single element range.
fn slices_to_data_slice(
    slices: &[Slice],
    dimension: Option<&Dimension>,
    id_generator: &mut IdGenerator,
) -> Result<Option<DataSlice>, IncompatibleSliceError> {
    let Some((slice, rest)) = slices.split_first() else {
        return Ok(None);
    };
    let (start, end) = match slice {
        Slice::Range(slice) => {
            let (Some(start), Some(end)) = (slice.start(), slice.end()) else {
                return Err(IncompatibleSliceError::new("unset range slice"));
            };
            (start, end)
        }
        Slice::Index(slice) => {
            let index = slice
                .index()
                .ok_or_else(|| IncompatibleSliceError::new("unset index slice"))?;
            match (index.as_number(), dimension) {
                (Some(number), Some(Dimension::Range(_))) => (number, number + 1),
                _ => {
                    let id = format!("ids_{}", id_generator.next_id());
                    let sub_dimension = dimension.and_then(|dimension| dimension.get(index)).flatten();
                    let value = slices_to_data_slice(rest, sub_dimension, id_generator)?;
                    return Ok(Some(DataSlice::Index(IndexDataSlice::new(
                        id,
                        vec![(index.clone(), value)],
                    ))));
                }
            }
        }
    };
    let id = format!("rds_{}", id_generator.next_id());
    let sub_dimension = dimension
        .and_then(|dimension| dimension.get(&Index::Number(start)))
        .flatten();
    let value = slices_to_data_slice(rest, sub_dimension, id_generator)?;
    ContinuousRangeDataSlice::new(id, vec![start, end], vec![value])
        .map(|slice| Some(DataSlice::Range(slice)))
        .map_err(|err| IncompatibleSliceError::new(err.to_string()))
}

fn mismatch(id: &str, dimension: &Dimension) -> IncompatibleSliceError {
    IncompatibleSliceError::new(format!(
        "data slice {id} does not match dimension {}",
        dimension.id()
    ))
}

/// Resize `data_slice` to the window of `caps`, bottom-up.
///
/// Range levels wider than the cap are truncated and narrower levels are extended from the dimension.
/// Index levels with too many keys drop trailing keys and those with too few gain keys from the dimension.
fn restrain(
    data_slice: &mut DataSlice,
    dimension: &Dimension,
    caps: Caps,
    id_generator: &mut IdGenerator,
) -> Result<(), DataSliceError> {
    let id = data_slice.id().to_string();
    match (data_slice, dimension) {
        (DataSlice::Range(slice), Dimension::Range(range_dimension)) => {
            let (start, end) = (slice.start(), slice.end());
            if start > range_dimension.end() {
                return Err(IncompatibleSliceError::new(format!(
                    "data slice {id} starts at {start}, past the end {} of dimension {}",
                    range_dimension.end(),
                    dimension.id()
                ))
                .into());
            }
            let span = end - start;
            let target = caps
                .range_size()
                .min(range_dimension.end().saturating_sub(start));

            let below = caps.below_range(target);
            for (bucket, value) in slice.values.iter_mut().enumerate() {
                let Some(value) = value else {
                    continue;
                };
                let sub_dimension = range_dimension
                    .get(slice.range[bucket])
                    .flatten()
                    .ok_or_else(|| mismatch(value.id(), dimension))?;
                restrain(value, sub_dimension, below, id_generator)?;
            }

            let range_util = if span > target {
                log::debug!("truncating data slice {id} to {target} elements");
                RangeUtil::new(slice.range.clone(), slice.values.clone())?
                    .change_range(start, target)?
            } else if span < target {
                log::debug!("extending data slice {id} to {target} elements");
                let DataSlice::Range(extension) = generate(end, dimension, caps, id_generator)?
                else {
                    return Err(mismatch(&id, dimension).into());
                };
                let mut range = slice.range.clone();
                range.extend_from_slice(&extension.range[1..]);
                let mut values = slice.values.clone();
                values.extend(extension.values);
                RangeUtil::new(range, values)?
                    .change_range(start, target)?
                    .optimize_by(|a, b| match (a, b) {
                        (None, None) => true,
                        (Some(a), Some(b)) => a.is_equivalent(b),
                        _ => false,
                    })
            } else {
                return Ok(());
            };
            (slice.range, slice.values) = range_util.into_parts();
            Ok(())
        }
        (DataSlice::Index(slice), Dimension::Index(index_dimension)) => {
            let size = usize::try_from(caps.index_size()).unwrap_or(usize::MAX);
            let n_elements = if slice.len() > size {
                size
            } else {
                size.min(index_dimension.len().max(slice.len()))
            };

            let below = caps.below_index(n_elements as u64);
            for (key, value) in &mut slice.index2slice {
                let Some(value) = value else {
                    continue;
                };
                let sub_dimension = index_dimension
                    .get(&key.as_key())
                    .flatten()
                    .ok_or_else(|| mismatch(value.id(), dimension))?;
                restrain(value, sub_dimension, below, id_generator)?;
            }

            if slice.len() > size {
                log::debug!("truncating data slice {id} to {size} keys");
                slice.index2slice.truncate(size);
            } else {
                for (key, sub_dimension) in index_dimension.entries() {
                    if slice.len() >= size {
                        break;
                    }
                    let key = Index::Key(key.to_string());
                    if slice.is_selected(&key) {
                        continue;
                    }
                    let value = sub_dimension
                        .map(|sub_dimension| {
                            generate(
                                default_start(sub_dimension),
                                sub_dimension,
                                below,
                                id_generator,
                            )
                        })
                        .transpose()?;
                    slice.index2slice.push((key, value));
                }
            }
            Ok(())
        }
        _ => Err(mismatch(&id, dimension).into()),
    }
}

impl DataSlice {
    /// Select the default window of `dimension`, using the [fetch window](crate::config::Config#fetch-window) of the global configuration.
    ///
    /// # Errors
    /// Returns a [`DataSliceError`] if the dimension cannot be windowed.
    pub fn from_dimension(dimension: &Dimension) -> Result<Self, DataSliceError> {
        let cost_model = global_config().fetch_window();
        Self::from_dimension_with_cost_model(dimension, &cost_model, &mut IdGenerator::new())
    }

    /// Select the default window of `dimension` under `cost_model`.
    ///
    /// Range levels start at the first index of the dimension and index levels take keys in order.
    ///
    /// # Errors
    /// Returns a [`DataSliceError`] if the dimension cannot be windowed.
    pub fn from_dimension_with_cost_model(
        dimension: &Dimension,
        cost_model: &CostModel,
        id_generator: &mut IdGenerator,
    ) -> Result<Self, DataSliceError> {
        generate(
            default_start(dimension),
            dimension,
            Caps::new(cost_model),
            id_generator,
        )
    }

    /// Select the region of `slices` resized to a bounded window, using the [selection window](crate::config::Config#selection-window) of the global configuration.
    ///
    /// # Errors
    /// Returns a [`DataSliceError`] if `slices` is empty, contains an unset slice, or does not match `dimension`.
    pub fn from_slices(dimension: &Dimension, slices: &[Slice]) -> Result<Self, DataSliceError> {
        let cost_model = global_config().selection_window();
        Self::from_slices_with_cost_model(dimension, slices, &cost_model, &mut IdGenerator::new())
    }

    /// Select the region of `slices` resized to a bounded window under `cost_model`.
    ///
    /// The exact region has one level per slice and nothing below the last slice.
    /// It is then resized bottom-up: range levels wider than their cap are truncated (keeping the start), narrower ones are extended from the dimension with adjacent equivalent buckets merged, and index levels are truncated or extended with keys of the dimension.
    ///
    /// # Errors
    /// Returns a [`DataSliceError`] if `slices` is empty, contains an unset slice, or does not match `dimension`.
    pub fn from_slices_with_cost_model(
        dimension: &Dimension,
        slices: &[Slice],
        cost_model: &CostModel,
        id_generator: &mut IdGenerator,
    ) -> Result<Self, DataSliceError> {
        let mut data_slice = slices_to_data_slice(slices, Some(dimension), id_generator)?
            .ok_or_else(|| IncompatibleSliceError::new("no slices"))?;
        restrain(&mut data_slice, dimension, Caps::new(cost_model), id_generator)?;
        Ok(data_slice)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        dimension::tests::{people, table},
        location::Location,
    };

    fn shape(data_slice: &DataSlice) -> serde_json::Value {
        serde_json::to_value(data_slice).unwrap()
    }

    fn from_layout(dimension: &Dimension, layout: &str) -> DataSlice {
        let location = Location::from_string("r", layout).unwrap();
        DataSlice::from_slices_with_cost_model(
            dimension,
            location.slices(),
            &CostModel::selection_window(),
            &mut IdGenerator::new(),
        )
        .unwrap()
    }

    #[test]
    fn data_slice_from_slices() {
        let data_slice = from_layout(&people(), "5..8:artists:0..25:name");
        assert_eq!(
            shape(&data_slice),
            json!({
                "type": "range",
                "range": [5, 15],
                "values": [{
                    "type": "index",
                    "index2slice": [
                        ["artists", {
                            "type": "range",
                            "range": [0, 10],
                            "values": [{"type": "index", "index2slice": [["name", null], ["phone", null]]}]
                        }],
                        ["company", null]
                    ]
                }]
            })
        );
        let ids: std::collections::HashSet<_> = data_slice
            .iter_dfs()
            .map(|(data_slice, _)| data_slice.id().to_string())
            .collect();
        assert_eq!(ids.len(), data_slice.iter_dfs().count());
    }

    #[test]
    fn data_slice_from_slices_at_end() {
        let data_slice = from_layout(&table(12, 3), "8..:1");
        assert_eq!(
            shape(&data_slice),
            json!({
                "type": "range",
                "range": [8, 12],
                "values": [{"type": "range", "range": [1, 3], "values": [null]}]
            })
        );
        assert!(DataSlice::from_slices_with_cost_model(
            &table(12, 3),
            &[],
            &CostModel::selection_window(),
            &mut IdGenerator::new()
        )
        .is_err());
        let location = Location::from_string("r", "0..5:name").unwrap();
        assert!(DataSlice::from_slices_with_cost_model(
            &table(12, 3),
            location.slices(),
            &CostModel::selection_window(),
            &mut IdGenerator::new()
        )
        .is_err());
    }

    #[test]
    fn data_slice_from_slices_past_end() {
        let dimension = table(42, 3);
        for layout in ["50..:0", "50..60:0..2", "0..5:7"] {
            let location = Location::from_string("r", layout).unwrap();
            assert!(matches!(
                DataSlice::from_slices_with_cost_model(
                    &dimension,
                    location.slices(),
                    &CostModel::selection_window(),
                    &mut IdGenerator::new()
                ),
                Err(DataSliceError::IncompatibleSliceError(_))
            ));
        }
        assert!(DataSlice::from_slices_with_cost_model(
            &dimension,
            Location::from_string("r", "0..50:0..9").unwrap().slices(),
            &CostModel::selection_window(),
            &mut IdGenerator::new()
        )
        .is_ok());
    }

    #[test]
    fn data_slice_from_dimension() {
        let data_slice = DataSlice::from_dimension_with_cost_model(
            &people(),
            &CostModel::fetch_window(),
            &mut IdGenerator::new(),
        )
        .unwrap();
        assert_eq!(
            shape(&data_slice),
            json!({
                "type": "range",
                "range": [0, 10],
                "values": [{
                    "type": "index",
                    "index2slice": [
                        ["artists", {
                            "type": "range",
                            "range": [0, 20],
                            "values": [{"type": "index", "index2slice": [["name", null], ["phone", null]]}]
                        }],
                        ["company", null]
                    ]
                }]
            })
        );
        assert_eq!(data_slice.id(), "rds_0");
    }

    #[test]
    fn data_slice_from_dimension_budget() {
        let cost_model = CostModel::new(12, 10, 20, 30);
        let data_slice =
            DataSlice::from_dimension_with_cost_model(&table(100, 50), &cost_model, &mut IdGenerator::new())
                .unwrap();
        assert_eq!(
            shape(&data_slice),
            json!({"type": "range", "range": [0, 10], "values": [{"type": "range", "range": [0, 1], "values": [null]}]})
        );
    }

    #[test]
    fn data_slice_from_dimension_heterogeneous() {
        let dimension = Dimension::deserialize(
            &json!({"type": "range", "range": [0, 3, "inf"], "values": [null, {"type": "index", "values": {"a": null}}]}),
            &mut IdGenerator::new(),
        )
        .unwrap();
        let data_slice = DataSlice::from_dimension_with_cost_model(
            &dimension,
            &CostModel::fetch_window(),
            &mut IdGenerator::new(),
        )
        .unwrap();
        assert_eq!(
            shape(&data_slice),
            json!({"type": "range", "range": [0, 3, 10], "values": [null, {"type": "index", "index2slice": [["a", null]]}]})
        );
    }

    fn assert_within_caps(data_slice: &DataSlice, cost_model: &CostModel) {
        for (data_slice, _) in data_slice.iter_dfs() {
            match data_slice {
                DataSlice::Range(slice) => assert!(
                    slice.end() - slice.start() <= cost_model.max_elements_per_range_dim()
                ),
                DataSlice::Index(slice) => {
                    assert!(slice.len() as u64 <= cost_model.max_elements_per_index_dim());
                }
            }
        }
    }

    #[test]
    fn data_slice_from_slices_caps() {
        let index_dimension = Dimension::deserialize(
            &json!({
                "type": "range",
                "range": [0, "inf"],
                "values": [{"type": "index", "values": {"a": null, "b": null, "c": null, "d": null}}]
            }),
            &mut IdGenerator::new(),
        )
        .unwrap();
        let cost_model = CostModel::new(1000, 3, 3, 2);
        for layout in ["0..:a", "2..3:b", "7..100:d"] {
            let location = Location::from_string("r", layout).unwrap();
            let data_slice = DataSlice::from_slices_with_cost_model(
                &index_dimension,
                location.slices(),
                &cost_model,
                &mut IdGenerator::new(),
            )
            .unwrap();
            assert_within_caps(&data_slice, &cost_model);
            let DataSlice::Range(slice) = &data_slice else {
                panic!()
            };
            assert_eq!(slice.end() - slice.start(), 3);
        }

        let location = Location::from_string("r", "0..10:a").unwrap();
        let mut data_slice = DataSlice::from_slices_with_cost_model(
            &index_dimension,
            location.slices(),
            &cost_model,
            &mut IdGenerator::new(),
        )
        .unwrap();
        let index = data_slice.get_value(&Index::Number(0)).unwrap().unwrap();
        let DataSlice::Index(index) = index else {
            panic!()
        };
        assert_eq!(index.keys().cloned().collect::<Vec<_>>(), vec![Index::from("a"), Index::from("b")]);
        assert!(data_slice.find_mut("rds_0").is_some());
    }
}
