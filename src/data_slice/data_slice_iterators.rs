use crate::{
    dimension::Dimension,
    index::{Index, UNBOUNDED},
    portion_of_data::PortionOfData,
};

use super::{DataSlice, IndexDataSlice};

fn children(data_slice: &DataSlice) -> Box<dyn DoubleEndedIterator<Item = (Index, &DataSlice)> + '_> {
    match data_slice {
        DataSlice::Range(slice) => Box::new(
            slice
                .range
                .iter()
                .zip(&slice.values)
                .filter_map(|(&start, value)| value.as_ref().map(|value| (Index::Number(start), value))),
        ),
        DataSlice::Index(slice) => Box::new(
            slice
                .index2slice
                .iter()
                .filter_map(|(index, value)| value.as_ref().map(|value| (index.clone(), value))),
        ),
    }
}

/// A pre-order depth-first iterator over a [`DataSlice`] tree.
///
/// Yields each data slice with its depth relative to the root of the iteration.
#[derive(Debug, Clone)]
pub struct DataSliceDfsIterator<'a> {
    stack: Vec<(&'a DataSlice, usize)>,
}

impl<'a> DataSliceDfsIterator<'a> {
    /// Create a new depth-first iterator rooted at `data_slice`.
    #[must_use]
    pub fn new(data_slice: &'a DataSlice) -> Self {
        Self {
            stack: vec![(data_slice, 0)],
        }
    }
}

impl<'a> Iterator for DataSliceDfsIterator<'a> {
    type Item = (&'a DataSlice, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (data_slice, depth) = self.stack.pop()?;
        self.stack.extend(
            children(data_slice)
                .rev()
                .map(|(_, child)| (child, depth + 1)),
        );
        Some((data_slice, depth))
    }
}

/// A pre-order depth-first iterator over a [`DataSlice`] tree paired with the [`Dimension`] of each node.
#[derive(Debug, Clone)]
pub struct DataSliceDimIterator<'a> {
    stack: Vec<(&'a DataSlice, &'a Dimension)>,
}

impl<'a> DataSliceDimIterator<'a> {
    /// Create a new depth-first iterator rooted at `data_slice` with dimension `dimension`.
    #[must_use]
    pub fn new(data_slice: &'a DataSlice, dimension: &'a Dimension) -> Self {
        Self {
            stack: vec![(data_slice, dimension)],
        }
    }
}

impl<'a> Iterator for DataSliceDimIterator<'a> {
    type Item = (&'a DataSlice, &'a Dimension);

    fn next(&mut self) -> Option<Self::Item> {
        let (data_slice, dimension) = self.stack.pop()?;
        self.stack.extend(children(data_slice).rev().filter_map(|(idx, child)| {
            dimension
                .get(&idx)
                .flatten()
                .map(|sub_dimension| (child, sub_dimension))
        }));
        Some((data_slice, dimension))
    }
}

#[derive(Debug, Clone)]
enum KeysState<'a> {
    Range {
        next: u64,
        end: u64,
        data: &'a PortionOfData,
    },
    Index(std::slice::Iter<'a, (Index, Option<DataSlice>)>),
}

/// An iterator over the indices of one level of a [`DataSlice`].
///
/// See [`DataSlice::iter_keys`].
#[derive(Debug, Clone)]
pub struct DataSliceKeysIterator<'a> {
    state: KeysState<'a>,
}

impl<'a> DataSliceKeysIterator<'a> {
    pub(super) fn new(data_slice: &'a DataSlice, data: &'a PortionOfData) -> Self {
        let state = match data_slice {
            DataSlice::Range(slice) => KeysState::Range {
                next: slice.start(),
                end: slice.end(),
                data,
            },
            DataSlice::Index(IndexDataSlice { index2slice, .. }) => {
                KeysState::Index(index2slice.iter())
            }
        };
        Self { state }
    }
}

impl Iterator for DataSliceKeysIterator<'_> {
    type Item = Index;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.state {
            KeysState::Range { next, end, data } => {
                if *next >= *end || (*end == UNBOUNDED && !data.has(&Index::Number(*next))) {
                    return None;
                }
                let idx = *next;
                *next += 1;
                Some(Index::Number(idx))
            }
            KeysState::Index(iter) => iter.next().map(|(index, _)| index.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        data_slice::DataSlice,
        dimension::tests::people,
        index::Index,
        portion_of_data::PortionOfData,
    };

    #[test]
    fn data_slice_iter_dim() {
        let dimension = people();
        let data_slice = DataSlice::deserialize(&json!({
            "type": "range",
            "range": [0, 10],
            "values": [{
                "type": "index",
                "index2slice": [
                    ["artists", {"type": "range", "range": [0, 5], "values": [{"type": "index", "index2slice": [["name", null]]}]}],
                    ["company", null]
                ]
            }]
        }))
        .unwrap();
        let pairs: Vec<_> = data_slice
            .iter_dim(&dimension)
            .map(|(data_slice, dimension)| (data_slice.id().to_string(), dimension.id().to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("rds_0".to_string(), "rd_3".to_string()),
                ("ids_1".to_string(), "id_2".to_string()),
                ("rds_2".to_string(), "rd_1".to_string()),
                ("ids_3".to_string(), "id_0".to_string()),
            ]
        );
    }

    #[test]
    fn data_slice_iter_keys() {
        let dimension = crate::dimension::Dimension::deserialize(
            &json!({"type": "range", "range": [0, 100], "values": [null]}),
            &mut crate::index::IdGenerator::new(),
        )
        .unwrap();
        let bounded = DataSlice::deserialize(&json!({"type": "range", "range": [2, 5], "values": [null]})).unwrap();
        let unbounded = DataSlice::deserialize(&json!({"type": "range", "range": [0, "inf"], "values": [null]})).unwrap();
        let data = PortionOfData::from_slices(&bounded, &dimension, &json!([[1, 2], [3, 4], [5, 6]])).unwrap();

        let keys: Vec<_> = bounded.iter_keys(&data).collect();
        assert_eq!(keys, vec![Index::Number(2), Index::Number(3), Index::Number(4)]);
        assert_eq!(unbounded.iter_keys(&data).count(), 0);

        let from_two = DataSlice::deserialize(&json!({"type": "range", "range": [2, "inf"], "values": [null]})).unwrap();
        assert_eq!(from_two.iter_keys(&data).count(), 3);
        let entries: Vec<_> = from_two
            .iter_entries(&data)
            .map(|(idx, item)| (idx, item.map(crate::portion_of_data::PortionItem::to_json)))
            .collect();
        assert_eq!(entries[1], (Index::Number(3), Some(json!([3, 4]))));
    }
}
