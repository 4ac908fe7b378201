use super::Dimension;

/// A pre-order depth-first iterator over a [`Dimension`] tree.
///
/// Yields each dimension with its depth relative to the root of the iteration.
#[derive(Debug, Clone)]
pub struct DimensionDfsIterator<'a> {
    stack: Vec<(&'a Dimension, usize)>,
}

impl<'a> DimensionDfsIterator<'a> {
    /// Create a new depth-first iterator rooted at `dimension`.
    #[must_use]
    pub fn new(dimension: &'a Dimension) -> Self {
        Self {
            stack: vec![(dimension, 0)],
        }
    }
}

impl<'a> Iterator for DimensionDfsIterator<'a> {
    type Item = (&'a Dimension, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (dimension, depth) = self.stack.pop()?;
        match dimension {
            Dimension::Range(range) => {
                self.stack.extend(
                    range
                        .values()
                        .iter()
                        .rev()
                        .flatten()
                        .map(|child| (child, depth + 1)),
                );
            }
            Dimension::Index(index) => {
                self.stack.extend(
                    index
                        .entries
                        .iter()
                        .rev()
                        .filter_map(|(_, child)| child.as_ref())
                        .map(|child| (child, depth + 1)),
                );
            }
        }
        Some((dimension, depth))
    }
}
