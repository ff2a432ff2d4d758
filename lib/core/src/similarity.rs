use crate::{Error, ItemId, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Square item-item cosine similarity table.
///
/// Rows and columns share the same axis order. Cells are stored row-major.
/// Symmetry is expected from the producer but not checked.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    items: Vec<ItemId>,
    index: AHashMap<ItemId, usize>,
    cells: Vec<f64>,
}

/// Wire form of the matrix: the axis ids plus one row per id.
#[derive(Debug, Serialize, Deserialize)]
pub struct MatrixData {
    pub items: Vec<ItemId>,
    pub rows: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    /// Build from an axis and a flat row-major cell buffer of `n * n` values.
    pub fn new(items: Vec<ItemId>, cells: Vec<f64>) -> Result<Self> {
        let n = items.len();
        if cells.len() != n * n {
            return Err(Error::InvalidMatrix(format!(
                "expected {} cells for {} items, got {}",
                n * n,
                n,
                cells.len()
            )));
        }

        let mut index = AHashMap::with_capacity(n);
        for (pos, id) in items.iter().enumerate() {
            if index.insert(*id, pos).is_some() {
                return Err(Error::InvalidMatrix(format!("duplicate item id {}", id)));
            }
        }

        Ok(Self { items, index, cells })
    }

    /// Build from one row per item.
    pub fn from_rows(items: Vec<ItemId>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = items.len();
        if rows.len() != n {
            return Err(Error::InvalidMatrix(format!(
                "{} rows for {} items",
                rows.len(),
                n
            )));
        }

        let mut cells = Vec::with_capacity(n * n);
        for (row, id) in rows.into_iter().zip(items.iter()) {
            if row.len() != n {
                return Err(Error::InvalidMatrix(format!(
                    "row for item {} has {} cells, expected {}",
                    id,
                    row.len(),
                    n
                )));
            }
            cells.extend(row);
        }

        Self::new(items, cells)
    }

    pub fn from_data(data: MatrixData) -> Result<Self> {
        Self::from_rows(data.items, data.rows)
    }

    #[must_use]
    pub fn to_data(&self) -> MatrixData {
        MatrixData {
            items: self.items.clone(),
            rows: self.cells.chunks(self.len().max(1)).map(<[f64]>::to_vec).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.index.contains_key(&id)
    }

    /// Axis ids in matrix order.
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    /// Similarity between two items, if both are on the axis.
    #[must_use]
    pub fn get(&self, a: ItemId, b: ItemId) -> Option<f64> {
        let i = *self.index.get(&a)?;
        let j = *self.index.get(&b)?;
        Some(self.cells[i * self.len() + j])
    }

    /// The full row of an item paired with the column ids, in matrix order.
    pub fn row(&self, id: ItemId) -> Option<impl Iterator<Item = (ItemId, f64)> + '_> {
        let i = *self.index.get(&id)?;
        let n = self.len();
        let row = &self.cells[i * n..(i + 1) * n];
        Some(self.items.iter().copied().zip(row.iter().copied()))
    }
}
