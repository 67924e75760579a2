use super::{MeshError, MeshResult, flatten_rows};

/// One category id (soil type) per mesh element, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap {
    rows: usize,
    cols: usize,
    ids: Vec<u32>,
}

impl CategoryMap {
    /// Builds a map from nested `ids[row][col]` arrays.
    pub fn from_rows(ids: &[Vec<u32>]) -> MeshResult<Self> {
        let (rows, cols, ids) = flatten_rows("category map", ids)?;
        Ok(Self { rows, cols, ids })
    }

    /// Builds a map from a flat row-major buffer.
    pub fn from_flat(rows: usize, cols: usize, ids: Vec<u32>) -> MeshResult<Self> {
        if ids.len() != rows * cols {
            return Err(MeshError::BufferLength {
                what: "category map",
                expected: rows * cols,
                actual: ids.len(),
            });
        }
        Ok(Self { rows, cols, ids })
    }

    /// Map with every element set to the same id.
    #[must_use]
    pub fn uniform(rows: usize, cols: usize, id: u32) -> Self {
        Self {
            rows,
            cols,
            ids: vec![id; rows * cols],
        }
    }

    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> MeshResult<u32> {
        if row >= self.rows || col >= self.cols {
            return Err(MeshError::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.ids[row * self.cols + col])
    }

    /// Ids in row-major order.
    #[must_use]
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Sorted distinct ids.
    #[must_use]
    pub fn unique_ids(&self) -> Vec<u32> {
        let mut ids = self.ids.clone();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::CategoryMap;
    use crate::mesh::MeshError;

    #[test]
    fn lookup_and_unique_ids() {
        let map = CategoryMap::from_rows(&[vec![3, 1, 3], vec![0, 1, 7]]).unwrap();
        assert_eq!(map.shape(), (2, 3));
        assert_eq!(map.get(1, 2), Ok(7));
        assert_eq!(map.unique_ids(), vec![0, 1, 3, 7]);
    }

    #[test]
    fn out_of_range_lookup_is_an_error() {
        let map = CategoryMap::uniform(2, 2, 0);
        assert!(matches!(
            map.get(2, 0),
            Err(MeshError::IndexOutOfBounds { row: 2, .. })
        ));
    }

    #[test]
    fn flat_buffer_length_is_checked() {
        assert!(CategoryMap::from_flat(2, 2, vec![0, 1, 2]).is_err());
        assert!(CategoryMap::from_flat(2, 2, vec![0, 1, 2, 3]).is_ok());
    }
}
