use serde::Serialize;

use super::{CategoryMap, Mesh, MeshError, MeshResult, Node};

/// Quadrilateral cell between four adjacent nodes.
///
/// Corners are ordered `(r, c)`, `(r, c+1)`, `(r+1, c+1)`, `(r+1, c)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Element {
    pub row: usize,
    pub col: usize,
    pub corners: [Node; 4],
    pub category: u32,
}

/// A mesh paired with its per-element category map.
///
/// Construction is the only validation step; everything handed a
/// `MeshModel` may rely on `categories.shape() == mesh.element_shape()`.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshModel {
    mesh: Mesh,
    categories: CategoryMap,
}

impl MeshModel {
    pub fn new(mesh: Mesh, categories: CategoryMap) -> MeshResult<Self> {
        let expected = mesh.element_shape();
        let actual = categories.shape();
        if expected != actual {
            return Err(MeshError::ShapeMismatch {
                what: "category map",
                expected,
                actual,
            });
        }
        Ok(Self { mesh, categories })
    }

    /// Convenience constructor from nested row-major arrays.
    pub fn from_rows(x: &[Vec<f64>], z: &[Vec<f64>], categories: &[Vec<u32>]) -> MeshResult<Self> {
        let mesh = Mesh::from_rows(x, z)?;
        let categories = CategoryMap::from_rows(categories)?;
        Self::new(mesh, categories)
    }

    #[must_use]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    #[must_use]
    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.categories.ids().len()
    }

    pub fn node(&self, row: usize, col: usize) -> MeshResult<Node> {
        self.mesh.node(row, col)
    }

    pub fn element(&self, row: usize, col: usize) -> MeshResult<Element> {
        let category = self.categories.get(row, col)?;
        Ok(self.element_unchecked(row, col, category))
    }

    /// Elements in row-major order.
    pub fn elements(&self) -> impl ExactSizeIterator<Item = Element> + '_ {
        let (_, cols) = self.categories.shape();
        self.categories
            .ids()
            .iter()
            .enumerate()
            .map(move |(idx, &category)| self.element_unchecked(idx / cols, idx % cols, category))
    }

    /// Element whose category is reported for node `(row, col)`.
    ///
    /// Categories are element-centred: a node maps to the element it is the
    /// lower-index corner of, clamped onto the last element row/column.
    pub fn element_for_node(&self, row: usize, col: usize) -> MeshResult<(usize, usize)> {
        self.mesh.node(row, col)?;
        let (element_rows, element_cols) = self.mesh.element_shape();
        Ok((row.min(element_rows - 1), col.min(element_cols - 1)))
    }

    fn element_unchecked(&self, row: usize, col: usize, category: u32) -> Element {
        let cols = self.mesh.cols();
        let top = row * cols + col;
        let bottom = top + cols;
        Element {
            row,
            col,
            corners: [
                self.mesh.node_at(top),
                self.mesh.node_at(top + 1),
                self.mesh.node_at(bottom + 1),
                self.mesh.node_at(bottom),
            ],
            category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MeshModel;
    use crate::mesh::{CategoryMap, Mesh, MeshError};

    fn grid(rows: usize, cols: usize) -> Mesh {
        let x: Vec<Vec<f64>> = (0..rows)
            .map(|_| (0..cols).map(|c| c as f64).collect())
            .collect();
        let z: Vec<Vec<f64>> = (0..rows).map(|r| vec![r as f64; cols]).collect();
        Mesh::from_rows(&x, &z).unwrap()
    }

    #[test]
    fn category_shape_must_be_mesh_minus_one() {
        let categories = CategoryMap::uniform(3, 4, 0);
        assert_eq!(
            MeshModel::new(grid(5, 5), categories),
            Err(MeshError::ShapeMismatch {
                what: "category map",
                expected: (4, 4),
                actual: (3, 4),
            })
        );
    }

    #[test]
    fn element_corners_follow_quad_order() {
        let model = MeshModel::new(grid(3, 3), CategoryMap::uniform(2, 2, 5)).unwrap();
        let element = model.element(1, 0).unwrap();
        let corners: Vec<(usize, usize)> = element.corners.iter().map(|n| (n.row, n.col)).collect();
        assert_eq!(corners, vec![(1, 0), (1, 1), (2, 1), (2, 0)]);
        assert_eq!(element.category, 5);
        assert!(matches!(
            model.element(2, 0),
            Err(MeshError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn elements_iterate_row_major() {
        let categories = CategoryMap::from_rows(&[vec![0, 1, 2], vec![3, 4, 5]]).unwrap();
        let model = MeshModel::new(grid(3, 4), categories).unwrap();
        let ids: Vec<u32> = model.elements().map(|e| e.category).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(model.element_count(), 6);
    }

    #[test]
    fn node_category_clamps_onto_last_element() {
        let model = MeshModel::new(grid(3, 4), CategoryMap::uniform(2, 3, 0)).unwrap();
        assert_eq!(model.element_for_node(0, 0), Ok((0, 0)));
        assert_eq!(model.element_for_node(1, 2), Ok((1, 2)));
        assert_eq!(model.element_for_node(2, 3), Ok((1, 2)));
        assert!(model.element_for_node(3, 0).is_err());
    }
}
