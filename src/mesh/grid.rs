use serde::Serialize;

use super::{MeshError, MeshResult, flatten_rows};

/// A single mesh node: grid address plus physical position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Node {
    pub row: usize,
    pub col: usize,
    pub x: f64,
    pub z: f64,
}

/// Axis-aligned extent of the node coordinates in data space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Bounds {
    #[must_use]
    pub fn width(self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(self) -> f64 {
        self.max_z - self.min_z
    }
}

/// Structured curvilinear grid of `rows x cols` nodes, stored row-major.
///
/// Immutable once built; a new hill or mesh version produces a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    rows: usize,
    cols: usize,
    x: Vec<f64>,
    z: Vec<f64>,
}

impl Mesh {
    /// Builds a mesh from nested `x[row][col]` / `z[row][col]` arrays.
    pub fn from_rows(x: &[Vec<f64>], z: &[Vec<f64>]) -> MeshResult<Self> {
        let rows = x.len();
        let cols = x.first().map_or(0, Vec::len);
        if rows < 2 || cols < 2 {
            return Err(MeshError::DegenerateMesh { rows, cols });
        }

        let (_, _, x_flat) = flatten_rows("x grid", x)?;
        let (z_rows, z_cols, z_flat) = flatten_rows("z grid", z)?;
        if (z_rows, z_cols) != (rows, cols) {
            return Err(MeshError::ShapeMismatch {
                what: "z grid",
                expected: (rows, cols),
                actual: (z_rows, z_cols),
            });
        }

        Self::from_flat(rows, cols, x_flat, z_flat)
    }

    /// Builds a mesh from flat row-major coordinate buffers.
    pub fn from_flat(rows: usize, cols: usize, x: Vec<f64>, z: Vec<f64>) -> MeshResult<Self> {
        if rows < 2 || cols < 2 {
            return Err(MeshError::DegenerateMesh { rows, cols });
        }

        let expected = rows * cols;
        for (what, len) in [("x grid", x.len()), ("z grid", z.len())] {
            if len != expected {
                return Err(MeshError::BufferLength {
                    what,
                    expected,
                    actual: len,
                });
            }
        }

        if let Some(idx) = x
            .iter()
            .zip(&z)
            .position(|(x, z)| !x.is_finite() || !z.is_finite())
        {
            return Err(MeshError::NonFiniteCoordinate {
                row: idx / cols,
                col: idx % cols,
            });
        }

        Ok(Self { rows, cols, x, z })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.x.len()
    }

    /// Shape of the element grid, one less than the node grid on each axis.
    #[must_use]
    pub fn element_shape(&self) -> (usize, usize) {
        (self.rows - 1, self.cols - 1)
    }

    /// Node at `(row, col)`.
    pub fn node(&self, row: usize, col: usize) -> MeshResult<Node> {
        if row >= self.rows || col >= self.cols {
            return Err(MeshError::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.node_at(row * self.cols + col))
    }

    /// Nodes in row-major order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = Node> + '_ {
        (0..self.node_count()).map(|idx| self.node_at(idx))
    }

    /// Extent of all node coordinates, computed in a single pass.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_z: f64::INFINITY,
            max_z: f64::NEG_INFINITY,
        };
        for (&x, &z) in self.x.iter().zip(&self.z) {
            bounds.min_x = bounds.min_x.min(x);
            bounds.max_x = bounds.max_x.max(x);
            bounds.min_z = bounds.min_z.min(z);
            bounds.max_z = bounds.max_z.max(z);
        }
        bounds
    }

    /// Node by flat row-major index. Callers guarantee `idx < node_count()`.
    pub(crate) fn node_at(&self, idx: usize) -> Node {
        Node {
            row: idx / self.cols,
            col: idx % self.cols,
            x: self.x[idx],
            z: self.z[idx],
        }
    }
}
