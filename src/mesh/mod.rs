//! Validated, read-only representation of a hillslope mesh and its soil map.
//!
//! Raw payloads are converted once into [`Mesh`], [`CategoryMap`] and the
//! combined [`MeshModel`]. Every invariant (grid shape, finiteness, category
//! shape) is checked here so downstream code never re-validates.

mod categories;
mod grid;
mod model;

pub use categories::CategoryMap;
pub use grid::{Bounds, Mesh, Node};
pub use model::{Element, MeshModel};

use thiserror::Error;

/// Result type for mesh construction and lookups.
pub type MeshResult<T> = Result<T, MeshError>;

/// Validation and lookup failures of the mesh model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// Two grids that must line up do not.
    #[error(
        "{what} is {}x{}, expected {}x{}",
        .actual.0, .actual.1, .expected.0, .expected.1
    )]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// The mesh has no element: fewer than 2 rows or 2 columns of nodes.
    #[error("mesh needs at least 2x2 nodes, got {rows}x{cols}")]
    DegenerateMesh { rows: usize, cols: usize },
    /// An accessor was called outside the grid.
    #[error("index ({row}, {col}) is outside the {rows}x{cols} grid")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    /// A row of a nested array has a different length than the first row.
    #[error("{what} row {row} has {actual} entries, expected {expected}")]
    RaggedRow {
        what: &'static str,
        row: usize,
        expected: usize,
        actual: usize,
    },
    /// A flat buffer does not hold `rows * cols` values.
    #[error("{what} holds {actual} values, expected {expected}")]
    BufferLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A node coordinate is NaN or infinite.
    #[error("node ({row}, {col}) has a non-finite coordinate")]
    NonFiniteCoordinate { row: usize, col: usize },
}

/// Flattens a nested row-major array, checking every row has the same length.
pub(crate) fn flatten_rows<T: Copy>(
    what: &'static str,
    rows: &[Vec<T>],
) -> MeshResult<(usize, usize, Vec<T>)> {
    let row_count = rows.len();
    let col_count = rows.first().map_or(0, Vec::len);

    let mut flat = Vec::with_capacity(row_count * col_count);
    for (row, values) in rows.iter().enumerate() {
        if values.len() != col_count {
            return Err(MeshError::RaggedRow {
                what,
                row,
                expected: col_count,
                actual: values.len(),
            });
        }
        flat.extend_from_slice(values);
    }

    Ok((row_count, col_count, flat))
}

#[cfg(test)]
mod tests {
    use super::{MeshError, flatten_rows};

    #[test]
    fn flatten_rows_keeps_row_major_order() {
        let (rows, cols, flat) = flatten_rows("x", &[vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!((rows, cols), (2, 3));
        assert_eq!(flat, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn flatten_rows_rejects_ragged_input() {
        let err = flatten_rows("x", &[vec![1, 2, 3], vec![4, 5]]).unwrap_err();
        assert_eq!(
            err,
            MeshError::RaggedRow {
                what: "x",
                row: 1,
                expected: 3,
                actual: 2,
            }
        );
    }

    #[test]
    fn shape_mismatch_message_names_both_shapes() {
        let err = MeshError::ShapeMismatch {
            what: "category map",
            expected: (4, 4),
            actual: (3, 4),
        };
        assert_eq!(err.to_string(), "category map is 3x4, expected 4x4");
    }
}
