use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::{ParseError, ParseResult};
use crate::mesh::{CategoryMap, Mesh, MeshModel, MeshResult, flatten_rows};

/// Node coordinates as served by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshPayload {
    pub x_coords: Vec<Vec<f64>>,
    pub z_coords: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_layers: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_columns: Option<usize>,
}

/// Per-element soil ids as served by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoilMapPayload {
    pub matrix: Vec<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_ids: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_layers: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_columns: Option<usize>,
}

/// Orientation of a nested grid payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `grid[layer][column]`.
    RowMajor,
    /// `grid[column][layer]`.
    ColumnMajor,
}

impl Layout {
    /// Works out the orientation of an `outer x inner` grid from the declared
    /// sizes. A missing declaration matches anything; row-major wins ties, so
    /// an undeclared or square grid is taken as-is.
    pub fn detect(
        what: &'static str,
        outer: usize,
        inner: usize,
        layers: Option<usize>,
        columns: Option<usize>,
    ) -> ParseResult<Self> {
        let fits = |rows: usize, cols: usize| {
            layers.is_none_or(|l| l == rows) && columns.is_none_or(|c| c == cols)
        };

        if fits(outer, inner) {
            Ok(Self::RowMajor)
        } else if fits(inner, outer) {
            Ok(Self::ColumnMajor)
        } else {
            Err(ParseError::DeclaredShape {
                what,
                layers,
                columns,
                actual: (outer, inner),
            })
        }
    }

    fn apply<'a, T: Copy>(self, what: &'static str, grid: &'a [Vec<T>]) -> MeshResult<Cow<'a, [Vec<T>]>> {
        match self {
            Self::RowMajor => Ok(Cow::Borrowed(grid)),
            Self::ColumnMajor => transpose(what, grid).map(Cow::Owned),
        }
    }
}

impl MeshPayload {
    /// Validates the coordinates into a [`Mesh`], transposing column-major input.
    pub fn to_mesh(&self) -> ParseResult<Mesh> {
        self.to_mesh_with_layout().map(|(mesh, _)| mesh)
    }

    /// Like [`MeshPayload::to_mesh`], also reporting the layout that was detected.
    pub fn to_mesh_with_layout(&self) -> ParseResult<(Mesh, Layout)> {
        let (outer, inner) = outer_inner(&self.x_coords);
        let layout = Layout::detect("mesh", outer, inner, self.n_layers, self.n_columns)?;
        if layout == Layout::ColumnMajor {
            log::debug!("mesh payload is column-major ({outer}x{inner}), transposing");
        }

        let x = layout.apply("x grid", &self.x_coords)?;
        let z = layout.apply("z grid", &self.z_coords)?;
        Ok((Mesh::from_rows(&x, &z)?, layout))
    }
}

impl SoilMapPayload {
    /// Validates the ids into a [`CategoryMap`], transposing column-major input.
    /// Without declared sizes the matrix is taken as row-major.
    pub fn to_categories(&self) -> ParseResult<CategoryMap> {
        self.to_categories_in(Layout::RowMajor)
    }

    /// Like [`SoilMapPayload::to_categories`], using `undeclared` when the
    /// payload declares neither `n_layers` nor `n_columns`.
    pub fn to_categories_in(&self, undeclared: Layout) -> ParseResult<CategoryMap> {
        let (outer, inner) = outer_inner(&self.matrix);
        let layout = if self.n_layers.is_none() && self.n_columns.is_none() {
            undeclared
        } else {
            Layout::detect("soil map", outer, inner, self.n_layers, self.n_columns)?
        };
        if layout == Layout::ColumnMajor {
            log::debug!("soil map payload is column-major ({outer}x{inner}), transposing");
        }

        let categories = CategoryMap::from_rows(&layout.apply("soil map", &self.matrix)?)?;
        if let Some(declared) = &self.unique_ids {
            let mut declared = declared.clone();
            declared.sort_unstable();
            declared.dedup();
            let actual = categories.unique_ids();
            if declared != actual {
                log::debug!("soil map lists unique ids {declared:?}, matrix holds {actual:?}");
            }
        }
        Ok(categories)
    }
}

/// Validates both payloads and pairs them into one model. A soil map without
/// declared sizes follows the layout detected for the mesh.
pub fn model_from_payloads(mesh: &MeshPayload, soil: &SoilMapPayload) -> ParseResult<MeshModel> {
    let (mesh, layout) = mesh.to_mesh_with_layout()?;
    let categories = soil.to_categories_in(layout)?;
    Ok(MeshModel::new(mesh, categories)?)
}

/// Same as [`model_from_payloads`] for JSON text.
pub fn model_from_json(mesh_json: &str, soil_json: &str) -> ParseResult<MeshModel> {
    let mesh: MeshPayload = serde_json::from_str(mesh_json)?;
    let soil: SoilMapPayload = serde_json::from_str(soil_json)?;
    model_from_payloads(&mesh, &soil)
}

fn outer_inner<T>(grid: &[Vec<T>]) -> (usize, usize) {
    (grid.len(), grid.first().map_or(0, Vec::len))
}

fn transpose<T: Copy>(what: &'static str, grid: &[Vec<T>]) -> MeshResult<Vec<Vec<T>>> {
    let (rows, cols, flat) = flatten_rows(what, grid)?;
    Ok((0..cols)
        .map(|c| (0..rows).map(|r| flat[r * cols + c]).collect())
        .collect())
}
