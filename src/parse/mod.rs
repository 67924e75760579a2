//! Conversion of backend payloads into a validated [`MeshModel`].
//!
//! [`MeshModel`]: crate::mesh::MeshModel

pub mod payload;

pub use payload::{
    Layout, MeshPayload, SoilMapPayload, model_from_json, model_from_payloads,
};

use thiserror::Error;

use crate::mesh::MeshError;

pub type ParseResult<T> = Result<T, ParseError>;

/// Failures while turning payloads into a model.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// The grid fits neither the declared row-major nor the transposed shape.
    #[error(
        "{what} is {}x{}, which fits neither layout of n_layers={} n_columns={}",
        .actual.0, .actual.1, dim(.layers), dim(.columns)
    )]
    DeclaredShape {
        what: &'static str,
        layers: Option<usize>,
        columns: Option<usize>,
        actual: (usize, usize),
    },

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[allow(clippy::ref_option)]
fn dim(value: &Option<usize>) -> String {
    value.map_or_else(|| "?".to_owned(), |v| v.to_string())
}
