//! Nearest-node lookup in pixel space.
//!
//! Every locator honours the same contract: return the node whose pixel
//! distance to the query is smallest and strictly below the tolerance, with
//! ties resolved in favour of the earliest node in row-major order. "Nothing
//! within tolerance" is `None`, never an error.
//!
//! Two implementations are provided:
//!
//! - [`LinearScan`] projects every node on each query. No build cost, fine up
//!   to roughly ten thousand nodes.
//! - [`GridIndex`] buckets the projected nodes into a uniform pixel grid. It
//!   must be rebuilt whenever the transform changes.
//!
//! [`Locator`] picks one of them from a [`LocatorStrategy`] so callers never
//! depend on the concrete type.

mod grid;
mod linear;

pub use grid::GridIndex;
pub use linear::LinearScan;

use serde::{Deserialize, Serialize};

use crate::mesh::Mesh;
use crate::view::{PixelPoint, Transform};

/// Default hover tolerance in pixels.
pub const DEFAULT_TOLERANCE_PX: f64 = 15.0;

/// Node count up to which `LocatorStrategy::Auto` keeps the linear scan.
pub const LINEAR_SCAN_NODE_LIMIT: usize = 10_000;

/// A node found by a locator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeHit {
    pub row: usize,
    pub col: usize,
    pub x: f64,
    pub z: f64,
    pub pixel: PixelPoint,
    pub distance: f64,
}

/// Nearest-node-within-tolerance query.
pub trait NodeLocator {
    fn nearest(&self, pixel: PixelPoint, tolerance: f64) -> Option<NodeHit>;
}

/// Which locator to use for a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorStrategy {
    /// Linear scan up to the configured node limit, bucket grid above it.
    #[default]
    Auto,
    Linear,
    Grid,
}

impl LocatorStrategy {
    /// True when this strategy needs a prebuilt [`GridIndex`] for `node_count` nodes.
    #[must_use]
    pub fn uses_grid(self, node_count: usize, linear_scan_limit: usize) -> bool {
        match self {
            Self::Auto => node_count > linear_scan_limit,
            Self::Linear => false,
            Self::Grid => true,
        }
    }
}

/// Borrowed view over whichever locator is active.
#[derive(Debug, Clone, Copy)]
pub enum Locator<'a> {
    Linear(LinearScan<'a>),
    Grid(&'a GridIndex),
}

impl<'a> Locator<'a> {
    /// Uses the grid index when one was built, the linear scan otherwise.
    #[must_use]
    pub fn new(mesh: &'a Mesh, transform: Transform, grid: Option<&'a GridIndex>) -> Self {
        match grid {
            Some(index) => Self::Grid(index),
            None => Self::Linear(LinearScan::new(mesh, transform)),
        }
    }
}

impl NodeLocator for Locator<'_> {
    fn nearest(&self, pixel: PixelPoint, tolerance: f64) -> Option<NodeHit> {
        match self {
            Self::Linear(scan) => scan.nearest(pixel, tolerance),
            Self::Grid(index) => index.nearest(pixel, tolerance),
        }
    }
}

/// Running minimum shared by the locators so they agree on tie-breaking.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NearestTracker {
    tolerance: f64,
    best: Option<(usize, f64)>,
}

impl NearestTracker {
    pub(crate) fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            best: None,
        }
    }

    /// Offers the node with flat row-major index `idx` at `distance`.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub(crate) fn offer(&mut self, idx: usize, distance: f64) {
        if !(distance < self.tolerance) {
            return;
        }
        let better = match self.best {
            None => true,
            Some((best_idx, best_distance)) => {
                distance < best_distance || (distance == best_distance && idx < best_idx)
            }
        };
        if better {
            self.best = Some((idx, distance));
        }
    }

    pub(crate) fn finish(self) -> Option<(usize, f64)> {
        self.best
    }
}

#[cfg(test)]
mod tests;
