use super::{NearestTracker, NodeHit, NodeLocator};
use crate::mesh::Mesh;
use crate::view::{PixelPoint, Transform};

/// Exhaustive scan over every node. O(n) per query, no setup.
#[derive(Debug, Clone, Copy)]
pub struct LinearScan<'a> {
    mesh: &'a Mesh,
    transform: Transform,
}

impl<'a> LinearScan<'a> {
    #[must_use]
    pub fn new(mesh: &'a Mesh, transform: Transform) -> Self {
        Self { mesh, transform }
    }
}

impl NodeLocator for LinearScan<'_> {
    fn nearest(&self, pixel: PixelPoint, tolerance: f64) -> Option<NodeHit> {
        let mut tracker = NearestTracker::new(tolerance);
        for (idx, node) in self.mesh.nodes().enumerate() {
            let projected = self.transform.node_to_pixel(&node);
            tracker.offer(idx, projected.distance_to(pixel));
        }

        let (idx, distance) = tracker.finish()?;
        let node = self.mesh.node_at(idx);
        Some(NodeHit {
            row: node.row,
            col: node.col,
            x: node.x,
            z: node.z,
            pixel: self.transform.node_to_pixel(&node),
            distance,
        })
    }
}
