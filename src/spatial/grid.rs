use super::{DEFAULT_TOLERANCE_PX, NearestTracker, NodeHit, NodeLocator};
use crate::mesh::{Mesh, Node};
use crate::view::{PixelPoint, Transform};

/// Uniform bucket grid over projected node positions.
///
/// Buckets are stored CSR-style: `cell_starts[c]..cell_starts[c + 1]` slices
/// `entries`, and node indices inside one bucket stay in row-major order.
#[derive(Debug, Clone)]
pub struct GridIndex {
    cell_size: f64,
    origin: PixelPoint,
    grid_cols: usize,
    grid_rows: usize,
    cell_starts: Vec<u32>,
    entries: Vec<u32>,
    nodes: Vec<Node>,
    positions: Vec<PixelPoint>,
}

impl GridIndex {
    const MAX_CELLS_PER_AXIS: usize = 1024;

    /// Projects every node through `transform` and buckets it.
    ///
    /// `cell_size` is a hint in pixels (the hover tolerance is a good choice);
    /// it grows when needed to keep at most `MAX_CELLS_PER_AXIS` cells per axis.
    #[must_use]
    pub fn build(mesh: &Mesh, transform: Transform, cell_size: f64) -> Self {
        let nodes: Vec<Node> = mesh.nodes().collect();
        let positions: Vec<PixelPoint> = nodes.iter().map(|n| transform.node_to_pixel(n)).collect();

        let mut min = PixelPoint::new(f64::INFINITY, f64::INFINITY);
        let mut max = PixelPoint::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in positions.iter().filter(|p| p.is_finite()) {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        if !min.is_finite() {
            min = PixelPoint::default();
            max = min;
        }

        let span_x = max.x - min.x;
        let span_y = max.y - min.y;
        let limit = Self::MAX_CELLS_PER_AXIS as f64;
        let hint = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            DEFAULT_TOLERANCE_PX
        };
        let cell_size = hint.max(span_x / limit).max(span_y / limit);

        let grid_cols = (span_x / cell_size).floor() as usize + 1;
        let grid_rows = (span_y / cell_size).floor() as usize + 1;
        let cell_count = grid_cols * grid_rows;

        let mut index = Self {
            cell_size,
            origin: min,
            grid_cols,
            grid_rows,
            cell_starts: vec![0; cell_count + 1],
            entries: Vec::new(),
            nodes,
            positions,
        };

        let cells: Vec<Option<usize>> = index
            .positions
            .iter()
            .map(|p| p.is_finite().then(|| index.cell_of(*p)))
            .collect();

        for &cell in cells.iter().flatten() {
            index.cell_starts[cell + 1] += 1;
        }
        for c in 0..cell_count {
            index.cell_starts[c + 1] += index.cell_starts[c];
        }

        let mut cursor = index.cell_starts.clone();
        index.entries = vec![0; index.cell_starts[cell_count] as usize];
        for (idx, cell) in cells.iter().enumerate() {
            if let Some(cell) = *cell {
                index.entries[cursor[cell] as usize] = idx as u32;
                cursor[cell] += 1;
            }
        }

        log::debug!(
            "grid index: {} nodes in {}x{} cells of {:.1}px",
            index.nodes.len(),
            grid_cols,
            grid_rows,
            cell_size
        );
        index
    }

    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of buckets along x and y.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.grid_cols, self.grid_rows)
    }

    fn cell_of(&self, p: PixelPoint) -> usize {
        let gx = axis_cell(p.x, self.origin.x, self.cell_size, self.grid_cols);
        let gy = axis_cell(p.y, self.origin.y, self.cell_size, self.grid_rows);
        gy * self.grid_cols + gx
    }

    /// Inclusive bucket range along one axis covering `[value - reach, value + reach]`,
    /// widened by one cell against rounding at the borders.
    fn axis_range(&self, value: f64, origin: f64, reach: f64, len: usize) -> Option<(usize, usize)> {
        let last = (len - 1) as f64;
        let lo = ((value - reach - origin) / self.cell_size).floor() - 1.0;
        let hi = ((value + reach - origin) / self.cell_size).floor() + 1.0;
        if hi < 0.0 || lo > last {
            return None;
        }
        Some((lo.max(0.0) as usize, hi.min(last) as usize))
    }
}

impl NodeLocator for GridIndex {
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    fn nearest(&self, pixel: PixelPoint, tolerance: f64) -> Option<NodeHit> {
        if !(tolerance > 0.0) || !pixel.is_finite() {
            return None;
        }

        let (x0, x1) = self.axis_range(pixel.x, self.origin.x, tolerance, self.grid_cols)?;
        let (y0, y1) = self.axis_range(pixel.y, self.origin.y, tolerance, self.grid_rows)?;

        let mut tracker = NearestTracker::new(tolerance);
        for gy in y0..=y1 {
            for gx in x0..=x1 {
                let cell = gy * self.grid_cols + gx;
                let start = self.cell_starts[cell] as usize;
                let end = self.cell_starts[cell + 1] as usize;
                for &idx in &self.entries[start..end] {
                    let idx = idx as usize;
                    tracker.offer(idx, self.positions[idx].distance_to(pixel));
                }
            }
        }

        let (idx, distance) = tracker.finish()?;
        let node = self.nodes[idx];
        Some(NodeHit {
            row: node.row,
            col: node.col,
            x: node.x,
            z: node.z,
            pixel: self.positions[idx],
            distance,
        })
    }
}

fn axis_cell(value: f64, origin: f64, cell_size: f64, len: usize) -> usize {
    let cell = ((value - origin) / cell_size).floor();
    cell.clamp(0.0, (len - 1) as f64) as usize
}
