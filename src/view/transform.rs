use serde::Serialize;

use crate::mesh::{Bounds, Mesh, Node};

/// Inner padding reserved on every side of the viewport, in pixels.
pub const DEFAULT_PADDING: f64 = 40.0;

/// Position in viewport pixel space (origin top-left, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixels.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Drawing area in pixels with a fixed padding on all sides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self::with_padding(width, height, DEFAULT_PADDING)
    }

    #[must_use]
    pub const fn with_padding(width: f64, height: f64, padding: f64) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }

    /// Horizontal span left for data once padding is removed, never negative.
    #[must_use]
    pub fn usable_width(self) -> f64 {
        (self.width - 2.0 * self.padding).max(0.0)
    }

    /// Vertical span left for data once padding is removed, never negative.
    #[must_use]
    pub fn usable_height(self) -> f64 {
        (self.height - 2.0 * self.padding).max(0.0)
    }

    /// True when no area is left for drawing after padding.
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        !(self.usable_width() > 0.0 && self.usable_height() > 0.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Affine data-to-pixel mapping fitted to a mesh and a viewport.
///
/// Axes are scaled independently so the mesh fills the padded area; the
/// aspect ratio is not preserved. The z axis is flipped so higher elevation
/// is drawn higher on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    scale_x: f64,
    scale_z: f64,
    min_x: f64,
    min_z: f64,
    padding: f64,
    height: f64,
}

impl Transform {
    /// Fits the mesh bounds into the viewport. One pass over the nodes.
    #[must_use]
    pub fn fit(mesh: &Mesh, viewport: Viewport) -> Self {
        Self::from_bounds(mesh.bounds(), viewport)
    }

    #[must_use]
    pub fn from_bounds(bounds: Bounds, viewport: Viewport) -> Self {
        Self {
            scale_x: axis_scale(viewport.usable_width(), bounds.width()),
            scale_z: axis_scale(viewport.usable_height(), bounds.height()),
            min_x: bounds.min_x,
            min_z: bounds.min_z,
            padding: viewport.padding,
            height: viewport.height,
        }
    }

    /// Maps a physical `(x, z)` coordinate to viewport pixels.
    #[must_use]
    pub fn to_pixel(&self, x: f64, z: f64) -> PixelPoint {
        PixelPoint {
            x: self.padding + (x - self.min_x) * self.scale_x,
            y: self.height - self.padding - (z - self.min_z) * self.scale_z,
        }
    }

    #[must_use]
    pub fn node_to_pixel(&self, node: &Node) -> PixelPoint {
        self.to_pixel(node.x, node.z)
    }

    /// Maps a pixel back to physical coordinates. A collapsed axis (scale 0)
    /// maps to the data origin.
    #[must_use]
    pub fn to_data(&self, pixel: PixelPoint) -> (f64, f64) {
        let x = if self.scale_x == 0.0 {
            self.min_x
        } else {
            self.min_x + (pixel.x - self.padding) / self.scale_x
        };
        let z = if self.scale_z == 0.0 {
            self.min_z
        } else {
            self.min_z + (self.height - self.padding - pixel.y) / self.scale_z
        };
        (x, z)
    }

    #[must_use]
    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    #[must_use]
    pub fn scale_z(&self) -> f64 {
        self.scale_z
    }

    /// Data-space origin `(min_x, min_z)`.
    #[must_use]
    pub fn origin(&self) -> (f64, f64) {
        (self.min_x, self.min_z)
    }
}

// Zero extent: scale 1 so the axis collapses onto the padding offset.
fn axis_scale(available: f64, extent: f64) -> f64 {
    if extent == 0.0 {
        1.0
    } else {
        available / extent
    }
}

#[cfg(test)]
mod tests {
    use super::{PixelPoint, Transform, Viewport};
    use crate::mesh::Mesh;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EPS: f64 = 1e-9;

    fn mesh(x: Vec<Vec<f64>>, z: Vec<Vec<f64>>) -> Mesh {
        Mesh::from_rows(&x, &z).expect("valid mesh")
    }

    fn unit_grid() -> Mesh {
        mesh(
            vec![vec![0.0, 1.0, 2.0]; 3],
            vec![vec![0.0; 3], vec![1.0; 3], vec![2.0; 3]],
        )
    }

    fn random_mesh(rng: &mut StdRng) -> Mesh {
        let rows = rng.random_range(2..12);
        let cols = rng.random_range(2..12);
        let x = (0..rows)
            .map(|_| (0..cols).map(|_| rng.random_range(-500.0..500.0)).collect())
            .collect();
        let z = (0..rows)
            .map(|_| (0..cols).map(|_| rng.random_range(-50.0..50.0)).collect())
            .collect();
        mesh(x, z)
    }

    #[test]
    fn corners_land_on_padding_edges() {
        let transform = Transform::fit(&unit_grid(), Viewport::with_padding(400.0, 400.0, 40.0));
        assert_eq!(transform.scale_x(), 160.0);
        assert_eq!(transform.scale_z(), 160.0);
        assert_eq!(transform.to_pixel(0.0, 0.0), PixelPoint::new(40.0, 360.0));
        assert_eq!(transform.to_pixel(2.0, 2.0), PixelPoint::new(360.0, 40.0));
        assert_eq!(transform.to_pixel(1.0, 1.0), PixelPoint::new(200.0, 200.0));
    }

    #[test]
    fn axes_scale_independently() {
        let transform = Transform::fit(&unit_grid(), Viewport::with_padding(600.0, 300.0, 50.0));
        assert_eq!(transform.scale_x(), 250.0);
        assert_eq!(transform.scale_z(), 100.0);
    }

    #[test]
    fn higher_elevation_is_drawn_higher() {
        let transform = Transform::fit(&unit_grid(), Viewport::new(300.0, 300.0));
        let low = transform.to_pixel(0.0, 0.0);
        let high = transform.to_pixel(0.0, 2.0);
        assert!(high.y < low.y);
    }

    #[test]
    fn every_node_stays_inside_the_padded_area() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let mesh = random_mesh(&mut rng);
            let viewport = Viewport::with_padding(
                rng.random_range(100.0..1600.0),
                rng.random_range(100.0..1200.0),
                rng.random_range(0.0..40.0),
            );
            let transform = Transform::fit(&mesh, viewport);
            for node in mesh.nodes() {
                let p = transform.node_to_pixel(&node);
                assert!(p.x >= viewport.padding - EPS);
                assert!(p.x <= viewport.width - viewport.padding + EPS);
                assert!(p.y >= viewport.padding - EPS);
                assert!(p.y <= viewport.height - viewport.padding + EPS);
            }
        }
    }

    #[test]
    fn fitting_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        let mesh = random_mesh(&mut rng);
        let viewport = Viewport::new(800.0, 500.0);
        assert_eq!(Transform::fit(&mesh, viewport), Transform::fit(&mesh, viewport));
    }

    #[test]
    fn flat_axis_collapses_to_padding() {
        let flat = mesh(vec![vec![0.0, 5.0], vec![0.0, 5.0]], vec![vec![3.0; 2]; 2]);
        let transform = Transform::fit(&flat, Viewport::with_padding(200.0, 100.0, 10.0));
        assert_eq!(transform.scale_z(), 1.0);
        assert_eq!(transform.to_pixel(5.0, 3.0), PixelPoint::new(190.0, 90.0));
    }

    #[test]
    fn zero_area_viewport_is_defined() {
        let transform = Transform::fit(&unit_grid(), Viewport::with_padding(0.0, 0.0, 40.0));
        assert!(Viewport::with_padding(0.0, 0.0, 40.0).is_degenerate());
        assert_eq!(transform.scale_x(), 0.0);
        let p = transform.to_pixel(2.0, 2.0);
        assert!(p.is_finite());
        assert_eq!(p, PixelPoint::new(40.0, -40.0));
        assert_eq!(transform.to_data(p), (0.0, 0.0));
    }

    #[test]
    fn to_data_inverts_to_pixel() {
        let mut rng = StdRng::seed_from_u64(99);
        let mesh = random_mesh(&mut rng);
        let transform = Transform::fit(&mesh, Viewport::new(1024.0, 768.0));
        for node in mesh.nodes() {
            let (x, z) = transform.to_data(transform.node_to_pixel(&node));
            assert!((x - node.x).abs() < 1e-6);
            assert!((z - node.z).abs() < 1e-6);
        }
    }
}
