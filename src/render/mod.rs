//! Full-repaint renderer for the mesh.
//!
//! Rendering happens in two steps. [`Renderer::frame`] turns a model and a
//! transform into a [`Frame`], a display list with one [`Quad`] per element.
//! [`Renderer::paint`] replays a frame onto any [`Surface`]. There is no
//! incremental path: a mesh, category or viewport change repaints everything,
//! which costs O(elements).

mod canvas;
mod palette;
mod svg;

pub use canvas::CanvasSurface;
pub use palette::{Color, DEFAULT_SOIL_COLORS, Palette, PaletteError, StrokeStyle};
pub use svg::SvgSurface;

use serde::Serialize;

use crate::mesh::MeshModel;
use crate::view::{PixelPoint, Transform, Viewport};

/// Drawing backend for frames.
pub trait Surface {
    type Error;

    /// Clears the surface and sizes it to `width x height` pixels.
    fn begin_frame(&mut self, width: f64, height: f64) -> Result<(), Self::Error>;

    /// Fills the closed quad and outlines it.
    fn draw_quad(
        &mut self,
        corners: &[PixelPoint; 4],
        fill: Color,
        stroke: &StrokeStyle,
    ) -> Result<(), Self::Error>;

    fn end_frame(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// One element in pixel space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quad {
    pub row: usize,
    pub col: usize,
    pub category: u32,
    pub corners: [PixelPoint; 4],
    pub fill: Color,
}

/// Display list for one full repaint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub stroke: StrokeStyle,
    pub quads: Vec<Quad>,
}

impl Frame {
    /// Quad for element `(row, col)`, if the frame has it.
    #[must_use]
    pub fn quad(&self, row: usize, col: usize) -> Option<&Quad> {
        self.quads.iter().find(|q| q.row == row && q.col == col)
    }
}

/// Summary of a repaint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderDiagnostics {
    pub element_count: usize,
    /// Distinct category ids drawn.
    pub category_count: usize,
    /// Elements whose id was beyond the palette and wrapped around it.
    pub wrapped_count: usize,
    pub width: u32,
    pub height: u32,
    /// The viewport had no room left after padding.
    pub degenerate_viewport: bool,
}

/// Maps elements to coloured quads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Renderer {
    palette: Palette,
    stroke: StrokeStyle,
}

impl Renderer {
    #[must_use]
    pub fn new(palette: Palette, stroke: StrokeStyle) -> Self {
        Self { palette, stroke }
    }

    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Builds the display list for `model` under `transform`.
    #[must_use]
    pub fn frame(&self, model: &MeshModel, transform: &Transform, viewport: Viewport) -> Frame {
        let quads = model
            .elements()
            .map(|element| Quad {
                row: element.row,
                col: element.col,
                category: element.category,
                corners: element.corners.map(|node| transform.node_to_pixel(&node)),
                fill: self.palette.color_for(element.category),
            })
            .collect();

        Frame {
            width: viewport.width,
            height: viewport.height,
            stroke: self.stroke,
            quads,
        }
    }

    /// Frame with no quads; painting it just clears the surface.
    #[must_use]
    pub fn blank_frame(&self, viewport: Viewport) -> Frame {
        Frame {
            width: viewport.width,
            height: viewport.height,
            stroke: self.stroke,
            quads: Vec::new(),
        }
    }

    /// Replays `frame` onto `surface`.
    pub fn paint<S: Surface>(
        &self,
        frame: &Frame,
        surface: &mut S,
    ) -> Result<RenderDiagnostics, S::Error> {
        surface.begin_frame(frame.width, frame.height)?;
        for quad in &frame.quads {
            surface.draw_quad(&quad.corners, quad.fill, &frame.stroke)?;
        }
        surface.end_frame()?;

        let mut categories: Vec<u32> = frame.quads.iter().map(|q| q.category).collect();
        categories.sort_unstable();
        categories.dedup();

        Ok(RenderDiagnostics {
            element_count: frame.quads.len(),
            category_count: categories.len(),
            wrapped_count: frame
                .quads
                .iter()
                .filter(|q| q.category as usize >= self.palette.len())
                .count(),
            width: pixel_size(frame.width),
            height: pixel_size(frame.height),
            degenerate_viewport: false,
        })
    }

    /// Fits a fresh transform, builds the frame and paints it.
    pub fn render<S: Surface>(
        &self,
        model: &MeshModel,
        viewport: Viewport,
        surface: &mut S,
    ) -> Result<RenderDiagnostics, S::Error> {
        let transform = Transform::fit(model.mesh(), viewport);
        let frame = self.frame(model, &transform, viewport);
        let mut diagnostics = self.paint(&frame, surface)?;
        diagnostics.degenerate_viewport = viewport.is_degenerate();
        log::debug!(
            "rendered {} elements into {}x{}",
            diagnostics.element_count,
            diagnostics.width,
            diagnostics.height
        );
        Ok(diagnostics)
    }
}

/// Rounds a CSS size to whole device pixels, treating junk as zero.
pub(crate) fn pixel_size(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}
