use std::fmt::{self, Write as _};

use super::{Color, StrokeStyle, Surface, pixel_size};
use crate::view::PixelPoint;

/// Renders frames into a standalone SVG document.
#[derive(Debug, Clone, Default)]
pub struct SvgSurface {
    out: String,
}

impl SvgSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The document written so far.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.out
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.out
    }
}

impl Surface for SvgSurface {
    type Error = fmt::Error;

    fn begin_frame(&mut self, width: f64, height: f64) -> fmt::Result {
        let (w, h) = (pixel_size(width), pixel_size(height));
        self.out.clear();
        writeln!(
            self.out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        )
    }

    fn draw_quad(
        &mut self,
        corners: &[PixelPoint; 4],
        fill: Color,
        stroke: &StrokeStyle,
    ) -> fmt::Result {
        self.out.push_str(r#"  <polygon points=""#);
        for (i, p) in corners.iter().enumerate() {
            if i > 0 {
                self.out.push(' ');
            }
            write!(self.out, "{:.2},{:.2}", p.x, p.y)?;
        }
        writeln!(
            self.out,
            r#"" fill="{fill}" stroke="{}" stroke-width="{}"/>"#,
            stroke.color, stroke.width
        )
    }

    fn end_frame(&mut self) -> fmt::Result {
        self.out.push_str("</svg>\n");
        Ok(())
    }
}
