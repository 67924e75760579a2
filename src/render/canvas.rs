//! `<canvas>` backend for [`Surface`].

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Color, StrokeStyle, Surface, pixel_size};
use crate::view::PixelPoint;

/// Paints frames onto a 2D canvas context.
///
/// Frames are laid out in CSS pixels; the backing store is scaled by the
/// device pixel ratio so lines stay crisp on high-density screens.
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    pixel_ratio: f64,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, pixel_ratio: f64) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        Ok(Self {
            canvas,
            ctx,
            pixel_ratio,
        })
    }
}

impl Surface for CanvasSurface {
    type Error = JsValue;

    fn begin_frame(&mut self, width: f64, height: f64) -> Result<(), JsValue> {
        let (backing_w, backing_h) = backing_size(width, height, self.pixel_ratio);
        self.canvas.set_width(backing_w);
        self.canvas.set_height(backing_h);
        // Pin the displayed size, otherwise the element grows to its backing store.
        let style = self.canvas.style();
        style.set_property("width", &css_px(width))?;
        style.set_property("height", &css_px(height))?;
        self.ctx
            .set_transform(self.pixel_ratio, 0.0, 0.0, self.pixel_ratio, 0.0, 0.0)?;
        self.ctx.clear_rect(0.0, 0.0, width, height);
        Ok(())
    }

    fn draw_quad(
        &mut self,
        corners: &[PixelPoint; 4],
        fill: Color,
        stroke: &StrokeStyle,
    ) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        ctx.begin_path();
        ctx.move_to(corners[0].x, corners[0].y);
        for p in &corners[1..] {
            ctx.line_to(p.x, p.y);
        }
        ctx.close_path();

        ctx.set_fill_style_str(&fill.to_css());
        ctx.fill();
        ctx.set_stroke_style_str(&stroke.color.to_css());
        ctx.set_line_width(stroke.width);
        ctx.stroke();
        Ok(())
    }
}

fn backing_size(width: f64, height: f64, pixel_ratio: f64) -> (u32, u32) {
    (pixel_size(width * pixel_ratio), pixel_size(height * pixel_ratio))
}

fn css_px(value: f64) -> String {
    format!("{}px", pixel_size(value))
}

#[cfg(test)]
mod tests {
    use super::{backing_size, css_px};

    #[test]
    fn backing_store_scales_but_display_size_does_not() {
        assert_eq!(backing_size(400.0, 300.0, 2.0), (800, 600));
        assert_eq!(backing_size(400.0, 300.0, 1.5), (600, 450));
        assert_eq!(css_px(400.0), "400px");
        assert_eq!(css_px(300.0), "300px");
    }

    #[test]
    fn css_size_is_whole_pixels() {
        assert_eq!(css_px(299.6), "300px");
        assert_eq!(css_px(-3.0), "0px");
    }
}
