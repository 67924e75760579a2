//! Viewer configuration.
//!
//! Options arrive as a plain object from JS (`serde-wasm-bindgen`) or as JSON
//! from the CLI. Every field has a default, so `{}` is a valid configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::{Color, DEFAULT_SOIL_COLORS, Palette, PaletteError, Renderer, StrokeStyle};
use crate::spatial::{DEFAULT_TOLERANCE_PX, LINEAR_SCAN_NODE_LIMIT, LocatorStrategy};
use crate::view::DEFAULT_PADDING;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    #[error(transparent)]
    Palette(#[from] PaletteError),
    #[error("tolerance_px must be a positive number, got {0}")]
    Tolerance(f64),
    #[error("padding must be zero or more, got {0}")]
    Padding(f64),
    #[error("stroke_width must be zero or more, got {0}")]
    StrokeWidth(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ViewerOptions {
    /// Space kept free on every side of the mesh, in CSS pixels.
    pub padding: f64,
    /// Pointer distance within which a node counts as hovered.
    pub tolerance_px: f64,
    /// Fill colours, indexed by category id modulo length.
    pub palette: Vec<String>,
    pub stroke_color: String,
    pub stroke_width: f64,
    pub locator: LocatorStrategy,
    /// Node count up to which `auto` keeps the linear scan.
    pub linear_scan_limit: usize,
    pub unit_suffix: String,
    pub coalesce_pointer_events: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            tolerance_px: DEFAULT_TOLERANCE_PX,
            palette: DEFAULT_SOIL_COLORS.iter().map(|c| (*c).to_owned()).collect(),
            stroke_color: StrokeStyle::default().color.to_css(),
            stroke_width: StrokeStyle::default().width,
            locator: LocatorStrategy::default(),
            linear_scan_limit: LINEAR_SCAN_NODE_LIMIT,
            unit_suffix: "m".to_owned(),
            coalesce_pointer_events: false,
        }
    }
}

impl ViewerOptions {
    /// Checks every field and builds the renderer they describe.
    pub fn renderer(&self) -> Result<Renderer, OptionsError> {
        self.validate()?;
        let palette = Palette::from_css(&self.palette)?;
        let stroke = StrokeStyle {
            color: Color::parse(&self.stroke_color)?,
            width: self.stroke_width,
        };
        Ok(Renderer::new(palette, stroke))
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(self.tolerance_px.is_finite() && self.tolerance_px > 0.0) {
            return Err(OptionsError::Tolerance(self.tolerance_px));
        }
        if !(self.padding.is_finite() && self.padding >= 0.0) {
            return Err(OptionsError::Padding(self.padding));
        }
        if !(self.stroke_width.is_finite() && self.stroke_width >= 0.0) {
            return Err(OptionsError::StrokeWidth(self.stroke_width));
        }
        if self.palette.is_empty() {
            return Err(PaletteError::EmptyPalette.into());
        }
        Color::parse(&self.stroke_color)?;
        for color in &self.palette {
            Color::parse(color)?;
        }
        Ok(())
    }
}
