use std::fmt;

use serde::Serialize;

use super::HoverState;

/// Tooltip text for a hovered node.
#[derive(Debug, Clone, Copy)]
pub struct Inspector<'a> {
    hover: &'a HoverState,
    unit: &'a str,
}

/// Pre-formatted tooltip values, for overlays drawn outside the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectorFields {
    pub index: String,
    pub x: String,
    pub z: String,
    pub category: String,
}

impl<'a> Inspector<'a> {
    #[must_use]
    pub fn new(hover: &'a HoverState, unit: &'a str) -> Self {
        Self { hover, unit }
    }

    #[must_use]
    pub fn fields(&self) -> InspectorFields {
        InspectorFields {
            index: format!("[{}, {}]", self.hover.row, self.hover.col),
            x: format!("{:.2}{}", self.hover.x, self.unit),
            z: format!("{:.2}{}", self.hover.z, self.unit),
            category: self.hover.category.to_string(),
        }
    }

    /// `(label, value)` pairs in display order.
    #[must_use]
    pub fn lines(&self) -> [(&'static str, String); 4] {
        let InspectorFields {
            index,
            x,
            z,
            category,
        } = self.fields();
        [
            ("Index", index),
            ("X-Coord", x),
            ("Z-Coord", z),
            ("Soil ID", category),
        ]
    }
}

impl fmt::Display for Inspector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (label, value)) in self.lines().iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{label}: {value}")?;
        }
        Ok(())
    }
}
