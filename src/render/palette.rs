use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Soil colours used when no palette is configured.
pub const DEFAULT_SOIL_COLORS: [&str; 6] = [
    "#475569", "#d97706", "#16a34a", "#2563eb", "#9333ea", "#db2777",
];

/// Failures while reading colours and palettes from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    #[error("invalid colour `{0}`, expected #rgb, #rrggbb or rgba(r, g, b, a)")]
    InvalidColor(String),
    #[error("palette needs at least one colour")]
    EmptyPalette,
}

/// sRGB colour with straight alpha in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#rgb`, `#rrggbb` or `rgba(r, g, b, a)`.
    pub fn parse(input: &str) -> Result<Self, PaletteError> {
        let trimmed = input.trim();
        let invalid = || PaletteError::InvalidColor(input.to_owned());

        if let Some(hex) = trimmed.strip_prefix('#') {
            let digits: Vec<u8> = hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| d as u8))
                .collect::<Option<_>>()
                .ok_or_else(invalid)?;
            return match digits.as_slice() {
                [r, g, b] => Ok(Self::rgb(r * 17, g * 17, b * 17)),
                [r1, r2, g1, g2, b1, b2] => {
                    Ok(Self::rgb(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2))
                }
                _ => Err(invalid()),
            };
        }

        let body = trimmed
            .strip_prefix("rgba(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let [r, g, b, a] = parts.as_slice() else {
            return Err(invalid());
        };
        let channel = |s: &str| s.parse::<u8>().map_err(|_| invalid());
        let alpha: f64 = a.parse().map_err(|_| invalid())?;
        if !(0.0..=1.0).contains(&alpha) {
            return Err(invalid());
        }
        Ok(Self::rgba(channel(*r)?, channel(*g)?, channel(*b)?, alpha))
    }

    /// CSS form: `#rrggbb` when opaque, `rgba(...)` otherwise.
    #[must_use]
    pub fn to_css(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Ordered fill colours; category ids index it modulo its length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Color>", into = "Vec<Color>")]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    /// Parses a list of CSS colour strings.
    pub fn from_css<S: AsRef<str>>(colors: &[S]) -> Result<Self, PaletteError> {
        let colors = colors
            .iter()
            .map(|c| Color::parse(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    /// Colour for a category id: `colors[id mod len]`.
    #[must_use]
    pub fn color_for(&self, category: u32) -> Color {
        self.colors[category as usize % self.colors.len()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_SOIL_COLORS
                .iter()
                .filter_map(|c| Color::parse(c).ok())
                .collect(),
        }
    }
}

impl TryFrom<Vec<Color>> for Palette {
    type Error = PaletteError;

    fn try_from(colors: Vec<Color>) -> Result<Self, Self::Error> {
        Self::new(colors)
    }
}

impl From<Palette> for Vec<Color> {
    fn from(palette: Palette) -> Self {
        palette.colors
    }
}

/// Outline drawn around every element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::rgba(255, 255, 255, 0.1),
            width: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, DEFAULT_SOIL_COLORS, Palette, PaletteError, StrokeStyle};

    #[test]
    fn default_palette_has_the_six_soil_colours() {
        let palette = Palette::default();
        assert_eq!(palette.len(), 6);
        assert_eq!(palette.color_for(0), Color::rgb(0x47, 0x55, 0x69));
        assert_eq!(palette.color_for(5).to_css(), DEFAULT_SOIL_COLORS[5]);
    }

    #[test]
    fn ids_wrap_around_the_palette() {
        let palette = Palette::default();
        assert_eq!(palette.color_for(6), palette.color_for(0));
        assert_eq!(palette.color_for(13), palette.color_for(1));
        assert_eq!(palette.color_for(u32::MAX), palette.color_for(u32::MAX % 6));
    }

    #[test]
    fn parses_css_colours() {
        assert_eq!(Color::parse("#fff"), Ok(Color::rgb(255, 255, 255)));
        assert_eq!(Color::parse(" #2563EB "), Ok(Color::rgb(0x25, 0x63, 0xeb)));
        assert_eq!(
            Color::parse("rgba(255, 255, 255, 0.1)"),
            Ok(Color::rgba(255, 255, 255, 0.1))
        );
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#gggggg").is_err());
        assert!(Color::parse("rgba(300, 0, 0, 1)").is_err());
        assert!(Color::parse("rgba(0, 0, 0, 2)").is_err());
        assert!(Color::parse("blue").is_err());
    }

    #[test]
    fn css_output_round_trips_stroke() {
        let stroke = StrokeStyle::default();
        assert_eq!(stroke.color.to_css(), "rgba(255, 255, 255, 0.1)");
        assert_eq!(Color::parse(&stroke.color.to_css()), Ok(stroke.color));
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert_eq!(Palette::new(Vec::new()), Err(PaletteError::EmptyPalette));
        assert!(Palette::from_css(&["#000", "nope"]).is_err());
        assert_eq!(Palette::from_css(&["#000", "#fff"]).map(|p| p.len()), Ok(2));
    }
}
