use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const GRAY: Rgba = Rgba::new(0.5, 0.5, 0.5, 1.0);
    pub const SYSTEM_BLUE: Rgba = Rgba::new(0.0, 0.478, 1.0, 1.0);

    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ColorParseError {
    #[error("invalid colour {input:?}: {source}")]
    InvalidComponent {
        input: String,
        source: std::num::ParseFloatError,
    },

    #[error("invalid colour {input:?}: expected 3 or 4 components, found {found}")]
    ComponentCount { input: String, found: usize },
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    /// Parses `"r,g,b,a"`. Alpha may be omitted and defaults to 1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| ColorParseError::InvalidComponent {
                input: s.to_string(),
                source,
            })?;
        match parts.as_slice() {
            [r, g, b] => Ok(Rgba::new(*r, *g, *b, 1.0)),
            [r, g, b, a] => Ok(Rgba::new(*r, *g, *b, *a)),
            _ => Err(ColorParseError::ComponentCount {
                input: s.to_string(),
                found: parts.len(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextAlignment {
    Natural,
    Center,
    Right,
}

/// Indentation of one paragraph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ParagraphStyle {
    /// Indent of the first line.
    pub first_line_head_indent: f32,
    /// Indent of wrapped continuation lines.
    pub head_indent: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AttributeKey {
    FontFamily,
    FontSize,
    Bold,
    Italic,
    ForegroundColor,
    BackgroundColor,
    Strikethrough,
    Alignment,
    ParagraphStyle,
    /// Target of a link.
    Link,
    /// Style-table sentinel: names the element attribute that holds the link
    /// target (e.g. `href`). Never present on output runs.
    LinkAttribute,
    /// Marks text belonging to a code paragraph, one per source line.
    CodeParagraph,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AttributeValue {
    Bool(bool),
    Number(f32),
    Text(String),
    Color(Rgba),
    Alignment(TextAlignment),
    Paragraph(ParagraphStyle),
}

/// Resolved attributes of a style or a text run.
pub type Attributes = BTreeMap<AttributeKey, AttributeValue>;

/// Merges `layers` bottom to top, later layers winning per key.
pub fn merge_attributes<'a>(layers: impl IntoIterator<Item = &'a Attributes>) -> Attributes {
    let mut merged = Attributes::new();
    for layer in layers {
        merged.extend(layer.iter().map(|(k, v)| (*k, v.clone())));
    }
    merged
}
