use std::collections::HashMap;

use super::attributes::{AttributeKey, AttributeValue, Attributes, Rgba, TextAlignment};

pub const MONOSPACE_FONT: &str = "Menlo";
pub const SYSTEM_FONT: &str = "System";
pub const SYMBOL_FONT: &str = "SF Symbols";

/// Sizes used by code auto-indentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndentOptions {
    /// Width of one nesting level.
    pub indent_unit: f32,
    /// Extra indent of wrapped continuation lines.
    pub wrap_unit: f32,
}

impl IndentOptions {
    /// Derives indentation from the font size: two monospace columns per
    /// level, one extra column for wrapped lines.
    pub fn for_font_size(font_size: f32) -> Self {
        let column = font_size * 0.6;
        Self {
            indent_unit: column * 2.0,
            wrap_unit: column,
        }
    }
}

impl Default for IndentOptions {
    fn default() -> Self {
        Self::for_font_size(AttributedStringStyle::DEFAULT_FONT_SIZE)
    }
}

/// Table of named styles keyed by element tag, plus the base font size and
/// tint colour they were built for.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributedStringStyle {
    pub font_size: f32,
    pub tint_color: Rgba,
    pub indent: IndentOptions,
    styles: HashMap<String, Attributes>,
}

impl AttributedStringStyle {
    pub const DEFAULT_FONT_SIZE: f32 = 17.0;

    /// A style with no registered tags.
    pub fn new(font_size: f32, tint_color: Rgba) -> Self {
        Self {
            font_size,
            tint_color,
            indent: IndentOptions::for_font_size(font_size),
            styles: HashMap::new(),
        }
    }

    pub fn with_style(mut self, tag: &str, attributes: Attributes) -> Self {
        self.set_style(tag, attributes);
        self
    }

    pub fn set_style(&mut self, tag: &str, attributes: Attributes) {
        self.styles.insert(tag.to_string(), attributes);
    }

    pub fn attributes(&self, tag: &str) -> Option<&Attributes> {
        self.styles.get(tag)
    }

    pub fn has_style(&self, tag: &str) -> bool {
        self.styles.contains_key(tag)
    }

    /// Attributes applied to text outside any styled element.
    pub fn base_attributes(&self) -> Attributes {
        Attributes::from([
            (
                AttributeKey::FontFamily,
                AttributeValue::Text(SYSTEM_FONT.to_string()),
            ),
            (AttributeKey::FontSize, AttributeValue::Number(self.font_size)),
            (AttributeKey::ForegroundColor, AttributeValue::Color(Rgba::BLACK)),
        ])
    }

    /// The standard table for trail block content.
    pub fn trail(font_size: f32, tint_color: Rgba) -> Self {
        use AttributeKey as K;
        use AttributeValue as V;

        let text = |s: &str| V::Text(s.to_string());
        let monospace = Attributes::from([
            (K::FontFamily, text(MONOSPACE_FONT)),
            (K::FontSize, V::Number(font_size * 0.9)),
        ]);

        Self::new(font_size, tint_color)
            .with_style(
                "text",
                Attributes::from([
                    (K::FontFamily, text(SYSTEM_FONT)),
                    (K::FontSize, V::Number(font_size)),
                ]),
            )
            .with_style(
                "title",
                Attributes::from([
                    (K::Bold, V::Bool(true)),
                    (K::FontSize, V::Number(font_size * 1.3)),
                ]),
            )
            .with_style("prompt", Attributes::from([(K::Bold, V::Bool(true))]))
            .with_style("b", Attributes::from([(K::Bold, V::Bool(true))]))
            .with_style("i", Attributes::from([(K::Italic, V::Bool(true))]))
            .with_style(
                "a",
                Attributes::from([
                    (K::LinkAttribute, text("href")),
                    (K::ForegroundColor, V::Color(tint_color)),
                ]),
            )
            .with_style("cv", monospace.clone())
            .with_style(
                "code",
                monospace
                    .into_iter()
                    .chain([
                        (K::CodeParagraph, V::Bool(true)),
                        (K::ParagraphStyle, V::Paragraph(Default::default())),
                    ])
                    .collect(),
            )
            .with_style(
                "cmt",
                Attributes::from([(K::ForegroundColor, V::Color(Rgba::GRAY))]),
            )
            .with_style(
                "task",
                Attributes::from([
                    (K::Bold, V::Bool(true)),
                    (K::ForegroundColor, V::Color(tint_color)),
                ]),
            )
            .with_style(
                "icon",
                Attributes::from([
                    (K::FontFamily, text(SYMBOL_FONT)),
                    (K::ForegroundColor, V::Color(tint_color)),
                ]),
            )
            .with_style("literal", Attributes::from([(K::FontFamily, text(SYSTEM_FONT))]))
            .with_style(
                "placeholder",
                Attributes::from([(
                    K::BackgroundColor,
                    V::Color(tint_color.with_alpha(0.2)),
                )]),
            )
            .with_style("st", Attributes::from([(K::Strikethrough, V::Bool(true))]))
            .with_style(
                "right",
                Attributes::from([(K::Alignment, V::Alignment(TextAlignment::Right))]),
            )
            .with_style(
                "center",
                Attributes::from([(K::Alignment, V::Alignment(TextAlignment::Center))]),
            )
    }
}

impl Default for AttributedStringStyle {
    fn default() -> Self {
        Self::trail(Self::DEFAULT_FONT_SIZE, Rgba::SYSTEM_BLUE)
    }
}
