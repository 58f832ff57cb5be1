use crate::xml::{SlimXmlElement, SlimXmlParser, SlimXmlParserDelegate, XmlParseError};

use super::attributes::{AttributeKey, AttributeValue, Attributes, Rgba, merge_attributes};
use super::indent::auto_indent;
use super::preprocess::{contains_code, preprocess_code};
use super::style::AttributedStringStyle;
use super::styled_text::StyledText;

/// Prefix emitted for `<task/>`.
pub const TASK_PREFIX: &str = "→ ";

const LINE_BREAK_TAG: &str = "br";
const PARAGRAPH_TAG: &str = "p";
const TASK_TAG: &str = "task";
const ICON_TAG: &str = "icon";

/// Glyph for an `<icon name="..."/>`.
pub fn icon_glyph(name: &str) -> Option<&'static str> {
    let glyph = match name {
        "play" => "▶︎",
        "run" => "▶︎",
        "stop" => "◼︎",
        "checkmark" => "✓",
        "cross" => "✗",
        "warning" => "⚠︎",
        "info" => "ⓘ",
        "hint" => "💡",
        "star" => "★",
        "arrow" => "→",
        "share" => "⇪",
        _ => return None,
    };
    Some(glyph)
}

/// Converts captured trail markup into [`StyledText`] by cascading the
/// styles registered for each open element.
///
/// Never captures content: it consumes events only.
pub struct AttributedStringStyler<'s> {
    style: &'s AttributedStringStyle,
    base: Attributes,
    stack: Vec<Attributes>,
    current: Attributes,
    output: StyledText,
}

impl<'s> AttributedStringStyler<'s> {
    pub fn new(style: &'s AttributedStringStyle) -> Self {
        let base = style.base_attributes();
        Self {
            style,
            current: base.clone(),
            base,
            stack: Vec::new(),
            output: StyledText::new(),
        }
    }

    /// Full pipeline: code preprocessing, styling, auto-indent.
    pub fn styled_text(xml: &str, style: &AttributedStringStyle) -> Result<StyledText, XmlParseError> {
        let has_code = contains_code(xml);
        let source = if has_code {
            preprocess_code(xml)
        } else {
            xml.to_string()
        };

        let mut styler = AttributedStringStyler::new(style);
        SlimXmlParser::new(&source).parse(&mut styler)?;
        let mut text = styler.finish();

        if has_code {
            auto_indent(&mut text, &style.indent);
        }
        Ok(text)
    }

    pub fn finish(self) -> StyledText {
        self.output
    }

    fn recompute(&mut self) {
        self.current = merge_attributes(std::iter::once(&self.base).chain(self.stack.iter()));
    }

    fn resolve(&self, element: &SlimXmlElement, style: &Attributes) -> Attributes {
        let mut attributes = style.clone();
        if let Some(AttributeValue::Text(link_attribute)) =
            attributes.remove(&AttributeKey::LinkAttribute)
            && let Some(target) = element.attribute(&link_attribute)
        {
            attributes.insert(AttributeKey::Link, AttributeValue::Text(target.to_string()));
        }
        if let Some(color) = element.attribute("color") {
            match color.parse::<Rgba>() {
                Ok(color) => {
                    attributes.insert(AttributeKey::ForegroundColor, AttributeValue::Color(color));
                }
                Err(e) => log::warn!("ignoring color on <{}>: {e}", element.name),
            }
        }
        attributes
    }

    fn append_with_style(&mut self, text: &str, tag: &str) {
        let attributes = match self.style.attributes(tag) {
            Some(style) => merge_attributes([&self.base, style]),
            None => self.base.clone(),
        };
        self.output.push(text, &attributes);
    }
}

impl SlimXmlParserDelegate for AttributedStringStyler<'_> {
    fn did_start_element(&mut self, element: &SlimXmlElement) {
        if let Some(style) = self.style.attributes(&element.name) {
            let resolved = self.resolve(element, style);
            self.stack.push(resolved);
            self.recompute();
        }
    }

    fn found_characters(&mut self, characters: &str) {
        self.output.push(characters, &self.current);
    }

    fn did_end_element(&mut self, element: &SlimXmlElement) {
        match element.name.as_str() {
            LINE_BREAK_TAG => {
                let mut attributes = self.current.clone();
                attributes.remove(&AttributeKey::CodeParagraph);
                self.output.push("\n", &attributes);
            }
            PARAGRAPH_TAG => {
                let attributes = self.current.clone();
                self.output.push("\n\r", &attributes);
            }
            TASK_TAG => self.append_with_style(TASK_PREFIX, TASK_TAG),
            ICON_TAG => match element.attribute("name").and_then(icon_glyph) {
                Some(glyph) => self.append_with_style(glyph, ICON_TAG),
                None => log::debug!("unknown icon {:?}", element.attribute("name")),
            },
            _ => {}
        }

        if self.style.has_style(&element.name) {
            self.stack.pop();
            self.recompute();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styling::attributes::ParagraphStyle;
    use pretty_assertions::assert_eq;

    fn style() -> AttributedStringStyle {
        AttributedStringStyle::default()
    }

    fn render(xml: &str) -> StyledText {
        AttributedStringStyler::styled_text(xml, &style()).unwrap()
    }

    fn run_with<'a>(text: &'a StyledText, needle: &str) -> &'a Attributes {
        &text
            .runs()
            .iter()
            .find(|r| r.text.contains(needle))
            .unwrap_or_else(|| panic!("no run containing {needle:?}"))
            .attributes
    }

    #[test]
    fn innermost_style_wins_and_outer_keys_are_inherited() {
        let red = Rgba::new(1.0, 0.0, 0.0, 1.0);
        let blue = Rgba::new(0.0, 0.0, 1.0, 1.0);
        let style = AttributedStringStyle::new(17.0, Rgba::SYSTEM_BLUE)
            .with_style(
                "a",
                Attributes::from([
                    (AttributeKey::ForegroundColor, AttributeValue::Color(red)),
                    (AttributeKey::FontSize, AttributeValue::Number(12.0)),
                ]),
            )
            .with_style(
                "b",
                Attributes::from([(AttributeKey::ForegroundColor, AttributeValue::Color(blue))]),
            );

        let text = AttributedStringStyler::styled_text("<a><b>text</b></a>", &style).unwrap();
        let attrs = run_with(&text, "text");
        assert_eq!(
            attrs.get(&AttributeKey::ForegroundColor),
            Some(&AttributeValue::Color(blue))
        );
        assert_eq!(
            attrs.get(&AttributeKey::FontSize),
            Some(&AttributeValue::Number(12.0))
        );
    }

    #[test]
    fn style_is_restored_after_element_closes() {
        let text = render("<text>plain <b>bold</b> again</text>");
        assert_eq!(text.plain_text(), "plain bold again");
        assert_eq!(
            run_with(&text, "bold").get(&AttributeKey::Bold),
            Some(&AttributeValue::Bool(true))
        );
        assert_eq!(run_with(&text, "again").get(&AttributeKey::Bold), None);
    }

    #[test]
    fn link_attribute_injects_target_without_sentinel() {
        let text = render(r#"<text>see <a href="https://example.com">docs</a></text>"#);
        let attrs = run_with(&text, "docs");
        assert_eq!(
            attrs.get(&AttributeKey::Link),
            Some(&AttributeValue::Text("https://example.com".into()))
        );
        assert_eq!(attrs.get(&AttributeKey::LinkAttribute), None);
    }

    #[test]
    fn color_attribute_overrides_foreground_after_link() {
        let text = render(r#"<text><a href="x" color="1,0,0,1">red link</a></text>"#);
        let attrs = run_with(&text, "red link");
        assert_eq!(
            attrs.get(&AttributeKey::ForegroundColor),
            Some(&AttributeValue::Color(Rgba::new(1.0, 0.0, 0.0, 1.0)))
        );
        assert!(attrs.contains_key(&AttributeKey::Link));
    }

    #[test]
    fn unstyled_elements_pass_text_through() {
        let text = render("<text><unknown>inner</unknown></text>");
        assert_eq!(text.plain_text(), "inner");
    }

    #[test]
    fn line_and_paragraph_breaks() {
        let text = render("<text>one<br/>two<p/>three</text>");
        assert_eq!(text.plain_text(), "one\ntwo\n\rthree");
    }

    #[test]
    fn task_and_icon_glyphs_use_their_styles() {
        let text = render(r#"<text><task/>Tap <icon name="play"/></text>"#);
        assert_eq!(text.plain_text(), "→ Tap ▶︎");
        assert_eq!(
            run_with(&text, "→").get(&AttributeKey::Bold),
            Some(&AttributeValue::Bool(true))
        );
        assert_eq!(
            run_with(&text, "▶︎").get(&AttributeKey::FontFamily),
            Some(&AttributeValue::Text("SF Symbols".into()))
        );
    }

    #[test]
    fn unknown_icon_is_skipped() {
        let text = render(r#"<text>a<icon name="nope"/>b</text>"#);
        assert_eq!(text.plain_text(), "ab");
    }

    #[test]
    fn line_breaks_in_code_drop_code_marker() {
        let text = render("<code>a {<br/>b</code>");
        let newline = text.runs().iter().find(|r| r.text == "\n").unwrap();
        assert!(!newline.is_code());
    }

    #[test]
    fn code_is_preprocessed_and_indented() {
        let style = style();
        let text = AttributedStringStyler::styled_text(
            "<code>if (x) {\n  y(#colorLiteral(red: 1, green: 0, blue: 0, alpha: 1))\n}</code>",
            &style,
        )
        .unwrap();

        assert_eq!(text.plain_text(), "if (x) {\n  y(■)\n}");
        let indents: Vec<f32> = text
            .runs()
            .iter()
            .filter(|r| r.is_code())
            .filter_map(|r| r.paragraph_style())
            .map(|p: ParagraphStyle| p.first_line_head_indent)
            .collect();
        let unit = style.indent.indent_unit;
        // "  y(", the literal glyph and ")" are three runs on the second line.
        assert_eq!(indents, vec![0.0, unit, unit, unit, 0.0]);

        let glyph = run_with(&text, "■");
        assert_eq!(
            glyph.get(&AttributeKey::ForegroundColor),
            Some(&AttributeValue::Color(Rgba::new(1.0, 0.0, 0.0, 1.0)))
        );
    }

    #[test]
    fn placeholder_in_code_is_styled() {
        let text = render("<code>move(&lt;#steps#&gt;)</code>");
        assert_eq!(text.plain_text(), "move(steps)");
        assert!(run_with(&text, "steps").contains_key(&AttributeKey::BackgroundColor));
    }

    #[test]
    fn malformed_markup_is_an_error() {
        assert!(AttributedStringStyler::styled_text("<text><b>x</text>", &style()).is_err());
    }
}
