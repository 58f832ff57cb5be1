use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use thiserror::Error;

use crate::localization::Localizer;

use super::element::{SlimXmlElement, XmlAttributes, escape_text, unescape};

/// Malformed XML, reported with a 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("XML parse error at line {line}: {message}")]
pub struct XmlParseError {
    pub line: usize,
    pub message: String,
}

/// Receives parse events in document order.
///
/// Every consumer of trail XML (trail builder, styler, response parser,
/// element extractor) implements this one trait.
pub trait SlimXmlParserDelegate {
    fn did_start_element(&mut self, _element: &SlimXmlElement) {}

    fn did_end_element(&mut self, element: &SlimXmlElement);

    fn found_characters(&mut self, _characters: &str) {}

    /// Whether the element about to be opened should accumulate the raw
    /// markup of its descendants.
    fn should_capture_element_content(&mut self, _name: &str, _attributes: &XmlAttributes) -> bool {
        false
    }

    /// Whether an element with this name may have its captured content
    /// replaced from the string table (keyed by its `id` attribute).
    fn should_localize_element_with_id(&mut self, _name: &str) -> bool {
        false
    }

    fn parse_error_occurred(&mut self, error: &XmlParseError) {
        log::error!("{error}");
    }
}

/// Streaming parser that drives a [`SlimXmlParserDelegate`] and maintains
/// the content-capture stack.
pub struct SlimXmlParser<'a> {
    xml: &'a str,
    localizer: Option<&'a dyn Localizer>,
}

/// A localized substitution made while closing an element: the captured
/// text that was replaced and its replacement.
struct Substitution {
    original: String,
    localized: String,
}

impl<'a> SlimXmlParser<'a> {
    pub fn new(xml: &'a str) -> Self {
        Self {
            xml,
            localizer: None,
        }
    }

    /// Enables localization. Without a localizer no substitution happens.
    pub fn with_localizer(mut self, localizer: Option<&'a dyn Localizer>) -> Self {
        self.localizer = localizer;
        self
    }

    /// Parses the whole document, calling the delegate for every event.
    ///
    /// On malformed input the delegate's `parse_error_occurred` is called
    /// and the same error is returned. Events already delivered stand.
    pub fn parse<D>(&self, delegate: &mut D) -> Result<(), XmlParseError>
    where
        D: SlimXmlParserDelegate + ?Sized,
    {
        let result = self.drive(delegate);
        if let Err(error) = &result {
            delegate.parse_error_occurred(error);
        }
        result
    }

    fn drive<D>(&self, delegate: &mut D) -> Result<(), XmlParseError>
    where
        D: SlimXmlParserDelegate + ?Sized,
    {
        let mut reader = Reader::from_str(self.xml);
        reader.config_mut().trim_text(false);
        let mut stack: Vec<SlimXmlElement> = Vec::new();

        loop {
            let pos = reader.buffer_position() as usize;
            let event = reader
                .read_event()
                .map_err(|e| self.error_at(reader.buffer_position() as usize, e.to_string()))?;

            match event {
                XmlEvent::Start(e) => {
                    let element = self.element_from(&e, pos)?;
                    self.start_element(&mut stack, element, delegate);
                }
                XmlEvent::Empty(e) => {
                    let element = self.element_from(&e, pos)?;
                    self.start_element(&mut stack, element, delegate);
                    self.end_element(&mut stack, delegate);
                }
                XmlEvent::Text(e) => {
                    let raw = std::str::from_utf8(&e).map_err(|e| self.error_at(pos, e.to_string()))?;
                    self.characters(&mut stack, &unescape(raw), delegate);
                }
                XmlEvent::CData(e) => {
                    let raw = std::str::from_utf8(&e).map_err(|e| self.error_at(pos, e.to_string()))?;
                    self.characters(&mut stack, raw, delegate);
                }
                XmlEvent::End(_) => self.end_element(&mut stack, delegate),
                XmlEvent::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(self.error_at(
                self.xml.len(),
                format!("unexpected end of document, <{}> is not closed", open.name),
            ));
        }
        Ok(())
    }

    fn start_element<D>(&self, stack: &mut Vec<SlimXmlElement>, mut element: SlimXmlElement, delegate: &mut D)
    where
        D: SlimXmlParserDelegate + ?Sized,
    {
        let open_tag = element.start_tag();
        for ancestor in stack.iter_mut().rev().filter(|e| e.should_capture_content) {
            ancestor.content.push_str(&open_tag);
        }

        element.should_capture_content =
            delegate.should_capture_element_content(&element.name, &element.attributes);
        delegate.did_start_element(&element);
        stack.push(element);
    }

    fn characters<D>(&self, stack: &mut [SlimXmlElement], text: &str, delegate: &mut D)
    where
        D: SlimXmlParserDelegate + ?Sized,
    {
        let escaped = escape_text(text);
        for ancestor in stack.iter_mut().rev().filter(|e| e.should_capture_content) {
            ancestor.content.push_str(&escaped);
        }
        delegate.found_characters(text);
    }

    fn end_element<D>(&self, stack: &mut Vec<SlimXmlElement>, delegate: &mut D)
    where
        D: SlimXmlParserDelegate + ?Sized,
    {
        let Some(mut element) = stack.pop() else {
            return;
        };

        let substitution = self.localize(&mut element, delegate);
        delegate.did_end_element(&element);

        let open_tag = element.start_tag();
        let close_tag = element.end_tag();
        for ancestor in stack.iter_mut().rev().filter(|e| e.should_capture_content) {
            if let Some(sub) = &substitution
                && ancestor.content.ends_with(&sub.original)
            {
                // The pre-localized text was the last thing appended.
                let keep = ancestor.content.len() - sub.original.len();
                ancestor.content.truncate(keep);
                ancestor.content.push_str(&sub.localized);
            }

            if ancestor.content.ends_with(&open_tag) {
                let keep = ancestor.content.len() - open_tag.len();
                ancestor.content.truncate(keep);
                ancestor.content.push_str(&element.empty_tag());
            } else {
                ancestor.content.push_str(&close_tag);
            }
        }
    }

    fn localize<D>(&self, element: &mut SlimXmlElement, delegate: &mut D) -> Option<Substitution>
    where
        D: SlimXmlParserDelegate + ?Sized,
    {
        let localizer = self.localizer?;
        if !element.should_capture_content || !delegate.should_localize_element_with_id(&element.name) {
            return None;
        }
        let id = element.attribute("id")?;
        let localized = localizer.localized_string(id, &element.content);
        if localized == element.content {
            return None;
        }
        log::debug!("localized <{} id=\"{id}\">", element.name);
        let original = std::mem::replace(&mut element.content, localized.clone());
        Some(Substitution { original, localized })
    }

    fn element_from(&self, start: &BytesStart<'_>, pos: usize) -> Result<SlimXmlElement, XmlParseError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = XmlAttributes::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.error_at(pos, e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = unescape(&String::from_utf8_lossy(&attr.value));
            attributes.insert(key, value);
        }
        Ok(SlimXmlElement::new(name, attributes))
    }

    fn error_at(&self, pos: usize, message: String) -> XmlParseError {
        let end = pos.min(self.xml.len());
        let line = self.xml.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1;
        XmlParseError { line, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localization::StringTable;
    use pretty_assertions::assert_eq;

    /// Captures every element named `capture` and records finished elements.
    #[derive(Default)]
    struct Recorder {
        capture: Vec<&'static str>,
        localize: Vec<&'static str>,
        events: Vec<String>,
        finished: Vec<SlimXmlElement>,
        errors: Vec<XmlParseError>,
    }

    impl SlimXmlParserDelegate for Recorder {
        fn did_start_element(&mut self, element: &SlimXmlElement) {
            self.events.push(format!("start:{}", element.name));
        }

        fn did_end_element(&mut self, element: &SlimXmlElement) {
            self.events.push(format!("end:{}", element.name));
            self.finished.push(element.clone());
        }

        fn found_characters(&mut self, characters: &str) {
            self.events.push(format!("text:{characters}"));
        }

        fn should_capture_element_content(&mut self, name: &str, _: &XmlAttributes) -> bool {
            self.capture.contains(&name)
        }

        fn should_localize_element_with_id(&mut self, name: &str) -> bool {
            self.localize.contains(&name)
        }

        fn parse_error_occurred(&mut self, error: &XmlParseError) {
            self.errors.push(error.clone());
        }
    }

    fn captured(xml: &str, name: &'static str) -> String {
        let mut recorder = Recorder {
            capture: vec![name],
            ..Default::default()
        };
        SlimXmlParser::new(xml).parse(&mut recorder).unwrap();
        recorder
            .finished
            .into_iter()
            .find(|e| e.name == name)
            .map(|e| e.content)
            .unwrap()
    }

    #[test]
    fn events_arrive_in_document_order() {
        let mut recorder = Recorder::default();
        SlimXmlParser::new("<a>x<b/>y</a>").parse(&mut recorder).unwrap();
        assert_eq!(
            recorder.events,
            vec!["start:a", "text:x", "start:b", "end:b", "text:y", "end:a"]
        );
    }

    #[test]
    fn captures_nested_markup() {
        let content = captured(
            r#"<block type="text"><text>Hello <b>bold</b> <a href="x">link</a></text></block>"#,
            "block",
        );
        assert_eq!(content, r#"<text>Hello <b>bold</b> <a href="x">link</a></text>"#);
    }

    #[test]
    fn empty_element_pair_collapses_to_self_closing() {
        assert_eq!(captured("<block><br></br></block>", "block"), "<br/>");
        assert_eq!(
            captured(r#"<block>a<icon name="play"></icon>b</block>"#, "block"),
            r#"a<icon name="play"/>b"#
        );
    }

    #[test]
    fn element_with_empty_text_is_not_collapsed_when_text_present() {
        assert_eq!(captured("<block><b>x</b></block>", "block"), "<b>x</b>");
    }

    #[test]
    fn character_data_is_reescaped() {
        assert_eq!(
            captured("<block>a &lt; b &amp;&amp; c</block>", "block"),
            "a &lt; b &amp;&amp; c"
        );
    }

    #[test]
    fn cdata_is_captured_as_escaped_text() {
        assert_eq!(
            captured("<block><![CDATA[if a < b {}]]></block>", "block"),
            "if a &lt; b {}"
        );
    }

    #[test]
    fn every_capturing_ancestor_receives_content() {
        let mut recorder = Recorder {
            capture: vec!["outer", "inner"],
            ..Default::default()
        };
        SlimXmlParser::new("<outer><mid><inner>t</inner></mid></outer>")
            .parse(&mut recorder)
            .unwrap();
        let inner = recorder.finished.iter().find(|e| e.name == "inner").unwrap();
        let outer = recorder.finished.iter().find(|e| e.name == "outer").unwrap();
        assert_eq!(inner.content, "t");
        assert_eq!(outer.content, "<mid><inner>t</inner></mid>");
    }

    #[test]
    fn content_outside_capturing_elements_is_not_buffered() {
        let mut recorder = Recorder::default();
        SlimXmlParser::new("<a><b>text</b></a>").parse(&mut recorder).unwrap();
        assert!(recorder.finished.iter().all(|e| e.content.is_empty()));
    }

    #[test]
    fn localized_content_replaces_captured_text_in_ancestors() {
        let table = StringTable::from_pairs([("intro", "Bonjour")]);
        let mut recorder = Recorder {
            capture: vec!["block", "text"],
            localize: vec!["text"],
            ..Default::default()
        };
        SlimXmlParser::new(r#"<block><text id="intro">Hello</text></block>"#)
            .with_localizer(Some(&table))
            .parse(&mut recorder)
            .unwrap();

        let text = recorder.finished.iter().find(|e| e.name == "text").unwrap();
        let block = recorder.finished.iter().find(|e| e.name == "block").unwrap();
        assert_eq!(text.content, "Bonjour");
        assert_eq!(block.content, r#"<text id="intro">Bonjour</text>"#);
    }

    #[test]
    fn localization_falls_back_to_captured_content() {
        let table = StringTable::default();
        let mut recorder = Recorder {
            capture: vec!["block", "text"],
            localize: vec!["text"],
            ..Default::default()
        };
        SlimXmlParser::new(r#"<block><text id="missing">Hello</text></block>"#)
            .with_localizer(Some(&table))
            .parse(&mut recorder)
            .unwrap();
        let block = recorder.finished.iter().find(|e| e.name == "block").unwrap();
        assert_eq!(block.content, r#"<text id="missing">Hello</text>"#);
    }

    #[test]
    fn uncaptured_elements_are_not_localized() {
        let table = StringTable::from_pairs([("intro", "Bonjour")]);
        let mut recorder = Recorder {
            capture: vec!["block"],
            localize: vec!["text"],
            ..Default::default()
        };
        SlimXmlParser::new(r#"<block><text id="intro">Hello</text></block>"#)
            .with_localizer(Some(&table))
            .parse(&mut recorder)
            .unwrap();

        let block = recorder.finished.iter().find(|e| e.name == "block").unwrap();
        assert_eq!(block.content, r#"<text id="intro">Hello</text>"#);
    }

    #[test]
    fn localization_requires_a_localizer() {
        let mut recorder = Recorder {
            capture: vec!["text"],
            localize: vec!["text"],
            ..Default::default()
        };
        SlimXmlParser::new(r#"<text id="intro">Hello</text>"#)
            .parse(&mut recorder)
            .unwrap();
        assert_eq!(recorder.finished[0].content, "Hello");
    }

    #[test]
    fn mismatched_end_tag_reports_line() {
        let mut recorder = Recorder::default();
        let err = SlimXmlParser::new("<a>\n<b>\n</a>")
            .parse(&mut recorder)
            .unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(recorder.errors, vec![err]);
    }

    #[test]
    fn unclosed_element_is_an_error() {
        let mut recorder = Recorder::default();
        let result = SlimXmlParser::new("<a>\n<b></b>\n").parse(&mut recorder);
        assert!(result.is_err());
        assert_eq!(recorder.errors.len(), 1);
    }
}
