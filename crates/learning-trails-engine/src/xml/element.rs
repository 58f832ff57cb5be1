use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Attribute map of an element. Ordered so that re-serialized tags are stable.
pub type XmlAttributes = BTreeMap<String, String>;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// An element that is currently open (or has just been closed) in the parser.
///
/// Only the parser's element stack owns these. Delegates see them by
/// reference when the element starts and again, finalized, when it ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlimXmlElement {
    pub name: String,
    pub attributes: XmlAttributes,
    /// Decided by the delegate when the start tag is seen.
    pub should_capture_content: bool,
    /// Re-serialized markup of all descendants. Empty unless capturing.
    pub content: String,
}

impl SlimXmlElement {
    pub fn new(name: impl Into<String>, attributes: XmlAttributes) -> Self {
        Self {
            name: name.into(),
            attributes,
            should_capture_content: false,
            content: String::new(),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// `<name a="1" b="2">`, attribute values escaped.
    pub fn start_tag(&self) -> String {
        format!("<{}{}>", self.name, self.attribute_text())
    }

    pub fn end_tag(&self) -> String {
        format!("</{}>", self.name)
    }

    /// `<name a="1"/>`
    pub fn empty_tag(&self) -> String {
        format!("<{}{}/>", self.name, self.attribute_text())
    }

    /// Captured content with tags stripped and entities decoded.
    pub fn plain_content(&self) -> String {
        plain_text(&self.content)
    }

    /// Captured content wrapped in this element's own tags.
    ///
    /// Leading and trailing newlines of the content are trimmed first. An
    /// element without content renders self-closing.
    pub fn xml_content(&self) -> String {
        let inner = self.content.trim_matches(['\n', '\r']);
        if inner.is_empty() {
            self.empty_tag()
        } else {
            format!("{}{}{}", self.start_tag(), inner, self.end_tag())
        }
    }

    fn attribute_text(&self) -> String {
        self.attributes
            .iter()
            .map(|(key, value)| format!(" {key}=\"{}\"", escape_attribute(value)))
            .collect()
    }
}

/// Escapes character data for re-serialization.
pub(crate) fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

pub(crate) fn escape_attribute(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

pub(crate) fn unescape(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Strips all tags from an XML fragment and decodes entities.
pub fn plain_text(xml: &str) -> String {
    unescape(&TAG.replace_all(xml, ""))
}
