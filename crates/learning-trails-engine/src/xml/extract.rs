use super::element::{SlimXmlElement, XmlAttributes};
use super::parser::{SlimXmlParser, SlimXmlParserDelegate};

/// An element pulled out of a fragment by [`get_elements_in`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedElement {
    pub name: String,
    /// Captured inner markup.
    pub content: String,
    pub attributes: XmlAttributes,
}

struct ElementExtractor<'n> {
    name: &'n str,
    found: Vec<ExtractedElement>,
}

impl SlimXmlParserDelegate for ElementExtractor<'_> {
    fn should_capture_element_content(&mut self, name: &str, _attributes: &XmlAttributes) -> bool {
        name == self.name
    }

    fn did_end_element(&mut self, element: &SlimXmlElement) {
        if element.name == self.name {
            self.found.push(ExtractedElement {
                name: element.name.clone(),
                content: element.content.clone(),
                attributes: element.attributes.clone(),
            });
        }
    }
}

/// Returns every element called `name` in `xml`, in document order.
///
/// Nested matches are returned in closing order. Malformed input is logged
/// and whatever was found before the error is returned.
pub fn get_elements_in(xml: &str, name: &str) -> Vec<ExtractedElement> {
    let mut extractor = ElementExtractor {
        name,
        found: Vec::new(),
    };
    // Fragments may carry several top-level elements or bare text.
    let wrapped = format!("<fragment>{xml}</fragment>");
    if let Err(e) = SlimXmlParser::new(&wrapped).parse(&mut extractor) {
        log::warn!("could not extract <{name}> elements: {e}");
    }
    extractor.found
}
