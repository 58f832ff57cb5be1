//! # Slim XML parsing
//!
//! A streaming, delegate-driven XML layer over `quick-xml`.
//!
//! ## Content capture
//!
//! The parser keeps an explicit stack of open [`SlimXmlElement`]s. When the
//! delegate asks for an element's content to be captured, every start tag,
//! character run and end tag seen inside it is re-serialized and appended to
//! that element's `content`. Capture is transitive: an element receives the
//! markup of all its descendants, not just its direct children. Content
//! outside any capturing element is never buffered.
//!
//! Empty elements collapse to the self-closing form (`<br></br>` is captured
//! as `<br/>`), which downstream consumers rely on.
//!
//! ## Modules
//!
//! - **`element`**: `SlimXmlElement` plus the tag/escape helpers
//! - **`parser`**: `SlimXmlParser` and the `SlimXmlParserDelegate` trait
//! - **`extract`**: `get_elements_in` one-shot extraction of named elements

pub mod element;
pub mod extract;
pub mod parser;

pub use element::{SlimXmlElement, XmlAttributes, plain_text};
pub use extract::{ExtractedElement, get_elements_in};
pub use parser::{SlimXmlParser, SlimXmlParserDelegate, XmlParseError};
