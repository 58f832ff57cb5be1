//! # Styling
//!
//! Turns captured trail markup into attributed text.
//!
//! ## Pipeline
//!
//! 1. **Preprocess** (`preprocess`): only for fragments containing `<code>`.
//!    Colour/image literals and `<#placeholder#>` tokens become tags, and
//!    newlines inside code become `<br/>`.
//! 2. **Style** (`styler`): the fragment is re-parsed with the slim parser;
//!    every element with a registered style pushes its attributes and text
//!    runs take the merge of the whole stack.
//! 3. **Indent** (`indent`): code lines get paragraph indentation from a
//!    running bracket depth.

pub mod attributes;
pub mod indent;
pub mod preprocess;
pub mod style;
pub mod styled_text;
pub mod styler;

pub use attributes::{
    AttributeKey, AttributeValue, Attributes, ColorParseError, ParagraphStyle, Rgba, TextAlignment,
    merge_attributes,
};
pub use indent::auto_indent;
pub use style::{AttributedStringStyle, IndentOptions};
pub use styled_text::{StyledText, TextRun};
pub use styler::{AttributedStringStyler, TASK_PREFIX, icon_glyph};
