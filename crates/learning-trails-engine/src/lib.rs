//! # Learning trails engine
//!
//! Parses learning-trail XML into a step/block model, renders block markup
//! into attributed text, and tracks quiz answers and assessment state.
//!
//! ## Modules
//!
//! - **`xml`**: delegate-driven parser with content capture and localization
//! - **`styling`**: styles, the attributed-text styler and code auto-indent
//! - **`trail`**: trails, steps, blocks and the parser that builds them
//! - **`response`**: quiz responses, saved state and assessment roll-up
//! - **`store`**: the key-value store responses and page state live in
//! - **`io`**: loading trails, string tables and file-backed stores

pub mod io;
pub mod localization;
pub mod options;
pub mod response;
pub mod store;
pub mod styling;
pub mod trail;
pub mod xml;


// Re-export key types for easier usage
pub use io::{FileStore, IoError, load_trail, reload_trail};
pub use localization::{Localizer, StringTable};
pub use options::ParseOptions;
pub use response::{
    LearningAssessmentManager, LearningResponse, LearningResponseOption, PageAssessmentStatus,
    PageStatusRecorder, StateError,
};
pub use store::{KeyValueStore, MemoryStore, StoreValue};
pub use styling::{AttributedStringStyle, AttributedStringStyler, StyledText};
pub use trail::{AssessmentState, BlockType, LearningBlock, LearningStep, LearningTrail, TrailError};
pub use xml::{SlimXmlParser, SlimXmlParserDelegate, XmlParseError};
