//! # Responses
//!
//! Quiz blocks and their assessment.
//!
//! A [`LearningResponse`] is rebuilt from its block's XML whenever it is
//! needed; only option selections and the confirmed flag live in the
//! key-value store.
//!
//! ## Modules
//!
//! - **`option`**: `LearningResponseOption` and its correctness type
//! - **`learning_response`**: parsing, selection, persistence
//! - **`assessment`**: `LearningAssessmentManager` and page status

pub mod assessment;
pub mod learning_response;
pub mod option;

pub use assessment::{
    LearningAssessmentManager, MemoryPageStatus, PageAssessmentStatus, PageStatusRecorder,
};
pub use learning_response::{LearningResponse, ResponseType, StateError};
pub use option::{LearningResponseOption, OptionType};
