//! # Trail model
//!
//! A trail owns its steps, a step owns one root block, and blocks own their
//! children. Nothing points back up by reference: a block knows its step by
//! [`StepId`] and a step knows its trail by identifier.
//!
//! ## Parsing
//!
//! `LearningTrail::parse` drives the slim XML parser with a builder that
//! captures every `<block>` body as raw XML. Blocks with a missing or
//! unknown type are logged and skipped. Only a syntax error or a trail
//! without a name fails the parse.
//!
//! ## Modules
//!
//! - **`block`**: `LearningBlock`, visibility and group-level passes
//! - **`step`**: `LearningStep`, disclosure toggling, saved response state
//! - **`learning_trail`**: `LearningTrail`, roll-up, reload diffing, page state
//! - **`interactive`**: buttons and hotspots inside block bodies
//! - **`builder`**: the parser delegate that assembles a trail

mod builder;
pub mod block;
pub mod interactive;
pub mod learning_trail;
pub mod step;

pub use block::{BlockType, LearningBlock, StepId};
pub use interactive::{Carat, Hotspot, Interactive, InteractiveAction, InteractiveButton};
pub use learning_trail::{LearningTrail, TrailError};
pub use step::{AssessmentState, LearningStep, StepType};
