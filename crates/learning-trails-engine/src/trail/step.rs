use serde::Serialize;

use crate::response::LearningResponse;
use crate::store::KeyValueStore;

use super::block::{BlockType, LearningBlock, StepId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Check,
    Code,
    Context,
    Experiment,
    Find,
    #[default]
    Unknown,
}

impl StepType {
    pub fn from_attribute(value: &str) -> Self {
        match value {
            "check" => StepType::Check,
            "code" => StepType::Code,
            "context" => StepType::Context,
            "experiment" => StepType::Experiment,
            "find" => StepType::Find,
            _ => StepType::Unknown,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            StepType::Check => "Check",
            StepType::Code => "Code",
            StepType::Context => "Context",
            StepType::Experiment => "Experiment",
            StepType::Find => "Find",
            StepType::Unknown => "",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AssessmentState {
    #[default]
    Unknown,
    NotAssessable,
    PartiallyCompleted,
    CompletedFailed,
    CompletedSuccessfully,
}

/// One page of a trail.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningStep {
    pub identifier: String,
    pub index: usize,
    pub step_type: StepType,
    /// Identifier of the owning trail.
    pub trail_identifier: String,
    pub title: Option<String>,
    pub root_block: LearningBlock,
    pub is_assessable: bool,
    pub assessment_state: AssessmentState,
    state_has_been_loaded: bool,
}

impl LearningStep {
    pub fn new(
        identifier: impl Into<String>,
        index: usize,
        step_type: StepType,
        trail_identifier: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            index,
            step_type,
            trail_identifier: trail_identifier.into(),
            title: None,
            root_block: LearningBlock::root(StepId(index)),
            is_assessable: false,
            assessment_state: AssessmentState::Unknown,
            state_has_been_loaded: false,
        }
    }

    pub fn id(&self) -> StepId {
        StepId(self.index)
    }

    /// All blocks in pre-order, root excluded.
    pub fn blocks(&self) -> Vec<&LearningBlock> {
        self.root_block.flattened()
    }

    pub fn visible_blocks(&self) -> Vec<&LearningBlock> {
        self.blocks()
            .into_iter()
            .filter(|b| b.initial_visible_state)
            .collect()
    }

    pub fn block(&self, identifier: &str) -> Option<&LearningBlock> {
        self.blocks().into_iter().find(|b| b.identifier == identifier)
    }

    pub fn response_blocks(&self) -> Vec<&LearningBlock> {
        self.blocks()
            .into_iter()
            .filter(|b| b.block_type == BlockType::Response)
            .collect()
    }

    /// Prefix shared by the persisted identifiers of this step's responses.
    pub fn response_identifier_base(&self) -> String {
        format!("{}.{}", self.trail_identifier, self.identifier)
    }

    pub fn response_for(&self, block: &LearningBlock) -> Option<LearningResponse> {
        match LearningResponse::from_block(&self.response_identifier_base(), block) {
            Ok(response) => Some(response),
            Err(e) => {
                log::warn!("response block {} is malformed: {e}", block.identifier);
                None
            }
        }
    }

    pub fn signature(&self) -> String {
        self.root_block.signature()
    }

    /// Opens or closes a group and recomputes visibility. Returns false when
    /// no group has that identifier.
    pub fn set_group_disclosed(&mut self, identifier: &str, disclosed: bool) -> bool {
        match self.root_block.find_block_mut(identifier) {
            Some(block) if block.is_group() => block.is_disclosed = disclosed,
            _ => return false,
        }
        self.root_block.initialize_visible_state(true);
        true
    }

    /// Folds one submitted response into this step's assessment.
    pub fn record_response(&mut self, response: &LearningResponse) {
        if !self.is_assessable {
            return;
        }
        self.assessment_state = if response.is_answered_correctly() {
            AssessmentState::CompletedSuccessfully
        } else {
            AssessmentState::PartiallyCompleted
        };
    }

    pub fn is_state_loaded(&self) -> bool {
        self.state_has_been_loaded
    }

    /// Restores saved responses and derives the assessment state from them.
    /// Only the first call does anything.
    pub fn load_response_state(&mut self, store: &dyn KeyValueStore) {
        if self.state_has_been_loaded {
            return;
        }
        self.state_has_been_loaded = true;

        let responses: Vec<LearningResponse> = self
            .response_blocks()
            .into_iter()
            .filter_map(|block| self.response_for(block))
            .collect();

        for mut response in responses {
            match response.load_state(store) {
                Ok(()) if response.is_submitted() => self.record_response(&response),
                Ok(()) => {}
                Err(e) => log::debug!("{e}"),
            }
        }
    }

    /// Plain-text digest of the visible blocks, one per line.
    pub fn accessible_description(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        if let Some(title) = &self.title {
            lines.push(title.clone());
        }
        lines.extend(
            self.visible_blocks()
                .into_iter()
                .map(|b| b.plain_text().trim().to_string())
                .filter(|t| !t.is_empty()),
        );
        lines.join("\n")
    }
}
