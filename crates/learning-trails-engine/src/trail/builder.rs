use crate::options::ParseOptions;
use crate::xml::{SlimXmlElement, SlimXmlParserDelegate, XmlAttributes, plain_text};

use super::block::{BlockType, LearningBlock};
use super::learning_trail::{LearningTrail, TrailError};
use super::step::{AssessmentState, LearningStep, StepType};

/// Builds a [`LearningTrail`] from parser events.
///
/// Blocks are appended to the current parent, which is the step root or the
/// innermost open `<groupblock>`. Open groups are tracked as a path of child
/// indexes from the root.
pub(crate) struct TrailBuilder {
    options: ParseOptions,
    name: String,
    identifier: Option<String>,
    background_image: Option<String>,
    steps: Vec<LearningStep>,
    current_step: Option<LearningStep>,
    group_path: Vec<usize>,
    step_count: usize,
    block_count: usize,
    group_count: usize,
}

impl TrailBuilder {
    pub(crate) fn new(options: ParseOptions) -> Self {
        Self {
            options,
            name: String::new(),
            identifier: None,
            background_image: None,
            steps: Vec::new(),
            current_step: None,
            group_path: Vec::new(),
            step_count: 0,
            block_count: 0,
            group_count: 0,
        }
    }

    pub(crate) fn finish(self) -> Result<LearningTrail, TrailError> {
        let identifier = self.identifier.ok_or(TrailError::MissingIdentifier)?;
        Ok(LearningTrail::new(
            self.name,
            identifier,
            self.steps,
            self.background_image.map(Into::into),
        ))
    }

    fn start_trail(&mut self, element: &SlimXmlElement) {
        if let Some(name) = element.attribute("name") {
            self.name = name.to_string();
            self.identifier = Some(format!("trail.{name}"));
        }
        self.background_image = element.attribute("backgroundImage").map(str::to_string);
    }

    fn start_step(&mut self, element: &SlimXmlElement) {
        self.step_count += 1;
        let identifier = element
            .attribute("name")
            .map(str::to_string)
            .unwrap_or_else(|| format!("step{}", self.step_count));
        let step_type = element
            .attribute("type")
            .map(StepType::from_attribute)
            .unwrap_or_default();
        self.current_step = Some(LearningStep::new(
            identifier,
            self.steps.len(),
            step_type,
            self.identifier.clone().unwrap_or_default(),
        ));
        self.group_path.clear();
    }

    fn end_step(&mut self) {
        let Some(mut step) = self.current_step.take() else {
            return;
        };
        step.root_block.initialize_visible_state(true);
        step.root_block.initialize_group_state(0);
        if !step.is_assessable {
            step.assessment_state = AssessmentState::NotAssessable;
        }
        self.steps.push(step);
    }

    fn start_group(&mut self, element: &SlimXmlElement) {
        let Some(step) = self.current_step.as_mut() else {
            log::warn!("<groupblock> outside a step skipped");
            return;
        };
        self.group_count += 1;
        let identifier = element
            .attribute("name")
            .or_else(|| element.attribute("id"))
            .map(str::to_string)
            .unwrap_or_else(|| format!("group{}", self.group_count));
        let group = LearningBlock::new(
            identifier,
            BlockType::Group,
            step.id(),
            element.attributes.clone(),
            "",
        );
        let parent = parent_block(&mut step.root_block, &self.group_path);
        parent.add_child(group);
        let index = parent.child_blocks.len() - 1;
        self.group_path.push(index);
    }

    fn end_group(&mut self) {
        if self.current_step.is_some() {
            self.group_path.pop();
        }
    }

    fn end_block(&mut self, element: &SlimXmlElement) {
        let Some(step) = self.current_step.as_mut() else {
            log::warn!("<block> outside a step skipped");
            return;
        };
        let Some(type_name) = element.attribute("type") else {
            log::warn!("<block> without a type in step {} skipped", step.identifier);
            return;
        };
        let Some(block_type) = BlockType::from_attribute(type_name) else {
            log::warn!("<block> with unknown type {type_name:?} in step {} skipped", step.identifier);
            return;
        };
        self.block_count += 1;
        let content = element.content.trim();
        let parent = parent_block(&mut step.root_block, &self.group_path);

        if block_type == BlockType::Title {
            if parent.is_group() {
                parent.content = content.to_string();
                return;
            }
            step.title = Some(plain_text(content).trim().to_string());
            if self.options.step_title_in_header {
                return;
            }
        }

        if content.is_empty() && !block_type.is_content_optional() {
            log::debug!("empty {} block in step {} dropped", block_type.as_str(), step.identifier);
            return;
        }

        let identifier = element
            .attribute("id")
            .map(str::to_string)
            .unwrap_or_else(|| format!("block{}", self.block_count));
        let block = LearningBlock::new(
            identifier,
            block_type,
            step.id(),
            element.attributes.clone(),
            content,
        );
        parent_block(&mut step.root_block, &self.group_path).add_child(block);
    }
}

/// Walks `path` down from `root`. Paths only ever hold indexes of groups
/// already added, so every step exists.
fn parent_block<'b>(root: &'b mut LearningBlock, path: &[usize]) -> &'b mut LearningBlock {
    path.iter().fold(root, |block, &i| &mut block.child_blocks[i])
}

impl SlimXmlParserDelegate for TrailBuilder {
    fn did_start_element(&mut self, element: &SlimXmlElement) {
        match element.name.as_str() {
            "trail" => self.start_trail(element),
            "step" => self.start_step(element),
            "assessment" => {
                if let Some(step) = self.current_step.as_mut() {
                    step.is_assessable = true;
                }
            }
            "groupblock" => self.start_group(element),
            _ => {}
        }
    }

    fn did_end_element(&mut self, element: &SlimXmlElement) {
        match element.name.as_str() {
            "block" => self.end_block(element),
            "groupblock" => self.end_group(),
            "step" => self.end_step(),
            _ => {}
        }
    }

    fn should_capture_element_content(&mut self, name: &str, _attributes: &XmlAttributes) -> bool {
        name == "block"
    }

    fn should_localize_element_with_id(&mut self, name: &str) -> bool {
        name == "block"
    }
}
