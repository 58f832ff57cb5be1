use serde::Serialize;

use crate::styling::{AttributedStringStyle, AttributedStringStyler, StyledText};
use crate::xml::{XmlAttributes, XmlParseError, get_elements_in, plain_text};

use super::interactive::{Interactive, parse_interactives};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Buttons,
    Code,
    Custom,
    Group,
    Image,
    Response,
    Root,
    Text,
    Title,
    Video,
}

impl BlockType {
    /// Parses the `type` attribute of a `<block>`. `root` is not authorable.
    pub fn from_attribute(value: &str) -> Option<Self> {
        let block_type = match value {
            "buttons" => BlockType::Buttons,
            "code" => BlockType::Code,
            "custom" => BlockType::Custom,
            "group" => BlockType::Group,
            "image" => BlockType::Image,
            "response" => BlockType::Response,
            "text" => BlockType::Text,
            "title" => BlockType::Title,
            "video" => BlockType::Video,
            _ => return None,
        };
        Some(block_type)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Buttons => "buttons",
            BlockType::Code => "code",
            BlockType::Custom => "custom",
            BlockType::Group => "group",
            BlockType::Image => "image",
            BlockType::Response => "response",
            BlockType::Root => "root",
            BlockType::Text => "text",
            BlockType::Title => "title",
            BlockType::Video => "video",
        }
    }

    /// Types whose payload lives in attributes, so an empty body is valid.
    pub fn is_content_optional(self) -> bool {
        matches!(self, BlockType::Image | BlockType::Video)
    }
}

/// Handle to the step that owns a block: the step's index in its trail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct StepId(pub usize);

/// A typed unit of step content. Blocks own their children outright.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningBlock {
    pub identifier: String,
    pub block_type: BlockType,
    pub sub_type: Option<String>,
    pub step: StepId,
    pub attributes: XmlAttributes,
    /// Raw XML of the block body.
    pub content: String,
    pub is_disclosed: bool,
    pub is_last_block_in_group: bool,
    pub initial_visible_state: bool,
    pub group_level: usize,
    pub child_blocks: Vec<LearningBlock>,
}

impl LearningBlock {
    pub fn new(
        identifier: impl Into<String>,
        block_type: BlockType,
        step: StepId,
        attributes: XmlAttributes,
        content: impl Into<String>,
    ) -> Self {
        let sub_type = attributes.get("subtype").cloned();
        // Groups start collapsed unless authored open; other blocks have
        // nothing to collapse.
        let is_disclosed = attributes
            .get("disclosed")
            .map(|v| v == "true")
            .unwrap_or(block_type != BlockType::Group);
        Self {
            identifier: identifier.into(),
            block_type,
            sub_type,
            step,
            attributes,
            content: content.into(),
            is_disclosed,
            is_last_block_in_group: false,
            initial_visible_state: true,
            group_level: 0,
            child_blocks: Vec::new(),
        }
    }

    /// The single root of a step's block tree.
    pub fn root(step: StepId) -> Self {
        Self::new("root", BlockType::Root, step, XmlAttributes::new(), "")
    }

    pub fn is_group(&self) -> bool {
        self.block_type == BlockType::Group
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn add_child(&mut self, child: LearningBlock) {
        self.child_blocks.push(child);
    }

    /// Propagates initial visibility down the tree.
    ///
    /// Children of an invisible block are invisible. Children of a group
    /// follow the group's own disclosure instead of the inherited value.
    pub fn initialize_visible_state(&mut self, visible: bool) {
        self.initial_visible_state = visible;
        let child_visible = visible && (!self.is_group() || self.is_disclosed);
        for child in &mut self.child_blocks {
            child.initialize_visible_state(child_visible);
        }
    }

    /// Assigns nesting depth and flags the last child of each group.
    pub fn initialize_group_state(&mut self, level: usize) {
        let is_group = self.is_group();
        let last = self.child_blocks.len().saturating_sub(1);
        for (i, child) in self.child_blocks.iter_mut().enumerate() {
            child.group_level = level;
            child.is_last_block_in_group = is_group && i == last;
            if child.is_group() {
                child.initialize_group_state(level + 1);
            }
        }
    }

    /// Descendants in pre-order, excluding `self`.
    pub fn flattened(&self) -> Vec<&LearningBlock> {
        let mut out = Vec::new();
        for child in &self.child_blocks {
            out.push(child);
            out.extend(child.flattened());
        }
        out
    }

    pub fn find_block_mut(&mut self, identifier: &str) -> Option<&mut LearningBlock> {
        for child in &mut self.child_blocks {
            if child.identifier == identifier {
                return Some(child);
            }
            if let Some(found) = child.find_block_mut(identifier) {
                return Some(found);
            }
        }
        None
    }

    /// `key=value` pairs in key order, comma separated.
    pub fn attribute_string(&self) -> String {
        self.attributes
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Structural fingerprint of this block and its descendants.
    pub fn signature(&self) -> String {
        std::iter::once(self)
            .chain(self.flattened())
            .map(|b| format!("{}|{}|{}", b.block_type.as_str(), b.attribute_string(), b.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn plain_text(&self) -> String {
        plain_text(&self.content)
    }

    /// Block body rendered through the full styling pipeline.
    pub fn styled_text(&self, style: &AttributedStringStyle) -> Result<StyledText, XmlParseError> {
        AttributedStringStyler::styled_text(&self.content, style)
    }

    /// Contents of the first `<description>` child, if any.
    pub fn description(&self) -> Option<String> {
        get_elements_in(&self.content, "description")
            .into_iter()
            .next()
            .map(|e| plain_text(&e.content))
    }

    pub fn interactives(&self) -> Vec<Interactive> {
        parse_interactives(&self.content)
    }
}
