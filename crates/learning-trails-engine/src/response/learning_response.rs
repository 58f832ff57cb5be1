use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::store::{KeyValueStore, StoreValue};
use crate::trail::LearningBlock;
use crate::xml::{SlimXmlElement, SlimXmlParser, SlimXmlParserDelegate, XmlAttributes, XmlParseError};

use super::option::{LearningResponseOption, OptionType};

const IS_CONFIRMED_KEY: &str = "IsConfirmed";

fn option_key(index: usize) -> String {
    format!("Option.{index}")
}

/// Why saved response state could not be restored. Every variant means the
/// response keeps its default state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("no saved state for {0}")]
    NoSavedState(String),
    #[error("saved state for {identifier} is missing {key}")]
    MissingKey { identifier: String, key: String },
    #[error("saved state for {identifier} has the wrong type at {key}")]
    WrongType { identifier: String, key: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    #[default]
    MultipleChoice,
    SingleChoice,
    FreeText,
}

impl ResponseType {
    pub fn from_sub_type(sub_type: Option<&str>) -> Self {
        match sub_type {
            Some("single-choice") => ResponseType::SingleChoice,
            Some("free-text") => ResponseType::FreeText,
            _ => ResponseType::MultipleChoice,
        }
    }
}

/// A quiz built from a response block. Only option selection and the
/// confirmed flag change after construction, and only those are persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningResponse {
    pub identifier: String,
    pub response_type: ResponseType,
    pub is_confirm_required: bool,
    pub is_confirmed: bool,
    pub prompt_xml: Option<String>,
    pub options: Vec<LearningResponseOption>,
}

impl LearningResponse {
    /// Builds the response for `block`. The identifier is `base` plus the
    /// block's `name` attribute, or its identifier when unnamed.
    pub fn from_block(base: &str, block: &LearningBlock) -> Result<Self, XmlParseError> {
        let suffix = block.attribute("name").unwrap_or(&block.identifier);
        Self::parse(
            format!("{base}.{suffix}"),
            &block.content,
            ResponseType::from_sub_type(block.sub_type.as_deref()),
            block.attribute("confirm") == Some("true"),
        )
    }

    /// Parses the body of a response block.
    pub fn parse(
        identifier: impl Into<String>,
        xml: &str,
        response_type: ResponseType,
        is_confirm_required: bool,
    ) -> Result<Self, XmlParseError> {
        let wrapped = format!("<response>{xml}</response>");
        let mut parser = ResponseParser::default();
        SlimXmlParser::new(&wrapped).parse(&mut parser)?;

        let mut response = Self {
            identifier: identifier.into(),
            response_type,
            is_confirm_required,
            is_confirmed: false,
            prompt_xml: parser.prompt_xml,
            options: parser.options,
        };
        response.normalize_option_types();
        Ok(response)
    }

    /// Once any option is marked correct, unmarked options are wrong.
    fn normalize_option_types(&mut self) {
        if !self.options.iter().any(|o| o.is_correct()) {
            return;
        }
        for option in &mut self.options {
            if option.option_type == OptionType::Unspecified {
                option.option_type = OptionType::Wrong;
            }
        }
    }

    /// True when at least one option is correct and every correct option is
    /// selected. Wrong selections do not count against the answer.
    pub fn is_answered_correctly(&self) -> bool {
        let mut correct = self.options.iter().filter(|o| o.is_correct()).peekable();
        correct.peek().is_some() && correct.all(|o| o.is_selected)
    }

    /// Selects or clears one option. Selecting in a single-choice response
    /// clears the others. Returns false for an out-of-range index.
    pub fn select_option(&mut self, index: usize, selected: bool) -> bool {
        if index >= self.options.len() {
            return false;
        }
        if selected && self.response_type == ResponseType::SingleChoice {
            for option in &mut self.options {
                option.is_selected = false;
            }
        }
        self.options[index].is_selected = selected;
        true
    }

    pub fn confirm(&mut self) {
        self.is_confirmed = true;
    }

    pub fn selected_indexes(&self) -> Vec<usize> {
        self.options
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.is_selected.then_some(i))
            .collect()
    }

    /// Whether the learner has committed an answer.
    pub fn is_submitted(&self) -> bool {
        if self.is_confirm_required {
            self.is_confirmed
        } else {
            self.options.iter().any(|o| o.is_selected)
        }
    }

    pub fn save_state(&self, store: &mut dyn KeyValueStore) {
        let mut state: BTreeMap<String, StoreValue> = self
            .options
            .iter()
            .enumerate()
            .map(|(i, o)| (option_key(i), StoreValue::Bool(o.is_selected)))
            .collect();
        state.insert(IS_CONFIRMED_KEY.to_string(), StoreValue::Bool(self.is_confirmed));
        store.set(&self.identifier, StoreValue::Dictionary(state));
    }

    /// Restores selections saved by [`save_state`](Self::save_state).
    ///
    /// Nothing is applied unless every option has a saved value.
    pub fn load_state(&mut self, store: &dyn KeyValueStore) -> Result<(), StateError> {
        let saved = store
            .get(&self.identifier)
            .ok_or_else(|| StateError::NoSavedState(self.identifier.clone()))?;
        let state = saved.as_dictionary().ok_or_else(|| StateError::WrongType {
            identifier: self.identifier.clone(),
            key: self.identifier.clone(),
        })?;
        if state.is_empty() {
            return Err(StateError::NoSavedState(self.identifier.clone()));
        }

        let selections = (0..self.options.len())
            .map(|i| self.saved_bool(state, &option_key(i))?.ok_or_else(|| StateError::MissingKey {
                identifier: self.identifier.clone(),
                key: option_key(i),
            }))
            .collect::<Result<Vec<bool>, StateError>>()?;
        let is_confirmed = self.saved_bool(state, IS_CONFIRMED_KEY)?.unwrap_or(false);

        for (option, selected) in self.options.iter_mut().zip(selections) {
            option.is_selected = selected;
        }
        self.is_confirmed = is_confirmed;
        Ok(())
    }

    fn saved_bool(&self, state: &BTreeMap<String, StoreValue>, key: &str) -> Result<Option<bool>, StateError> {
        match state.get(key) {
            None => Ok(None),
            Some(value) => value.as_bool().map(Some).ok_or_else(|| StateError::WrongType {
                identifier: self.identifier.clone(),
                key: key.to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct ResponseParser {
    prompt_xml: Option<String>,
    options: Vec<LearningResponseOption>,
    in_option: bool,
    /// Open elements below the current `<option>`.
    option_depth: usize,
    pending_text: Option<String>,
    pending_feedback: Option<String>,
}

impl SlimXmlParserDelegate for ResponseParser {
    fn did_start_element(&mut self, element: &SlimXmlElement) {
        if element.name == "option" {
            self.in_option = true;
            self.option_depth = 0;
            self.pending_text = None;
            self.pending_feedback = None;
        } else if self.in_option {
            self.option_depth += 1;
        }
    }

    fn did_end_element(&mut self, element: &SlimXmlElement) {
        let direct_child = self.in_option && self.option_depth == 1;
        if self.in_option && element.name != "option" {
            self.option_depth = self.option_depth.saturating_sub(1);
        }
        match element.name.as_str() {
            "prompt" if !self.in_option => self.prompt_xml = Some(element.xml_content()),
            "text" if direct_child && self.pending_text.is_none() => {
                self.pending_text = Some(element.xml_content());
            }
            "feedback" if self.in_option => {
                self.pending_feedback = Some(element.content.trim().to_string());
            }
            "option" => {
                let text_xml = self
                    .pending_text
                    .take()
                    .unwrap_or_else(|| element.content.trim().to_string());
                self.options.push(LearningResponseOption::new(
                    text_xml,
                    self.pending_feedback.take(),
                    OptionType::from_attribute(element.attribute("type")),
                ));
                self.in_option = false;
            }
            _ => {}
        }
    }

    fn should_capture_element_content(&mut self, name: &str, _attributes: &XmlAttributes) -> bool {
        matches!(name, "option" | "text" | "feedback" | "prompt")
    }
}
