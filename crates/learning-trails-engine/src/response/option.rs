use serde::Serialize;

use crate::xml::plain_text;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    #[default]
    Unspecified,
    Correct,
    Wrong,
}

impl OptionType {
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some("correct") => OptionType::Correct,
            Some("wrong") => OptionType::Wrong,
            _ => OptionType::Unspecified,
        }
    }
}

/// One selectable answer of a response block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningResponseOption {
    pub text_xml: String,
    pub feedback_xml: Option<String>,
    pub option_type: OptionType,
    pub is_selected: bool,
}

impl LearningResponseOption {
    pub fn new(text_xml: impl Into<String>, feedback_xml: Option<String>, option_type: OptionType) -> Self {
        Self {
            text_xml: text_xml.into(),
            feedback_xml,
            option_type,
            is_selected: false,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.option_type == OptionType::Correct
    }

    pub fn plain_text(&self) -> String {
        plain_text(&self.text_xml).trim().to_string()
    }
}
