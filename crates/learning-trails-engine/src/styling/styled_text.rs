use std::ops::Range;

use serde::Serialize;

use super::attributes::{AttributeKey, AttributeValue, Attributes, ParagraphStyle};

/// A run of text sharing one attribute set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub attributes: Attributes,
}

impl TextRun {
    pub fn is_code(&self) -> bool {
        matches!(
            self.attributes.get(&AttributeKey::CodeParagraph),
            Some(AttributeValue::Bool(true))
        )
    }

    pub fn paragraph_style(&self) -> Option<ParagraphStyle> {
        match self.attributes.get(&AttributeKey::ParagraphStyle) {
            Some(AttributeValue::Paragraph(p)) => Some(*p),
            _ => None,
        }
    }
}

/// Attributed text: an ordered list of runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StyledText {
    runs: Vec<TextRun>,
}

impl StyledText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends text, extending the last run when attributes match.
    pub fn push(&mut self, text: &str, attributes: &Attributes) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.runs.last_mut()
            && last.attributes == *attributes
        {
            last.text.push_str(text);
            return;
        }
        self.runs.push(TextRun {
            text: text.to_string(),
            attributes: attributes.clone(),
        });
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Splits runs so that no run spans a line break. Each `\n` stays at the
    /// end of the run that precedes it.
    pub(crate) fn split_lines(&mut self) {
        let mut split = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if !run.text.contains('\n') {
                split.push(run);
                continue;
            }
            for piece in run.text.split_inclusive('\n') {
                split.push(TextRun {
                    text: piece.to_string(),
                    attributes: run.attributes.clone(),
                });
            }
        }
        self.runs = split;
    }

    /// Run index ranges of each logical line. Call after [`split_lines`].
    ///
    /// [`split_lines`]: StyledText::split_lines
    pub(crate) fn line_ranges(&self) -> Vec<Range<usize>> {
        let mut lines = Vec::new();
        let mut start = 0;
        for (i, run) in self.runs.iter().enumerate() {
            if run.text.ends_with('\n') {
                lines.push(start..i + 1);
                start = i + 1;
            }
        }
        if start < self.runs.len() {
            lines.push(start..self.runs.len());
        }
        lines
    }

    pub(crate) fn runs_mut(&mut self) -> &mut [TextRun] {
        &mut self.runs
    }
}
