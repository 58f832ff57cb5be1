//! Brace-counting auto-indentation for code paragraphs.
//!
//! Each code line is indented by the bracket depth in effect for it. A line
//! that closes more than it opens dedents itself. A balanced line whose first
//! bracket is a closer (`} else {`) dedents only itself; following lines keep
//! the running depth. Brackets inside strings and comments count as well.

use super::attributes::{AttributeKey, AttributeValue, ParagraphStyle};
use super::style::IndentOptions;
use super::styled_text::StyledText;

const OPENERS: [char; 2] = ['{', '['];
const CLOSERS: [char; 2] = ['}', ']'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BracketCounts {
    opening: i32,
    closing: i32,
    first_is_closer: bool,
}

impl BracketCounts {
    fn of(line: &str) -> Self {
        let first = line.chars().find(|c| OPENERS.contains(c) || CLOSERS.contains(c));
        Self {
            opening: line.chars().filter(|c| OPENERS.contains(c)).count() as i32,
            closing: line.chars().filter(|c| CLOSERS.contains(c)).count() as i32,
            first_is_closer: first.is_some_and(|c| CLOSERS.contains(&c)),
        }
    }

    fn is_balanced_leading_closer(&self) -> bool {
        self.opening == self.closing && self.closing > 0 && self.first_is_closer
    }
}

/// Rewrites the paragraph style of every code line to match its nesting.
pub fn auto_indent(text: &mut StyledText, options: &IndentOptions) {
    text.split_lines();
    let mut indent_level: i32 = 0;

    for range in text.line_ranges() {
        let runs = &mut text.runs_mut()[range];
        if !runs.iter().any(|r| r.is_code()) {
            continue;
        }

        let line: String = runs.iter().map(|r| r.text.as_str()).collect();
        let counts = BracketCounts::of(&line);

        if counts.closing > counts.opening {
            indent_level -= counts.closing - counts.opening;
        } else if counts.is_balanced_leading_closer() {
            indent_level -= counts.closing;
        }

        let first_line_head_indent = options.indent_unit * indent_level.max(0) as f32;
        let style = ParagraphStyle {
            first_line_head_indent,
            head_indent: first_line_head_indent + options.wrap_unit,
        };
        for run in runs.iter_mut() {
            run.attributes
                .insert(AttributeKey::ParagraphStyle, AttributeValue::Paragraph(style));
        }

        if counts.opening > counts.closing {
            indent_level += counts.opening - counts.closing;
        } else if counts.is_balanced_leading_closer() {
            indent_level += counts.closing;
        }
    }
}
