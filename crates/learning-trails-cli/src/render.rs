//! Turns trail steps into terminal lines.

use std::collections::HashMap;

use learning_trails_engine::response::LearningResponse;
use learning_trails_engine::styling::{AttributeKey, AttributeValue, Attributes, Rgba, TextRun};
use learning_trails_engine::{AttributedStringStyle, BlockType, LearningBlock, LearningStep, StyledText};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Terminal style for one run. Black is left to the terminal's default.
pub fn span_style(attributes: &Attributes) -> Style {
    let mut style = Style::default();
    let flag = |key: AttributeKey| matches!(attributes.get(&key), Some(AttributeValue::Bool(true)));
    if flag(AttributeKey::Bold) {
        style = style.add_modifier(Modifier::BOLD);
    }
    if flag(AttributeKey::Italic) {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if flag(AttributeKey::Strikethrough) {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if attributes.contains_key(&AttributeKey::Link) {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if let Some(AttributeValue::Color(color)) = attributes.get(&AttributeKey::ForegroundColor)
        && *color != Rgba::BLACK
    {
        style = style.fg(terminal_color(*color));
    }
    if let Some(AttributeValue::Color(color)) = attributes.get(&AttributeKey::BackgroundColor) {
        style = style.bg(terminal_color(*color));
    }
    style
}

fn terminal_color(color: Rgba) -> Color {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::Rgb(channel(color.red), channel(color.green), channel(color.blue))
}

/// Indent prefix for a line, one level per indent unit.
fn indent_prefix(run: &TextRun, indent_unit: f32) -> String {
    let Some(paragraph) = run.paragraph_style() else {
        return String::new();
    };
    if indent_unit <= 0.0 {
        return String::new();
    }
    let levels = (paragraph.first_line_head_indent / indent_unit).round() as usize;
    "  ".repeat(levels)
}

/// Splits styled text into terminal lines, keeping run styles.
pub fn styled_lines(text: &StyledText, indent_unit: f32) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();

    for run in text.runs() {
        for (i, piece) in run.text.split('\n').enumerate() {
            if i > 0 {
                lines.push(Line::from(std::mem::take(&mut spans)));
            }
            let piece = piece.trim_end_matches('\r');
            if piece.is_empty() {
                continue;
            }
            if spans.is_empty() && run.is_code() {
                spans.push(Span::raw(indent_prefix(run, indent_unit)));
            }
            spans.push(Span::styled(piece.to_string(), span_style(&run.attributes)));
        }
    }
    if !spans.is_empty() {
        lines.push(Line::from(spans));
    }
    lines
}

fn markup_lines(xml: &str, style: &AttributedStringStyle) -> Vec<Line<'static>> {
    match learning_trails_engine::AttributedStringStyler::styled_text(xml, style) {
        Ok(text) => styled_lines(&text, style.indent.indent_unit),
        Err(e) => vec![Line::from(format!("[unreadable markup: {e}]"))],
    }
}

fn response_lines(response: &LearningResponse, style: &AttributedStringStyle) -> Vec<Line<'static>> {
    let mut lines = response
        .prompt_xml
        .as_deref()
        .map(|prompt| markup_lines(prompt, style))
        .unwrap_or_default();

    let submitted = response.is_submitted();
    for (i, option) in response.options.iter().enumerate() {
        let mark = if option.is_selected { "[x]" } else { "[ ]" };
        lines.push(Line::from(format!("{mark} {}. {}", i + 1, option.plain_text())));
        if submitted
            && option.is_selected
            && let Some(feedback) = &option.feedback_xml
        {
            let mut feedback_lines = markup_lines(feedback, style);
            for line in &mut feedback_lines {
                line.spans.insert(0, Span::raw("      "));
            }
            lines.extend(feedback_lines);
        }
    }

    if response.is_confirm_required && !response.is_confirmed {
        lines.push(Line::from(Span::styled(
            "press c to submit",
            Style::default().add_modifier(Modifier::DIM),
        )));
    } else if submitted {
        let verdict = if response.is_answered_correctly() {
            Span::styled("Correct", Style::default().fg(Color::Green))
        } else {
            Span::styled("Not quite", Style::default().fg(Color::Red))
        };
        lines.push(Line::from(verdict));
    }
    lines
}

fn block_lines(
    block: &LearningBlock,
    style: &AttributedStringStyle,
    responses: &HashMap<String, LearningResponse>,
) -> Vec<Line<'static>> {
    let indent = "  ".repeat(block.group_level);
    let mut lines = match block.block_type {
        BlockType::Group => {
            let marker = if block.is_disclosed { "▾" } else { "▸" };
            let title = block.plain_text();
            vec![Line::from(Span::styled(
                format!("{marker} {}", title.trim()),
                Style::default().add_modifier(Modifier::BOLD),
            ))]
        }
        BlockType::Image | BlockType::Video => {
            let source = block.attribute("source").unwrap_or("untitled");
            let mut lines = vec![Line::from(format!("[{}: {source}]", block.block_type.as_str()))];
            if let Some(description) = block.description() {
                lines.push(Line::from(description));
            }
            lines
        }
        BlockType::Response => match responses.get(&block.identifier) {
            Some(response) => response_lines(response, style),
            None => vec![Line::from("[response unavailable]")],
        },
        _ => markup_lines(&block.content, style),
    };

    if !indent.is_empty() {
        for line in &mut lines {
            line.spans.insert(0, Span::raw(indent.clone()));
        }
    }
    if !block.is_last_block_in_group {
        lines.push(Line::from(""));
    }
    lines
}

/// All visible blocks of a step, with a blank line between blocks.
pub fn step_lines(
    step: &LearningStep,
    style: &AttributedStringStyle,
    responses: &HashMap<String, LearningResponse>,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(title) = &step.title {
        lines.push(Line::from(Span::styled(
            title.clone(),
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )));
        lines.push(Line::from(""));
    }
    for block in step.visible_blocks() {
        if block.block_type == BlockType::Title && step.title.is_some() && block.group_level == 0 {
            continue;
        }
        lines.extend(block_lines(block, style, responses));
    }
    lines
}
