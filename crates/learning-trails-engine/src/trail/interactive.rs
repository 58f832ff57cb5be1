//! Interactive overlays: `<interactive>` elements holding buttons and
//! hotspots.

use crate::xml::{ExtractedElement, get_elements_in};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractiveAction {
    Link,
    PopupText,
}

impl InteractiveAction {
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "link" => Some(InteractiveAction::Link),
            "popupText" => Some(InteractiveAction::PopupText),
            _ => None,
        }
    }
}

/// Side of a hotspot that its callout arrow points from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Carat {
    Up,
    Down,
    Left,
    Right,
}

impl Carat {
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Carat::Up),
            "down" => Some(Carat::Down),
            "left" => Some(Carat::Left),
            "right" => Some(Carat::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveButton {
    pub action: InteractiveAction,
    pub href: Option<String>,
    pub content_xml: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hotspot {
    /// Position in unit coordinates of the host image.
    pub position: (f32, f32),
    pub action: InteractiveAction,
    pub carat: Option<Carat>,
    pub href: Option<String>,
    pub content_xml: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interactive {
    pub name: Option<String>,
    pub buttons: Vec<InteractiveButton>,
    pub hotspots: Vec<Hotspot>,
}

/// Parses every `<interactive>` in a block body. Buttons and hotspots with
/// an unknown action or bad position are skipped.
pub fn parse_interactives(xml: &str) -> Vec<Interactive> {
    get_elements_in(xml, "interactive")
        .into_iter()
        .map(|interactive| Interactive {
            name: interactive.attributes.get("name").cloned(),
            buttons: get_elements_in(&interactive.content, "button")
                .iter()
                .filter_map(parse_button)
                .collect(),
            hotspots: get_elements_in(&interactive.content, "hotspot")
                .iter()
                .filter_map(parse_hotspot)
                .collect(),
        })
        .collect()
}

fn parse_action(element: &ExtractedElement) -> Option<InteractiveAction> {
    let value = element.attributes.get("action").map(String::as_str).unwrap_or("link");
    let action = InteractiveAction::from_attribute(value);
    if action.is_none() {
        log::warn!("skipping <{}> with unknown action {value:?}", element.name);
    }
    action
}

fn parse_button(element: &ExtractedElement) -> Option<InteractiveButton> {
    Some(InteractiveButton {
        action: parse_action(element)?,
        href: element.attributes.get("href").cloned(),
        content_xml: element.content.clone(),
    })
}

fn parse_hotspot(element: &ExtractedElement) -> Option<Hotspot> {
    let action = parse_action(element)?;
    let Some(position) = element.attributes.get("position").and_then(|p| parse_position(p)) else {
        log::warn!("skipping <hotspot> without a valid position");
        return None;
    };
    Some(Hotspot {
        position,
        action,
        carat: element
            .attributes
            .get("carat")
            .and_then(|c| Carat::from_attribute(c)),
        href: element.attributes.get("href").cloned(),
        content_xml: element.content.clone(),
    })
}

fn parse_position(value: &str) -> Option<(f32, f32)> {
    let (x, y) = value.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}
