// src/extractors/events.rs

//! Tag-event source.
//!
//! Parses markup with `scraper` and replays the element tree in document
//! order as a flat sequence of start-tag, text and end-tag events.

use scraper::{ElementRef, Html, Node};

/// Elements that never have an end-tag in markup.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// One markup event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEvent {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    End {
        name: String,
    },
}

impl TagEvent {
    /// Value of an attribute on a start-tag.
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            TagEvent::Start { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Whether a start-tag carries `class` in its class list.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Number of attributes on a start-tag.
    pub fn attr_count(&self) -> usize {
        match self {
            TagEvent::Start { attrs, .. } => attrs.len(),
            _ => 0,
        }
    }
}

/// Parse `markup` and return its events in document order.
///
/// The first event is always the start of the root `html` element. Void
/// elements such as `img` produce a start event only.
pub fn tag_events(markup: &str) -> Vec<TagEvent> {
    let document = Html::parse_document(markup);
    let mut events = Vec::new();
    walk(document.root_element(), &mut events);
    events
}

fn walk(element: ElementRef<'_>, out: &mut Vec<TagEvent>) {
    let value = element.value();
    let name = value.name().to_string();
    out.push(TagEvent::Start {
        name: name.clone(),
        attrs: value
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    });

    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push(TagEvent::Text(String::from(&**text))),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    walk(child_element, out);
                }
            }
            _ => {}
        }
    }

    if !VOID_ELEMENTS.contains(&name.as_str()) {
        out.push(TagEvent::End { name });
    }
}
