// File: src/dom/html.rs
// Purpose: Regex-driven HTML scanner that builds a Document

use super::{Document, NodeId};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<![^>]*>|<\?[^>]*>|</\s*([A-Za-z][A-Za-z0-9:-]*)\s*>|<([A-Za-z][A-Za-z0-9:-]*)((?:\s+[^\s/>"'=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(/?)>"#,
    )
    .expect("token pattern is valid")
});

static ATTR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s/>"'=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("attribute pattern is valid")
});

static ENTITY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("entity pattern is valid")
});

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Parse markup into a fresh document. Malformed markup never fails: stray end
/// tags are ignored and unclosed elements are closed at end of input.
pub(super) fn parse(markup: &str) -> Document {
    let mut doc = Document::new();
    let mut stack: Vec<(NodeId, String)> = Vec::new();
    let mut pos = 0;

    while let Some(caps) = TOKEN_REGEX.captures_at(markup, pos) {
        let Some(whole) = caps.get(0) else {
            break;
        };
        push_text(&mut doc, &stack, &markup[pos..whole.start()]);
        pos = whole.end();

        if let Some(end_tag) = caps.get(1) {
            close(&mut stack, &end_tag.as_str().to_ascii_lowercase());
            continue;
        }

        let Some(tag) = caps.get(2) else {
            // comment, doctype or processing instruction
            continue;
        };
        let tag = tag.as_str().to_ascii_lowercase();
        let self_closing = caps.get(4).is_some_and(|m| !m.as_str().is_empty());

        if matches!(tag.as_str(), "option" | "li" | "p")
            && stack.last().is_some_and(|(_, open)| *open == tag)
        {
            stack.pop();
        }

        let id = doc.create_element(&tag);
        if let Some(attrs) = caps.get(3) {
            apply_attributes(&mut doc, id, attrs.as_str());
        }
        let parent = stack.last().map(|(node, _)| *node).unwrap_or(doc.root());
        doc.append_child(parent, id);

        if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
            continue;
        }

        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            let rest = &markup[pos..];
            let closing = format!("</{}", tag);
            let end = rest.to_ascii_lowercase().find(&closing).unwrap_or(rest.len());
            let raw = &rest[..end];
            if !raw.is_empty() {
                let text = if tag == "textarea" || tag == "title" {
                    decode_entities(raw)
                } else {
                    raw.to_string()
                };
                let node = doc.create_text(text);
                doc.append_child(id, node);
            }
            pos += end;
            if let Some(gt) = markup[pos..].find('>') {
                pos += gt + 1;
            }
            continue;
        }

        stack.push((id, tag));
    }

    push_text(&mut doc, &stack, &markup[pos..]);
    doc
}

fn push_text(doc: &mut Document, stack: &[(NodeId, String)], text: &str) {
    if text.is_empty() {
        return;
    }
    let parent = stack.last().map(|(node, _)| *node).unwrap_or(doc.root());
    let node = doc.create_text(decode_entities(text));
    doc.append_child(parent, node);
}

/// Pop up to and including the nearest open element named `tag`
fn close(stack: &mut Vec<(NodeId, String)>, tag: &str) {
    if let Some(index) = stack.iter().rposition(|(_, open)| open == tag) {
        stack.truncate(index);
    }
}

fn apply_attributes(doc: &mut Document, id: NodeId, source: &str) {
    let Some(element) = doc.element_mut(id) else {
        return;
    };
    for caps in ATTR_REGEX.captures_iter(source) {
        let Some(name) = caps.get(1) else {
            continue;
        };
        // first occurrence wins, as in browsers
        if element.has_attr(name.as_str()) {
            continue;
        }
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| decode_entities(m.as_str()))
            .unwrap_or_default();
        element.set_attr(name.as_str(), value);
    }
}

/// Decode numeric and the common named character references
pub(crate) fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY_REGEX
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse::<u32>().ok()))
                    .and_then(char::from_u32),
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
