// File: src/dom/selector.rs
// Purpose: The compound-selector subset the validation layer queries with

use super::Element;
use crate::error::{Result, UnobtrusiveError};

/// Attribute condition inside `[...]`
#[derive(Debug, Clone, PartialEq)]
enum AttrTest {
    Present(String),
    Equals(String, String),
}

/// One compound selector: `tag#id.class[attr=value]:input`
#[derive(Debug, Clone, PartialEq, Default)]
struct Compound {
    tag: Option<String>,
    form_control: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

impl Compound {
    fn matches(&self, element: &Element) -> bool {
        self.tag.as_deref().map_or(true, |tag| element.tag() == tag)
            && (!self.form_control || element.is_form_control())
            && self
                .id
                .as_deref()
                .map_or(true, |id| element.attr("id") == Some(id))
            && self.classes.iter().all(|class| element.has_class(class))
            && self.attrs.iter().all(|test| match test {
                AttrTest::Present(name) => element.has_attr(name),
                AttrTest::Equals(name, value) => element.attr(name) == Some(value.as_str()),
            })
    }
}

/// Comma-separated list of compound selectors.
///
/// Supports tag names, `*`, `#id`, `.class`, `[attr]`, `[attr=value]` (bare,
/// single or double quoted, with backslash escapes) and the `:input`
/// pseudo-class. Combinators are not supported.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    groups: Vec<Compound>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = |reason: &str| UnobtrusiveError::InvalidSelector {
            selector: source.to_string(),
            reason: reason.to_string(),
        };

        let mut groups = Vec::new();
        let mut current = Compound::default();
        let mut has_parts = false;
        let mut chars = source.trim().chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                ',' => {
                    if !has_parts {
                        return Err(invalid("empty selector group"));
                    }
                    groups.push(std::mem::take(&mut current));
                    has_parts = false;
                    while chars.peek().is_some_and(|c| c.is_whitespace()) {
                        chars.next();
                    }
                }
                '*' => has_parts = true,
                '#' => {
                    let id = read_ident(&mut chars);
                    if id.is_empty() {
                        return Err(invalid("expected id after '#'"));
                    }
                    current.id = Some(id);
                    has_parts = true;
                }
                '.' => {
                    let class = read_ident(&mut chars);
                    if class.is_empty() {
                        return Err(invalid("expected class after '.'"));
                    }
                    current.classes.push(class);
                    has_parts = true;
                }
                ':' => {
                    let pseudo = read_ident(&mut chars);
                    if pseudo != "input" {
                        return Err(invalid("only the :input pseudo-class is supported"));
                    }
                    current.form_control = true;
                    has_parts = true;
                }
                '[' => {
                    current.attrs.push(read_attr_test(&mut chars).map_err(|r| invalid(r))?);
                    has_parts = true;
                }
                c if c.is_whitespace() => {
                    while chars.peek().is_some_and(|c| c.is_whitespace()) {
                        chars.next();
                    }
                    if chars.peek().is_some_and(|c| *c != ',') {
                        return Err(invalid("combinators are not supported"));
                    }
                }
                c if is_ident_char(c) => {
                    let mut tag = c.to_string();
                    tag.push_str(&read_ident(&mut chars));
                    current.tag = Some(tag.to_ascii_lowercase());
                    has_parts = true;
                }
                _ => return Err(invalid("unexpected character")),
            }
        }

        if !has_parts {
            return Err(invalid("empty selector"));
        }
        groups.push(current);
        Ok(Self { groups })
    }

    pub fn matches(&self, element: &Element) -> bool {
        self.groups.iter().any(|group| group.matches(element))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if c == '\\' {
            chars.next();
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else if is_ident_char(c) {
            out.push(c);
            chars.next();
        } else {
            break;
        }
    }
    out
}

fn read_attr_test(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> std::result::Result<AttrTest, &'static str> {
    let name = read_ident(chars).to_ascii_lowercase();
    if name.is_empty() {
        return Err("expected attribute name");
    }
    match chars.next() {
        Some(']') => Ok(AttrTest::Present(name)),
        Some('=') => {
            let quote = match chars.peek() {
                Some(&q) if q == '\'' || q == '"' => {
                    chars.next();
                    Some(q)
                }
                _ => None,
            };
            let mut value = String::new();
            loop {
                match (chars.next(), quote) {
                    (None, _) => return Err("unterminated attribute selector"),
                    (Some('\\'), _) => match chars.next() {
                        Some(escaped) => value.push(escaped),
                        None => return Err("dangling escape"),
                    },
                    (Some(c), Some(q)) if c == q => break,
                    (Some(']'), None) => return Ok(AttrTest::Equals(name, value)),
                    (Some(c), _) => value.push(c),
                }
            }
            match chars.next() {
                Some(']') => Ok(AttrTest::Equals(name, value)),
                _ => Err("expected ']' after attribute value"),
            }
        }
        _ => Err("expected ']' or '='"),
    }
}
