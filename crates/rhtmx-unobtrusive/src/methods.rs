// File: src/methods.rs
// Purpose: Custom rule predicates the layer registers with the engine

use crate::dom::Element;
use crate::engine::ValidationEngine;
use crate::rules::{RuleValue, DUMMY_RULE};
use fancy_regex::Regex;
use std::sync::Arc;
use tracing::warn;

/// Register `__dummy__`, `regex` and `nonalphamin` with an engine
pub fn register_methods<E: ValidationEngine + ?Sized>(engine: &mut E) {
    engine.add_method(DUMMY_RULE, Arc::new(dummy));
    engine.add_method("regex", Arc::new(regex_match));
    engine.add_method("nonalphamin", Arc::new(non_alpha_min));
}

/// Always valid; only exists so the engine tracks the field
pub fn dummy(_value: &str, _element: &Element, _param: &RuleValue) -> bool {
    true
}

/// Rewrites `\d` and `\w` and their negations to ASCII classes, and escapes
/// characters that only have a meaning inside classes of this engine
fn ascii_classes(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut in_class = false;
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(escaped) = chars.next() else {
                    out.push('\\');
                    break;
                };
                let class = match (escaped, in_class) {
                    ('d', false) => "[0-9]",
                    ('D', false) => "[^0-9]",
                    ('w', false) => "[A-Za-z0-9_]",
                    ('W', false) => "[^A-Za-z0-9_]",
                    ('d', true) => "0-9",
                    ('D', true) => r"\x00-\x2F\x3A-\x{10FFFF}",
                    ('w', true) => "A-Za-z0-9_",
                    ('W', true) => r"\x00-\x2F\x3A-\x40\x5B-\x5E\x60\x7B-\x{10FFFF}",
                    _ => {
                        out.push('\\');
                        out.push(escaped);
                        continue;
                    }
                };
                out.push_str(class);
            }
            '[' if in_class => out.push_str(r"\["),
            '&' | '~' if in_class => {
                out.push('\\');
                out.push(c);
            }
            '[' => {
                in_class = true;
                out.push(c);
            }
            ']' => {
                in_class = false;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// The leftmost match of the pattern must start at 0 and cover the whole
/// value. Empty values pass; unusable patterns fail.
///
/// Patterns may use lookaround and backreferences. `\d` and `\w` match
/// ASCII only.
pub fn regex_match(value: &str, _element: &Element, param: &RuleValue) -> bool {
    if value.is_empty() {
        return true;
    }
    let pattern = param.as_str().unwrap_or_default();
    let regex = match Regex::new(&ascii_classes(pattern)) {
        Ok(regex) => regex,
        Err(err) => {
            warn!("Invalid regex rule pattern {:?}: {}", pattern, err);
            return false;
        }
    };
    match regex.find(value) {
        Ok(found) => found.is_some_and(|m| m.start() == 0 && m.end() == value.len()),
        Err(err) => {
            warn!("Regex rule pattern {:?} gave up on input: {}", pattern, err);
            false
        }
    }
}

/// Counts characters outside `[A-Za-z0-9_]` and compares with the threshold.
///
/// A missing or empty threshold fails, and so does a value with no such
/// characters at all, whatever the threshold.
pub fn non_alpha_min(value: &str, _element: &Element, param: &RuleValue) -> bool {
    let Some(threshold) = param.as_str().filter(|t| !t.is_empty()) else {
        return false;
    };
    let count = value
        .chars()
        .filter(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        .count();
    count > 0
        && threshold
            .trim()
            .parse::<f64>()
            .is_ok_and(|min| count as f64 >= min)
}
