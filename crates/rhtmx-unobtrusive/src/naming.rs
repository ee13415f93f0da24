// File: src/naming.rs
// Purpose: Field-name helpers: model prefixes, selector escaping, list splitting

/// Characters jQuery requires to be escaped inside attribute selectors
const SELECTOR_META: &str = "!\"#$%&'()*+,./:;<=>?@[\\]^`{|}~";

/// Marker for a reference relative to the current model prefix
const WILDCARD: &str = "*.";

/// Everything up to and including the last `.` of a field name.
///
/// ```
/// use rhtmx_unobtrusive::naming::model_prefix;
/// assert_eq!(model_prefix("Items[0].Name"), "Items[0].");
/// assert_eq!(model_prefix("Name"), "");
/// ```
pub fn model_prefix(field_name: &str) -> &str {
    field_name
        .rfind('.')
        .map(|dot| &field_name[..=dot])
        .unwrap_or_default()
}

/// Replace a leading `*.` with `prefix`; other values pass through
pub fn append_model_prefix(value: &str, prefix: &str) -> String {
    match value.strip_prefix(WILDCARD) {
        Some(rest) => format!("{}{}", prefix, rest),
        None => value.to_string(),
    }
}

/// Resolve a possibly-relative field reference against `field_name`
pub fn resolve_field_reference(reference: &str, field_name: &str) -> String {
    append_model_prefix(reference, model_prefix(field_name))
}

/// Backslash-escape selector metacharacters so a value can sit inside `[attr='...']`
pub fn escape_attribute_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if SELECTOR_META.contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Trim the whole value, then split on commas with surrounding whitespace
pub fn split_and_trim(value: &str) -> Vec<String> {
    value
        .trim()
        .split(',')
        .map(|part| part.trim().to_string())
        .collect()
}
