// File: src/standard.rs
// Purpose: Standard rule predicates (value, element, parameter) -> valid

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rhtmx_unobtrusive::{Element, RuleValue};

// HTML5 email grammar
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:https?|ftp)://[^\s/$.?#][^\s]*$").unwrap()
});

// Optional sign, optional thousands separators, optional fraction
static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:-?\d+|-?\d{1,3}(?:,\d{3})+)?(?:\.\d+)?$").unwrap()
});

static DIGITS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %B %Y", "%B %d, %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Extensions accepted when an `accept` rule carries no list
const DEFAULT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Rule names that treat an empty value as "not applicable"
pub const OPTIONAL_AWARE: &[&str] = &[
    "minlength",
    "maxlength",
    "rangelength",
    "min",
    "max",
    "range",
    "email",
    "url",
    "date",
    "number",
    "digits",
    "creditcard",
    "equalTo",
    "accept",
    "remote",
];

pub fn required(value: &str, element: &Element, _param: &RuleValue) -> bool {
    match element.tag() {
        "select" => !value.is_empty(),
        _ if element.is_checkbox() || element.input_type() == "radio" => !value.is_empty(),
        _ => !value.trim().is_empty(),
    }
}

fn length(value: &str) -> usize {
    value.chars().count()
}

fn bound(param: &RuleValue) -> Option<f64> {
    param.as_number()
}

fn number_value(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

pub fn min_length(value: &str, _element: &Element, param: &RuleValue) -> bool {
    bound(param).is_some_and(|min| length(value) as f64 >= min)
}

pub fn max_length(value: &str, _element: &Element, param: &RuleValue) -> bool {
    bound(param).is_some_and(|max| length(value) as f64 <= max)
}

pub fn range_length(value: &str, _element: &Element, param: &RuleValue) -> bool {
    let len = length(value) as f64;
    param.as_range().is_some_and(|(min, max)| len >= min && len <= max)
}

pub fn min(value: &str, _element: &Element, param: &RuleValue) -> bool {
    matches!((number_value(value), bound(param)), (Some(v), Some(min)) if v >= min)
}

pub fn max(value: &str, _element: &Element, param: &RuleValue) -> bool {
    matches!((number_value(value), bound(param)), (Some(v), Some(max)) if v <= max)
}

pub fn range(value: &str, _element: &Element, param: &RuleValue) -> bool {
    match (number_value(value), param.as_range()) {
        (Some(v), Some((min, max))) => v >= min && v <= max,
        _ => false,
    }
}

pub fn email(value: &str, _element: &Element, _param: &RuleValue) -> bool {
    EMAIL_REGEX.is_match(value)
}

pub fn url(value: &str, _element: &Element, _param: &RuleValue) -> bool {
    URL_REGEX.is_match(value)
}

/// Accepts ISO dates and datetimes, RFC 3339 and a few common written forms
pub fn date(value: &str, _element: &Element, _param: &RuleValue) -> bool {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value).is_ok()
        || DATE_FORMATS
            .iter()
            .any(|format| NaiveDate::parse_from_str(value, format).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
}

pub fn number(value: &str, _element: &Element, _param: &RuleValue) -> bool {
    !value.is_empty() && NUMBER_REGEX.is_match(value)
}

pub fn digits(value: &str, _element: &Element, _param: &RuleValue) -> bool {
    DIGITS_REGEX.is_match(value)
}

/// Luhn checksum over 13 to 19 digits; spaces and dashes are ignored
pub fn credit_card(value: &str, _element: &Element, _param: &RuleValue) -> bool {
    if value.chars().any(|c| !(c.is_ascii_digit() || c == ' ' || c == '-')) {
        return false;
    }
    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
    if !(13..=19).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, digit)| {
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                *digit
            }
        })
        .sum();
    sum % 10 == 0
}

/// File-name extension check. The list may be separated by commas or pipes.
pub fn accept(value: &str, _element: &Element, param: &RuleValue) -> bool {
    let Some((_, extension)) = value.rsplit_once('.') else {
        return false;
    };
    let extension = extension.to_ascii_lowercase();

    match param.as_str().filter(|list| !list.trim().is_empty()) {
        Some(list) => list
            .split(&[',', '|'][..])
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .any(|ext| ext == extension),
        None => DEFAULT_EXTENSIONS.contains(&extension.as_str()),
    }
}
