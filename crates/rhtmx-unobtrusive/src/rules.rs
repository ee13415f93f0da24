// File: src/rules.rs
// Purpose: Rule parameter values produced by adapters and consumed by engines

use crate::dom::{Document, NodeId, Selector};
use crate::naming::escape_attribute_value;
use indexmap::IndexMap;
use serde::Serialize;

/// Rule name → parameter for one field. Later writes replace earlier ones.
pub type RuleSet = IndexMap<String, RuleValue>;

/// Rule name → failure message for one field
pub type MessageSet = IndexMap<String, String>;

/// Placeholder rule that makes the engine track fields with no other rules
pub const DUMMY_RULE: &str = "__dummy__";

/// Parameter attached to a rule
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleValue {
    /// Parameterless rule (`required`, `email`, ...)
    Flag(bool),
    /// Single attribute value, kept as written in the markup
    Value(String),
    /// The adapter's parameter attribute was absent
    Missing,
    /// `[min, max]` for range-style rules
    Range(String, String),
    /// Another field this one must equal
    EqualTo(FieldRef),
    /// Server round-trip descriptor
    Remote(RemoteRequest),
}

impl RuleValue {
    pub fn value(value: impl Into<String>) -> Self {
        Self::Value(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Numeric reading of a single value (`"8"` → `8.0`)
    pub fn as_number(&self) -> Option<f64> {
        self.as_str().and_then(|value| value.trim().parse().ok())
    }

    /// Numeric reading of a range pair
    pub fn as_range(&self) -> Option<(f64, f64)> {
        match self {
            Self::Range(min, max) => Some((min.trim().parse().ok()?, max.trim().parse().ok()?)),
            _ => None,
        }
    }
}

/// Resolved cross-field reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRef {
    /// Fully prefixed field name
    pub name: String,
    /// The matching form control, when one existed at parse time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<NodeId>,
}

/// Request descriptor for remote validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteRequest {
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub method: String,
    /// Fully prefixed names of the fields sent along with the request
    #[serde(rename = "data")]
    pub fields: Vec<String>,
}

impl RemoteRequest {
    /// Read each field's current value from the form. Values are looked up at
    /// call time, so edits made after parsing are picked up.
    pub fn data(&self, doc: &Document, form: NodeId) -> IndexMap<String, Option<String>> {
        self.fields
            .iter()
            .map(|field| {
                let value = field_control(doc, form, field).map(|control| doc.value(control));
                (field.clone(), value)
            })
            .collect()
    }
}

/// First form control in `form` whose `name` equals `field`
pub fn field_control(doc: &Document, form: NodeId, field: &str) -> Option<NodeId> {
    let selector = format!(":input[name='{}']", escape_attribute_value(field));
    let selector = Selector::parse(&selector).ok()?;
    doc.find_with(form, &selector).into_iter().next()
}
