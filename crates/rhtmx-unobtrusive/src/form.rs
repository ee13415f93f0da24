// File: src/form.rs
// Purpose: Per-form validation state (rules, messages, hooks) and its attach/validate operations

use crate::dom::{Document, NodeId};
use crate::engine::{LifecycleHooks, ValidationEngine};
use crate::rules::{MessageSet, RuleSet};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// The options object handed to the engine when a form is attached
#[derive(Clone, Serialize)]
pub struct ValidationOptions {
    /// Class the engine puts on failing inputs and fresh labels
    pub error_class: String,
    /// Tag of the labels the engine creates
    pub error_element: String,
    /// Field name → rules
    pub rules: IndexMap<String, RuleSet>,
    /// Field name → messages
    pub messages: IndexMap<String, MessageSet>,
    #[serde(skip)]
    pub hooks: Arc<dyn LifecycleHooks>,
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("error_class", &self.error_class)
            .field("error_element", &self.error_element)
            .field("rules", &self.rules)
            .field("messages", &self.messages)
            .finish_non_exhaustive()
    }
}

impl ValidationOptions {
    pub fn new(
        error_class: impl Into<String>,
        error_element: impl Into<String>,
        hooks: Arc<dyn LifecycleHooks>,
    ) -> Self {
        Self {
            error_class: error_class.into(),
            error_element: error_element.into(),
            rules: IndexMap::new(),
            messages: IndexMap::new(),
            hooks,
        }
    }

    pub fn rules_for(&self, field: &str) -> Option<&RuleSet> {
        self.rules.get(field)
    }

    /// Configured message for `rule` on `field`
    pub fn message_for(&self, field: &str, rule: &str) -> Option<&str> {
        self.messages
            .get(field)
            .and_then(|messages| messages.get(rule))
            .map(String::as_str)
    }
}

/// Cached validation state of one form
#[derive(Debug, Clone)]
pub struct FormValidation {
    form: NodeId,
    options: ValidationOptions,
    attached: bool,
}

impl FormValidation {
    pub fn new(form: NodeId, options: ValidationOptions) -> Self {
        Self {
            form,
            options,
            attached: false,
        }
    }

    pub fn form(&self) -> NodeId {
        self.form
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// True once the form is bound to the engine and its reset handler installed
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Replace the rule and message sets of one field
    pub fn set_field(&mut self, field: String, rules: RuleSet, messages: MessageSet) {
        self.options.rules.insert(field.clone(), rules);
        self.options.messages.insert(field, messages);
    }

    /// Bind to the engine. The reset handler is installed once, however many
    /// times this runs.
    pub fn attach<E: ValidationEngine + ?Sized>(&mut self, engine: &mut E, doc: &Document) {
        engine.attach(doc, self.form, &self.options);
        if !self.attached {
            debug!(
                form = self.form.index(),
                fields = self.options.rules.len(),
                "attached unobtrusive validation"
            );
        }
        self.attached = true;
    }

    /// Trigger full-form validation and report validity
    pub fn validate<E: ValidationEngine + ?Sized>(&mut self, engine: &mut E, doc: &mut Document) -> bool {
        engine.attach(doc, self.form, &self.options);
        engine.validate_form(doc, self.form, &self.options)
    }
}
