// File: src/engine.rs
// Purpose: Contract between the unobtrusive layer and a validation engine

use crate::dom::{Document, Element, NodeId};
use crate::form::ValidationOptions;
use crate::rules::RuleValue;
use serde::Serialize;
use std::sync::Arc;

/// Custom rule predicate: `(value, element, rule parameter) -> valid`
pub type RuleMethod = Arc<dyn Fn(&str, &Element, &RuleValue) -> bool + Send + Sync>;

/// One outstanding failure, as handed to the invalid handler
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub element: NodeId,
    pub field: String,
    pub message: String,
}

/// Callbacks the engine invokes at fixed points of a validation pass.
///
/// `form` identifies the form the options were attached for.
pub trait LifecycleHooks: Send + Sync {
    /// A field failed and the engine created its error label
    fn error_placement(&self, doc: &mut Document, form: NodeId, label: NodeId, element: NodeId);

    /// Full-form validation finished with outstanding errors
    fn invalid(&self, doc: &mut Document, form: NodeId, errors: &[FieldError]);

    /// A field that had a label became valid
    fn success(&self, doc: &mut Document, form: NodeId, label: NodeId);
}

/// The validation engine the adapters feed.
///
/// Implementations own per-form runtime state (error labels, submitted
/// fields); rules and messages always come from the caller's options, so
/// rules added by a later parse are seen on the next pass.
pub trait ValidationEngine {
    /// Register a named rule predicate
    fn add_method(&mut self, name: &str, method: RuleMethod);

    /// Bind the engine to a form. Binding an already bound form is a no-op.
    fn attach(&mut self, doc: &Document, form: NodeId, options: &ValidationOptions);

    /// Validate every tracked field; reports overall validity
    fn validate_form(&mut self, doc: &mut Document, form: NodeId, options: &ValidationOptions) -> bool;

    /// Validate a single field (keystroke or blur)
    fn validate_element(
        &mut self,
        doc: &mut Document,
        form: NodeId,
        element: NodeId,
        options: &ValidationOptions,
    ) -> bool;

    /// Clear the engine's error state for a form
    fn reset_form(&mut self, doc: &mut Document, form: NodeId);

    /// Drop everything held for a form that left the document
    fn forget(&mut self, _form: NodeId) {}
}
