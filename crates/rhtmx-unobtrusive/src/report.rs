// File: src/report.rs
// Purpose: Serializable summary of the rules parsed for each form

use crate::controller::Unobtrusive;
use crate::dom::{Document, NodeId};
use crate::engine::ValidationEngine;
use crate::rules::{MessageSet, RuleSet};
use indexmap::IndexMap;
use serde::Serialize;

/// Rules and messages parsed from one form
#[derive(Serialize, Debug, Clone)]
pub struct FormReport {
    /// Position among the document's forms
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub rules: IndexMap<String, RuleSet>,
    pub messages: IndexMap<String, MessageSet>,
}

/// Forms of the document, in document order
pub fn document_forms(doc: &Document) -> Vec<NodeId> {
    doc.descendants(doc.root())
        .into_iter()
        .filter(|node| doc.element(*node).is_some_and(|e| e.tag() == "form"))
        .collect()
}

impl<E: ValidationEngine> Unobtrusive<E> {
    /// One entry per form with parsed state, indexed by document position
    pub fn report(&self, doc: &Document) -> Vec<FormReport> {
        document_forms(doc)
            .into_iter()
            .enumerate()
            .filter_map(|(index, form)| {
                let options = self.form(form)?.options();
                Some(FormReport {
                    index,
                    id: doc
                        .element(form)
                        .and_then(|e| e.attr("id"))
                        .map(str::to_string),
                    rules: options.rules.clone(),
                    messages: options.messages.clone(),
                })
            })
            .collect()
    }
}
