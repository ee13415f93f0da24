// File: src/hooks.rs
// Purpose: Message-container and summary rendering driven by engine callbacks

use crate::config::ClassNames;
use crate::dom::{Document, NodeId, Selector};
use crate::engine::{FieldError, LifecycleHooks};
use crate::naming::escape_attribute_value;
use tracing::{trace, warn};

/// Element-data key linking an error label to its message container
pub const CONTAINER_DATA_KEY: &str = "unobtrusiveContainer";

/// Reads `data-valmsg-replace` the way `$.parseJSON` would
fn replace_flag(doc: &Document, container: NodeId) -> Option<serde_json::Value> {
    doc.element(container)?
        .attr("data-valmsg-replace")
        .and_then(|raw| serde_json::from_str(raw).ok())
}

fn swap_class(doc: &mut Document, node: NodeId, add: &str, remove: &str) {
    if let Some(element) = doc.element_mut(node) {
        element.remove_class(remove);
        element.add_class(add);
    }
}

fn find(doc: &Document, scope: NodeId, selector: &str) -> Vec<NodeId> {
    match Selector::parse(selector) {
        Ok(selector) => doc.find_with(scope, &selector),
        Err(err) => {
            warn!("Skipping container lookup: {}", err);
            Vec::new()
        }
    }
}

fn class_selector(class: &str) -> String {
    format!(".{}", escape_attribute_value(class))
}

/// The stock hooks: per-field message containers plus the form summary
#[derive(Debug, Clone, Default)]
pub struct UnobtrusiveHooks {
    classes: ClassNames,
}

impl UnobtrusiveHooks {
    pub fn new(classes: ClassNames) -> Self {
        Self { classes }
    }

    pub fn classes(&self) -> &ClassNames {
        &self.classes
    }

    /// Message containers declared for `field` inside `form`
    pub fn containers_for(&self, doc: &Document, form: NodeId, field: &str) -> Vec<NodeId> {
        let selector = format!("[data-valmsg-for='{}']", escape_attribute_value(field));
        find(doc, form, &selector)
    }

    /// Form reset: summaries and field containers go back to their valid
    /// classes and forget their labels. Summary list items are left in place.
    pub fn reset(&self, doc: &mut Document, form: NodeId) {
        for summary in find(doc, form, &class_selector(&self.classes.summary_errors)) {
            swap_class(doc, summary, &self.classes.summary_valid, &self.classes.summary_errors);
        }

        for container in find(doc, form, &class_selector(&self.classes.field_error)) {
            swap_class(doc, container, &self.classes.field_valid, &self.classes.field_error);
            let children = doc.child_elements(container);
            for node in std::iter::once(container).chain(children) {
                if let Some(element) = doc.element_mut(node) {
                    element.remove_data(CONTAINER_DATA_KEY);
                }
            }
        }
    }
}

impl LifecycleHooks for UnobtrusiveHooks {
    fn error_placement(&self, doc: &mut Document, form: NodeId, label: NodeId, element: NodeId) {
        let field = doc
            .element(element)
            .map(|e| e.name().to_string())
            .unwrap_or_default();
        let containers = self.containers_for(doc, form, &field);
        let replace = containers
            .first()
            .and_then(|c| replace_flag(doc, *c))
            .map_or(true, |flag| flag != serde_json::Value::Bool(false));

        for container in &containers {
            swap_class(doc, *container, &self.classes.field_error, &self.classes.field_valid);
        }
        if let (Some(container), Some(label)) = (containers.first(), doc.element_mut(label)) {
            label.set_data(CONTAINER_DATA_KEY, *container);
        }
        trace!(field = %field, containers = containers.len(), replace, "error placement");

        if replace {
            if let Some(container) = containers.first() {
                doc.empty(*container);
                if let Some(label) = doc.element_mut(label) {
                    label.remove_class(&self.classes.input_error);
                }
                doc.append_child(*container, label);
            }
        } else if let Some(label) = doc.element_mut(label) {
            label.set_hidden(true);
        }
    }

    fn invalid(&self, doc: &mut Document, form: NodeId, errors: &[FieldError]) {
        let containers = find(doc, form, "[data-valmsg-summary=true]");
        let lists: Vec<NodeId> = containers
            .iter()
            .flat_map(|container| find(doc, *container, "ul"))
            .collect();

        if lists.is_empty() || errors.is_empty() {
            return;
        }

        for container in &containers {
            swap_class(doc, *container, &self.classes.summary_errors, &self.classes.summary_valid);
        }
        for list in lists {
            doc.empty(list);
            for error in errors {
                let item = doc.create_element("li");
                doc.set_text(item, &error.message);
                doc.append_child(list, item);
            }
        }
    }

    fn success(&self, doc: &mut Document, _form: NodeId, label: NodeId) {
        let Some(container) = doc.element(label).and_then(|e| e.data(CONTAINER_DATA_KEY)) else {
            return;
        };
        let replace = replace_flag(doc, container) == Some(serde_json::Value::Bool(true));

        swap_class(doc, container, &self.classes.field_valid, &self.classes.field_error);
        if let Some(label) = doc.element_mut(label) {
            label.remove_data(CONTAINER_DATA_KEY);
        }
        if replace {
            doc.empty(container);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MARKUP: &str = r#"
        <form id="f">
            <div data-valmsg-summary="true" class="validation-summary-valid"><ul><li style="display:none"></li></ul></div>
            <input name="Items[0].Name">
            <span data-valmsg-for="Items[0].Name" class="field-validation-valid" data-valmsg-replace="true"></span>
            <input name="Age">
            <span data-valmsg-for="Age" class="field-validation-valid" data-valmsg-replace="false">Age hint</span>
        </form>"#;

    fn setup() -> (Document, NodeId, UnobtrusiveHooks) {
        let doc = Document::parse_html(MARKUP);
        let form = doc.select("#f").unwrap()[0];
        (doc, form, UnobtrusiveHooks::default())
    }

    fn label(doc: &mut Document, text: &str) -> NodeId {
        let label = doc.create_element("span");
        doc.element_mut(label).unwrap().add_class("input-validation-error");
        doc.set_text(label, text);
        label
    }

    #[test]
    fn test_error_placement_replace_mode() {
        let (mut doc, form, hooks) = setup();
        let input = doc.select("[name='Items[0].Name']").unwrap()[0];
        let container = hooks.containers_for(&doc, form, "Items[0].Name")[0];
        let label = label(&mut doc, "Name is required");

        hooks.error_placement(&mut doc, form, label, input);

        let element = doc.element(container).unwrap();
        assert!(element.has_class("field-validation-error"));
        assert!(!element.has_class("field-validation-valid"));
        assert_eq!(doc.children(container), &[label]);
        assert_eq!(doc.text_content(container), "Name is required");
        assert!(!doc.element(label).unwrap().has_class("input-validation-error"));
        assert_eq!(doc.element(label).unwrap().data(CONTAINER_DATA_KEY), Some(container));
    }

    #[test]
    fn test_error_placement_hide_mode() {
        let (mut doc, form, hooks) = setup();
        let input = doc.select("[name=Age]").unwrap()[0];
        let container = hooks.containers_for(&doc, form, "Age")[0];
        let label = label(&mut doc, "Too young");

        hooks.error_placement(&mut doc, form, label, input);

        assert!(doc.element(label).unwrap().is_hidden());
        assert_eq!(doc.text_content(container), "Age hint");
        assert!(doc.element(container).unwrap().has_class("field-validation-error"));
    }

    #[test]
    fn test_success_reverts_and_clears_replace_container() {
        let (mut doc, form, hooks) = setup();
        let input = doc.select("[name='Items[0].Name']").unwrap()[0];
        let container = hooks.containers_for(&doc, form, "Items[0].Name")[0];
        let label = label(&mut doc, "Name is required");
        hooks.error_placement(&mut doc, form, label, input);

        hooks.success(&mut doc, form, label);

        let element = doc.element(container).unwrap();
        assert!(element.has_class("field-validation-valid"));
        assert!(!element.has_class("field-validation-error"));
        assert!(doc.children(container).is_empty());
        assert_eq!(doc.element(label).unwrap().data(CONTAINER_DATA_KEY), None);
    }

    #[test]
    fn test_success_without_container_is_noop() {
        let (mut doc, form, hooks) = setup();
        let label = label(&mut doc, "orphan");
        hooks.success(&mut doc, form, label);
        assert_eq!(doc.text_content(label), "orphan");
    }

    #[test]
    fn test_invalid_fills_summary() {
        let (mut doc, form, hooks) = setup();
        let input = doc.select("[name=Age]").unwrap()[0];
        let errors = vec![
            FieldError { element: input, field: "Age".into(), message: "<b>Too young</b>".into() },
            FieldError { element: input, field: "Name".into(), message: "Required".into() },
        ];

        hooks.invalid(&mut doc, form, &errors);

        let summary = doc.select("[data-valmsg-summary=true]").unwrap()[0];
        let list = doc.find(summary, "ul").unwrap()[0];
        let items: Vec<String> = doc
            .child_elements(list)
            .into_iter()
            .map(|li| doc.text_content(li))
            .collect();
        assert_eq!(items, vec!["<b>Too young</b>", "Required"]);
        assert!(doc.element(summary).unwrap().has_class("validation-summary-errors"));
        assert!(!doc.element(summary).unwrap().has_class("validation-summary-valid"));
    }

    #[test]
    fn test_invalid_without_errors_leaves_summary() {
        let (mut doc, form, hooks) = setup();
        hooks.invalid(&mut doc, form, &[]);
        let summary = doc.select("[data-valmsg-summary=true]").unwrap()[0];
        assert!(doc.element(summary).unwrap().has_class("validation-summary-valid"));
    }

    #[test]
    fn test_reset_restores_valid_state() {
        let (mut doc, form, hooks) = setup();
        let input = doc.select("[name='Items[0].Name']").unwrap()[0];
        let container = hooks.containers_for(&doc, form, "Items[0].Name")[0];
        let label = label(&mut doc, "Name is required");
        hooks.error_placement(&mut doc, form, label, input);
        hooks.invalid(
            &mut doc,
            form,
            &[FieldError { element: input, field: "Items[0].Name".into(), message: "x".into() }],
        );

        hooks.reset(&mut doc, form);

        let summary = doc.select("[data-valmsg-summary=true]").unwrap()[0];
        assert!(doc.element(summary).unwrap().has_class("validation-summary-valid"));
        assert!(doc.element(container).unwrap().has_class("field-validation-valid"));
        assert!(!doc.element(container).unwrap().has_class("field-validation-error"));
        assert_eq!(doc.element(label).unwrap().data(CONTAINER_DATA_KEY), None);
    }
}
