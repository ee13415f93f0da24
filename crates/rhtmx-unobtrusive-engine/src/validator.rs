// File: src/validator.rs
// Purpose: Reference engine: evaluates rules, manages error labels, calls the lifecycle hooks

use crate::messages::default_message;
use crate::standard::{self, OPTIONAL_AWARE};
use indexmap::IndexMap;
use rhtmx_unobtrusive::rules::field_control;
use rhtmx_unobtrusive::{
    Document, Element, FieldError, NodeId, RemoteRequest, RuleMethod, RuleValue, ValidationEngine,
    ValidationOptions,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Answers remote rules: `(request, value, additional field values) -> valid`
pub type RemoteChecker =
    Arc<dyn Fn(&RemoteRequest, &str, &IndexMap<String, Option<String>>) -> bool + Send + Sync>;

type StandardMethod = fn(&str, &Element, &RuleValue) -> bool;

const STANDARD_METHODS: &[(&str, StandardMethod)] = &[
    ("required", standard::required),
    ("minlength", standard::min_length),
    ("maxlength", standard::max_length),
    ("rangelength", standard::range_length),
    ("min", standard::min),
    ("max", standard::max),
    ("range", standard::range),
    ("email", standard::email),
    ("url", standard::url),
    ("date", standard::date),
    ("number", standard::number),
    ("digits", standard::digits),
    ("creditcard", standard::credit_card),
    ("accept", standard::accept),
];

/// Runtime state of one bound form
#[derive(Debug, Default)]
struct FormState {
    error_class: String,
    /// Control → the error label created for it
    labels: HashMap<NodeId, NodeId>,
    /// Controls whose label went through `error_placement` since the last success or reset
    placed: HashSet<NodeId>,
    /// Controls currently failing, in the order they failed
    invalid: IndexMap<NodeId, FieldError>,
    submitted: bool,
}

/// Controls the engine never validates
fn is_ignored(element: &Element) -> bool {
    element.is_hidden() || element.has_attr("disabled") || element.input_type() == "hidden"
}

/// `required` runs first and `remote` last, whatever order the rules came in
fn ordered_rules(rules: &IndexMap<String, RuleValue>) -> Vec<(&str, &RuleValue)> {
    let mut ordered: Vec<(&str, &RuleValue)> = rules
        .iter()
        .filter(|(_, param)| **param != RuleValue::Flag(false))
        .map(|(rule, param)| (rule.as_str(), param))
        .collect();
    ordered.sort_by_key(|(rule, _)| match *rule {
        "required" => 0,
        "remote" => 2,
        _ => 1,
    });
    ordered
}

/// Reference validation engine
pub struct Validator {
    methods: HashMap<String, RuleMethod>,
    forms: HashMap<NodeId, FormState>,
    remote: Option<RemoteChecker>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Engine with the standard methods registered
    pub fn new() -> Self {
        let mut methods: HashMap<String, RuleMethod> = HashMap::new();
        for (name, method) in STANDARD_METHODS {
            methods.insert(name.to_string(), Arc::new(*method));
        }
        Self {
            methods,
            forms: HashMap::new(),
            remote: None,
        }
    }

    /// Install the checker consulted by `remote` rules. Without one, remote
    /// rules always pass.
    pub fn with_remote<F>(mut self, checker: F) -> Self
    where
        F: Fn(&RemoteRequest, &str, &IndexMap<String, Option<String>>) -> bool + Send + Sync + 'static,
    {
        self.remote = Some(Arc::new(checker));
        self
    }

    /// True once `form` went through a full validation since its last reset
    pub fn is_submitted(&self, form: NodeId) -> bool {
        self.forms.get(&form).is_some_and(|state| state.submitted)
    }

    /// Outstanding failures of `form`
    pub fn errors(&self, form: NodeId) -> Vec<FieldError> {
        self.forms
            .get(&form)
            .map(|state| state.invalid.values().cloned().collect())
            .unwrap_or_default()
    }

    /// The error label created for `element`, if it ever failed
    pub fn label_for(&self, form: NodeId, element: NodeId) -> Option<NodeId> {
        self.forms.get(&form)?.labels.get(&element).copied()
    }

    fn check_rule(
        &self,
        doc: &Document,
        form: NodeId,
        rule: &str,
        param: &RuleValue,
        value: &str,
        element: &Element,
    ) -> bool {
        if OPTIONAL_AWARE.contains(&rule) && !standard::required(value, element, param) {
            return true;
        }
        match rule {
            "equalTo" => {
                let RuleValue::EqualTo(target) = param else {
                    return false;
                };
                target
                    .element
                    .filter(|id| doc.is_element(*id))
                    .or_else(|| field_control(doc, form, &target.name))
                    .is_some_and(|other| doc.value(other) == value)
            }
            "remote" => match (&self.remote, param) {
                (Some(checker), RuleValue::Remote(request)) => {
                    checker(request, value, &request.data(doc, form))
                }
                _ => true,
            },
            _ => match self.methods.get(rule) {
                Some(method) => method(value, element, param),
                None => {
                    warn!("No method registered for rule {:?}, skipping", rule);
                    true
                }
            },
        }
    }

    /// First failing rule of one field, as the error to report
    fn evaluate(
        &self,
        doc: &Document,
        form: NodeId,
        element: NodeId,
        field: &str,
        options: &ValidationOptions,
    ) -> Option<FieldError> {
        let rules = options.rules_for(field)?;
        let control = doc.element(element)?;
        let value = doc.value(element);

        let (rule, param) = ordered_rules(rules)
            .into_iter()
            .find(|(rule, param)| !self.check_rule(doc, form, rule, param, &value, control))?;
        trace!(field, rule, "rule failed");

        let message = options
            .message_for(field, rule)
            .map(str::to_string)
            .unwrap_or_else(|| default_message(rule, field, param));
        Some(FieldError {
            element,
            field: field.to_string(),
            message,
        })
    }

    /// Mark the control and show its label. The label is created on first
    /// failure and reused afterwards; placement runs again only after a
    /// success or reset released it.
    fn show_error(&mut self, doc: &mut Document, form: NodeId, error: &FieldError, options: &ValidationOptions) {
        let state = self.forms.entry(form).or_insert_with(|| FormState {
            error_class: options.error_class.clone(),
            ..FormState::default()
        });
        if let Some(element) = doc.element_mut(error.element) {
            element.add_class(&options.error_class);
        }

        let label = match state.labels.get(&error.element).copied() {
            Some(label) => label,
            None => {
                let owner = doc
                    .element(error.element)
                    .map(|e| e.attr("id").unwrap_or(e.name()).to_string())
                    .unwrap_or_default();
                let label = doc.create_element(&options.error_element);
                if let Some(element) = doc.element_mut(label) {
                    element.add_class(&options.error_class);
                    element.set_attr("id", format!("{}-error", owner));
                    element.set_attr("for", owner);
                }
                state.labels.insert(error.element, label);
                label
            }
        };
        doc.set_text(label, &error.message);

        if state.placed.insert(error.element) {
            if let Some(element) = doc.element_mut(label) {
                element.set_hidden(false);
            }
            options.hooks.error_placement(doc, form, label, error.element);
        }
        state.invalid.insert(error.element, error.clone());
    }

    /// Unmark the control; a control that was failing gets the success hook
    fn show_success(&mut self, doc: &mut Document, form: NodeId, element: NodeId, options: &ValidationOptions) {
        if let Some(control) = doc.element_mut(element) {
            control.remove_class(&options.error_class);
        }
        let Some(state) = self.forms.get_mut(&form) else {
            return;
        };
        if state.invalid.shift_remove(&element).is_none() {
            return;
        }
        state.placed.remove(&element);
        if let Some(label) = state.labels.get(&element).copied() {
            doc.set_text(label, "");
            if let Some(label) = doc.element_mut(label) {
                label.set_hidden(true);
            }
            options.hooks.success(doc, form, label);
        }
    }
}

impl ValidationEngine for Validator {
    fn add_method(&mut self, name: &str, method: RuleMethod) {
        self.methods.insert(name.to_string(), method);
    }

    fn attach(&mut self, _doc: &Document, form: NodeId, options: &ValidationOptions) {
        if self.forms.contains_key(&form) {
            return;
        }
        trace!(form = form.index(), "binding form");
        self.forms.insert(
            form,
            FormState {
                error_class: options.error_class.clone(),
                ..FormState::default()
            },
        );
    }

    fn validate_form(&mut self, doc: &mut Document, form: NodeId, options: &ValidationOptions) -> bool {
        self.attach(doc, form, options);
        if let Some(state) = self.forms.get_mut(&form) {
            state.submitted = true;
        }

        let mut errors = Vec::new();
        let mut passed = Vec::new();
        for field in options.rules.keys() {
            let Some(element) = field_control(doc, form, field) else {
                continue;
            };
            if doc.element(element).map_or(true, is_ignored) {
                continue;
            }
            match self.evaluate(doc, form, element, field, options) {
                Some(error) => errors.push(error),
                None => passed.push(element),
            }
        }

        if !errors.is_empty() {
            options.hooks.invalid(doc, form, &errors);
        }
        for error in &errors {
            self.show_error(doc, form, error, options);
        }
        for element in passed {
            self.show_success(doc, form, element, options);
        }

        debug!(form = form.index(), errors = errors.len(), "validated form");
        errors.is_empty()
    }

    fn validate_element(
        &mut self,
        doc: &mut Document,
        form: NodeId,
        element: NodeId,
        options: &ValidationOptions,
    ) -> bool {
        let Some(control) = doc.element(element) else {
            return true;
        };
        if is_ignored(control) {
            return true;
        }
        let field = control.name().to_string();
        if options.rules_for(&field).is_none() {
            return true;
        }

        match self.evaluate(doc, form, element, &field, options) {
            Some(error) => {
                self.show_error(doc, form, &error, options);
                false
            }
            None => {
                self.show_success(doc, form, element, options);
                true
            }
        }
    }

    fn reset_form(&mut self, doc: &mut Document, form: NodeId) {
        let Some(state) = self.forms.get_mut(&form) else {
            return;
        };
        for (element, label) in &state.labels {
            doc.set_text(*label, "");
            if let Some(label) = doc.element_mut(*label) {
                label.set_hidden(true);
            }
            if let Some(control) = doc.element_mut(*element) {
                control.remove_class(&state.error_class);
            }
        }
        state.invalid.clear();
        state.placed.clear();
        state.submitted = false;
        debug!(form = form.index(), "engine state reset");
    }

    fn forget(&mut self, form: NodeId) {
        self.forms.remove(&form);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rhtmx_unobtrusive::{FieldRef, LifecycleHooks, RuleSet};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Calls(Mutex<Vec<String>>);

    impl LifecycleHooks for Calls {
        fn error_placement(&self, _doc: &mut Document, _form: NodeId, _label: NodeId, _element: NodeId) {
            self.0.lock().unwrap().push("placement".into());
        }

        fn invalid(&self, _doc: &mut Document, _form: NodeId, errors: &[FieldError]) {
            self.0.lock().unwrap().push(format!("invalid:{}", errors.len()));
        }

        fn success(&self, _doc: &mut Document, _form: NodeId, _label: NodeId) {
            self.0.lock().unwrap().push("success".into());
        }
    }

    fn options(calls: Arc<Calls>, field: &str, rules: RuleSet) -> ValidationOptions {
        let mut options = ValidationOptions::new("input-validation-error", "span", calls);
        options.rules.insert(field.to_string(), rules);
        options
    }

    fn rules(entries: &[(&str, RuleValue)]) -> RuleSet {
        entries
            .iter()
            .map(|(rule, value)| (rule.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_required_runs_before_other_rules() {
        let mut doc = Document::parse_html(r#"<form><input name="Age"></form>"#);
        let form = doc.select("form").unwrap()[0];
        let calls = Arc::new(Calls::default());
        let options = options(
            calls.clone(),
            "Age",
            rules(&[("min", RuleValue::value("18")), ("required", RuleValue::Flag(true))]),
        );
        let mut engine = Validator::new();

        assert!(!engine.validate_form(&mut doc, form, &options));
        assert_eq!(engine.errors(form)[0].message, "This field is required.");
        assert_eq!(*calls.0.lock().unwrap(), vec!["invalid:1", "placement"]);
    }

    #[test]
    fn test_empty_optional_field_skips_standard_methods() {
        let mut doc = Document::parse_html(r#"<form><input name="Mail"></form>"#);
        let form = doc.select("form").unwrap()[0];
        let options = options(
            Arc::new(Calls::default()),
            "Mail",
            rules(&[("email", RuleValue::Flag(true)), ("minlength", RuleValue::value("5"))]),
        );
        assert!(Validator::new().validate_form(&mut doc, form, &options));
    }

    #[test]
    fn test_false_flag_disables_rule() {
        let mut doc = Document::parse_html(r#"<form><input name="Code"></form>"#);
        let form = doc.select("form").unwrap()[0];
        let options = options(
            Arc::new(Calls::default()),
            "Code",
            rules(&[("required", RuleValue::Flag(false))]),
        );
        assert!(Validator::new().validate_form(&mut doc, form, &options));
    }

    #[test]
    fn test_equal_to_compares_values() {
        let mut doc = Document::parse_html(
            r#"<form><input name="Pw" value="secret"><input name="Confirm" value="secrets"></form>"#,
        );
        let form = doc.select("form").unwrap()[0];
        let confirm = doc.select("[name=Confirm]").unwrap()[0];
        let target = RuleValue::EqualTo(FieldRef { name: "Pw".into(), element: None });
        let options = options(Arc::new(Calls::default()), "Confirm", rules(&[("equalTo", target)]));
        let mut engine = Validator::new();

        assert!(!engine.validate_element(&mut doc, form, confirm, &options));
        doc.set_value(confirm, "secret");
        assert!(engine.validate_element(&mut doc, form, confirm, &options));
    }

    #[test]
    fn test_remote_uses_checker() {
        let mut doc = Document::parse_html(r#"<form><input name="User" value="taken"></form>"#);
        let form = doc.select("form").unwrap()[0];
        let user = doc.select("input").unwrap()[0];
        let request = RemoteRequest {
            url: Some("/users/available".into()),
            method: "GET".into(),
            fields: vec!["User".into()],
        };
        let options = options(
            Arc::new(Calls::default()),
            "User",
            rules(&[("remote", RuleValue::Remote(request))]),
        );

        assert!(Validator::new().validate_element(&mut doc, form, user, &options));

        let mut engine = Validator::new().with_remote(|_request, value, data| {
            value != "taken" && data.get("User").is_some()
        });
        assert!(!engine.validate_element(&mut doc, form, user, &options));
        assert_eq!(engine.errors(form)[0].message, "Please fix this field.");
    }

    #[test]
    fn test_unknown_rule_is_skipped() {
        let mut doc = Document::parse_html(r#"<form><input name="X" value="1"></form>"#);
        let form = doc.select("form").unwrap()[0];
        let options = options(Arc::new(Calls::default()), "X", rules(&[("mystery", RuleValue::Flag(true))]));
        assert!(Validator::new().validate_form(&mut doc, form, &options));
    }

    #[test]
    fn test_ignores_hidden_and_disabled_controls() {
        let mut doc = Document::parse_html(
            r#"<form><input type="hidden" name="A"><input name="B" disabled></form>"#,
        );
        let form = doc.select("form").unwrap()[0];
        let mut options = options(Arc::new(Calls::default()), "A", rules(&[("required", RuleValue::Flag(true))]));
        options.rules.insert("B".into(), rules(&[("required", RuleValue::Flag(true))]));
        assert!(Validator::new().validate_form(&mut doc, form, &options));
    }

    #[test]
    fn test_recovery_calls_success_once() {
        let mut doc = Document::parse_html(r#"<form><input name="N"></form>"#);
        let form = doc.select("form").unwrap()[0];
        let input = doc.select("input").unwrap()[0];
        let calls = Arc::new(Calls::default());
        let options = options(calls.clone(), "N", rules(&[("required", RuleValue::Flag(true))]));
        let mut engine = Validator::new();

        assert!(!engine.validate_element(&mut doc, form, input, &options));
        assert!(doc.element(input).unwrap().has_class("input-validation-error"));

        doc.set_value(input, "ok");
        assert!(engine.validate_element(&mut doc, form, input, &options));
        assert!(engine.validate_element(&mut doc, form, input, &options));

        assert!(!doc.element(input).unwrap().has_class("input-validation-error"));
        assert_eq!(*calls.0.lock().unwrap(), vec!["placement", "success"]);
        assert!(engine.errors(form).is_empty());
    }
}
