// File: src/controller.rs
// Purpose: Page-scoped controller: parses elements, owns per-form state, routes events

use crate::adapter::{AdaptationContext, AdapterRegistry};
use crate::config::UnobtrusiveConfig;
use crate::dom::{Document, NodeId, Selector};
use crate::engine::{LifecycleHooks, ValidationEngine};
use crate::error::Result;
use crate::form::{FormValidation, ValidationOptions};
use crate::hooks::UnobtrusiveHooks;
use crate::methods::register_methods;
use crate::rules::{MessageSet, RuleSet, RuleValue, DUMMY_RULE};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Marker attribute selecting the inputs to parse
pub const TRIGGER_SELECTOR: &str = ":input[data-val=true]";

/// DOM events the controller reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Submit(NodeId),
    Reset(NodeId),
    Input(NodeId),
    Blur(NodeId),
}

/// Ties adapters, per-form state and the engine together for one document
pub struct Unobtrusive<E: ValidationEngine> {
    adapters: AdapterRegistry,
    forms: HashMap<NodeId, FormValidation>,
    hooks: Arc<UnobtrusiveHooks>,
    config: UnobtrusiveConfig,
    engine: E,
}

impl<E: ValidationEngine> Unobtrusive<E> {
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, UnobtrusiveConfig::default())
    }

    /// Build a controller; the layer's custom methods are registered with the engine here
    pub fn with_config(mut engine: E, config: UnobtrusiveConfig) -> Self {
        register_methods(&mut engine);
        Self {
            adapters: AdapterRegistry::with_defaults(),
            forms: HashMap::new(),
            hooks: Arc::new(UnobtrusiveHooks::new(config.classes.clone())),
            config,
            engine,
        }
    }

    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    /// Register extra adapters before parsing
    pub fn adapters_mut(&mut self) -> &mut AdapterRegistry {
        &mut self.adapters
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn config(&self) -> &UnobtrusiveConfig {
        &self.config
    }

    pub fn form(&self, form: NodeId) -> Option<&FormValidation> {
        self.forms.get(&form)
    }

    /// Forms with cached state, in no particular order
    pub fn forms(&self) -> impl Iterator<Item = &FormValidation> {
        self.forms.values()
    }

    /// Get or lazily create the state for `form`
    fn validation_info(&mut self, form: NodeId) -> &mut FormValidation {
        let config = &self.config;
        let hooks = &self.hooks;
        self.forms.entry(form).or_insert_with(|| {
            let hooks: Arc<dyn LifecycleHooks> = hooks.clone();
            FormValidation::new(
                form,
                ValidationOptions::new(&config.classes.input_error, &config.engine.error_element, hooks),
            )
        })
    }

    /// Parse one element's `data-val-*` attributes into its form's rules.
    ///
    /// Elements outside any form are skipped. With `skip_attach` the form is
    /// left for the caller to attach, which batch parsing does once per form.
    pub fn parse_element(&mut self, doc: &Document, element: NodeId, skip_attach: bool) {
        let Some(form) = doc.closest_form(element) else {
            debug!(element = element.index(), "no owning form, skipping");
            return;
        };
        let Some(attrs) = doc.element(element) else {
            return;
        };

        let field = attrs.name().to_string();
        let mut rules = RuleSet::new();
        let mut messages = MessageSet::new();

        for adapter in self.adapters.iter() {
            // an empty message still triggers the adapter
            let Some(message) = attrs.attr(&adapter.attribute()) else {
                continue;
            };
            let params: IndexMap<String, Option<String>> = adapter
                .params()
                .iter()
                .map(|param| {
                    let value = attrs.attr(&adapter.param_attribute(param));
                    (param.clone(), value.map(str::to_string))
                })
                .collect();

            trace!(field = %field, adapter = adapter.name(), "adapting");
            adapter.adapt(&mut AdaptationContext {
                doc,
                element,
                form,
                message,
                params: &params,
                rules: &mut rules,
                messages: &mut messages,
            });
        }

        rules.insert(DUMMY_RULE.to_string(), RuleValue::Flag(true));
        debug!(field = %field, rules = rules.len(), "parsed element");

        self.validation_info(form).set_field(field, rules, messages);
        if !skip_attach {
            self.attach(doc, form);
        }
    }

    /// Parse everything under the elements matched by `selector`
    pub fn parse(&mut self, doc: &Document, selector: &str) -> Result<()> {
        let roots = doc.select(selector)?;
        self.parse_within(doc, &roots);
        Ok(())
    }

    /// Parse the whole document (the page-load entry point)
    pub fn parse_document(&mut self, doc: &Document) {
        self.parse_within(doc, &[doc.root()]);
    }

    /// Batch parse: every `:input[data-val=true]` below `roots`, then one
    /// attach per form related to the roots (ancestors, the roots
    /// themselves, descendants).
    pub fn parse_within(&mut self, doc: &Document, roots: &[NodeId]) {
        let form_selector = Selector::parse("form").ok();
        let trigger = Selector::parse(TRIGGER_SELECTOR).ok();
        let is_form = |id: NodeId| form_selector.as_ref().is_some_and(|s| doc.matches(id, s));

        let mut forms: Vec<NodeId> = Vec::new();
        for root in roots {
            let related = doc
                .ancestors(*root)
                .chain(std::iter::once(*root))
                .chain(doc.descendants(*root));
            for candidate in related {
                if is_form(candidate) && !forms.contains(&candidate) {
                    forms.push(candidate);
                }
            }
        }

        if let Some(trigger) = &trigger {
            for root in roots {
                for element in doc.find_with(*root, trigger) {
                    self.parse_element(doc, element, true);
                }
            }
        }

        for form in forms {
            self.attach(doc, form);
        }
    }

    /// Bind a form to the engine (creating its state if needed)
    pub fn attach(&mut self, doc: &Document, form: NodeId) {
        self.validation_info(form);
        let Self { forms, engine, .. } = self;
        if let Some(info) = forms.get_mut(&form) {
            info.attach(engine, doc);
        }
    }

    /// Run full-form validation; the value is the form's validity
    pub fn validate(&mut self, doc: &mut Document, form: NodeId) -> bool {
        self.validation_info(form);
        let Self { forms, engine, .. } = self;
        match forms.get_mut(&form) {
            Some(info) => info.validate(engine, doc),
            None => true,
        }
    }

    /// Reset handler: clear engine state, then restore container styling
    pub fn reset(&mut self, doc: &mut Document, form: NodeId) {
        self.engine.reset_form(doc, form);
        self.hooks.reset(doc, form);
        debug!(form = form.index(), "form reset");
    }

    /// Route a DOM event. Returns the validity the event produced; events
    /// that do not validate report `true`.
    pub fn dispatch(&mut self, doc: &mut Document, event: Event) -> bool {
        match event {
            Event::Submit(form) => self.validate(doc, form),
            Event::Reset(form) => {
                if self.forms.get(&form).is_some_and(FormValidation::is_attached) {
                    self.reset(doc, form);
                }
                true
            }
            Event::Input(element) | Event::Blur(element) => {
                let Some(form) = doc.closest_form(element) else {
                    return true;
                };
                let Self { forms, engine, .. } = self;
                match forms.get(&form).filter(|info| info.is_attached()) {
                    Some(info) => engine.validate_element(doc, form, element, info.options()),
                    None => true,
                }
            }
        }
    }

    /// Drop state for forms that have left the document; returns how many
    pub fn prune(&mut self, doc: &Document) -> usize {
        let gone: Vec<NodeId> = self
            .forms
            .keys()
            .copied()
            .filter(|form| !doc.is_attached(*form))
            .collect();
        for form in &gone {
            self.forms.remove(form);
            self.engine.forget(*form);
        }
        if !gone.is_empty() {
            debug!(count = gone.len(), "pruned detached forms");
        }
        gone.len()
    }
}
