// File: src/adapter.rs
// Purpose: Adapter registry mapping data-val-* attribute families to engine rules

use crate::dom::{Document, Element, NodeId};
use crate::rules::{MessageSet, RuleSet, RuleValue};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Transform run when an element carries the adapter's attribute
pub type AdaptFn = Arc<dyn Fn(&mut AdaptationContext<'_>) + Send + Sync>;

/// Everything an adapter sees while translating one element
pub struct AdaptationContext<'a> {
    pub doc: &'a Document,
    pub element: NodeId,
    pub form: NodeId,
    /// Value of `data-val-<adapter>`; may be empty
    pub message: &'a str,
    /// `data-val-<adapter>-<param>` values, `None` when the attribute is absent
    pub params: &'a IndexMap<String, Option<String>>,
    pub rules: &'a mut RuleSet,
    pub messages: &'a mut MessageSet,
}

impl AdaptationContext<'_> {
    pub fn element(&self) -> Option<&Element> {
        self.doc.element(self.element)
    }

    /// The element's field name
    pub fn field_name(&self) -> &str {
        self.element().map(Element::name).unwrap_or_default()
    }

    /// Raw parameter value, empty strings included
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(|value| value.as_deref())
    }

    /// Parameter value when present and non-empty
    pub fn non_empty_param(&self, name: &str) -> Option<&str> {
        self.param(name).filter(|value| !value.is_empty())
    }

    /// Write `rule`, and its message when the attribute carried one
    pub fn set_validation_values(&mut self, rule: &str, value: RuleValue) {
        self.rules.insert(rule.to_string(), value);
        if !self.message.is_empty() {
            self.messages.insert(rule.to_string(), self.message.to_string());
        }
    }
}

/// One attribute family: `data-val-<name>` plus `data-val-<name>-<param>`
#[derive(Clone)]
pub struct Adapter {
    name: String,
    params: Vec<String>,
    adapt: AdaptFn,
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapter")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Adapter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// `data-val-<name>`
    pub fn attribute(&self) -> String {
        format!("data-val-{}", self.name)
    }

    /// `data-val-<name>-<param>`
    pub fn param_attribute(&self, param: &str) -> String {
        format!("data-val-{}-{}", self.name, param)
    }

    pub fn adapt(&self, context: &mut AdaptationContext<'_>) {
        (self.adapt)(context)
    }
}

/// Ordered adapter list. Names are not unique: every adapter whose attribute
/// is present runs, in registration order.
#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
    adapters: Vec<Adapter>,
}

impl AdapterRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in adapters
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::builtin::register_defaults(&mut registry);
        registry
    }

    pub fn iter(&self) -> impl Iterator<Item = &Adapter> {
        self.adapters.iter()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Register an adapter with named parameters
    pub fn add<F>(&mut self, name: &str, params: &[&str], adapt: F) -> &mut Self
    where
        F: Fn(&mut AdaptationContext<'_>) + Send + Sync + 'static,
    {
        self.adapters.push(Adapter {
            name: name.to_ascii_lowercase(),
            params: params.iter().map(|p| p.to_ascii_lowercase()).collect(),
            adapt: Arc::new(adapt),
        });
        self
    }

    /// Rule without parameters, set to `true`. `rule` defaults to `name`.
    pub fn add_bool(&mut self, name: &str, rule: Option<&str>) -> &mut Self {
        let rule = rule.unwrap_or(name).to_string();
        self.add(name, &[], move |ctx| {
            ctx.set_validation_values(&rule, RuleValue::Flag(true));
        })
    }

    /// Three rules chosen by which of the min/max parameters are non-empty:
    /// both → `range_rule`, min only → `min_rule`, max only → `max_rule`.
    pub fn add_min_max(
        &mut self,
        name: &str,
        min_rule: &str,
        max_rule: &str,
        range_rule: &str,
        min_attr: Option<&str>,
        max_attr: Option<&str>,
    ) -> &mut Self {
        let min_attr = min_attr.unwrap_or("min").to_ascii_lowercase();
        let max_attr = max_attr.unwrap_or("max").to_ascii_lowercase();
        let (min_rule, max_rule, range_rule) =
            (min_rule.to_string(), max_rule.to_string(), range_rule.to_string());
        let params = [min_attr.clone(), max_attr.clone()];
        let params: Vec<&str> = params.iter().map(String::as_str).collect();

        self.add(name, &params, move |ctx| {
            let min = ctx.non_empty_param(&min_attr).map(str::to_string);
            let max = ctx.non_empty_param(&max_attr).map(str::to_string);
            match (min, max) {
                (Some(min), Some(max)) => {
                    ctx.set_validation_values(&range_rule, RuleValue::Range(min, max))
                }
                (Some(min), None) => ctx.set_validation_values(&min_rule, RuleValue::Value(min)),
                (None, Some(max)) => ctx.set_validation_values(&max_rule, RuleValue::Value(max)),
                (None, None) => {}
            }
        })
    }

    /// Copy one parameter (default `val`) into one rule (default `name`)
    pub fn add_single_val(&mut self, name: &str, attr: Option<&str>, rule: Option<&str>) -> &mut Self {
        let attr = attr.unwrap_or("val").to_ascii_lowercase();
        let rule = rule.unwrap_or(name).to_string();
        let params = [attr.as_str()];
        let param = attr.clone();

        self.add(name, &params, move |ctx| {
            let value = match ctx.param(&param) {
                Some(value) => RuleValue::value(value),
                None => RuleValue::Missing,
            };
            ctx.set_validation_values(&rule, value);
        })
    }
}
