// File: src/builtin.rs
// Purpose: The adapters every registry starts with

use crate::adapter::{AdaptationContext, AdapterRegistry};
use crate::naming::{model_prefix, resolve_field_reference, append_model_prefix, split_and_trim};
use crate::rules::{field_control, FieldRef, RemoteRequest, RuleValue};
use tracing::trace;

/// HTTP method used by `remote` when `data-val-remote-type` is absent
pub const DEFAULT_REMOTE_METHOD: &str = "GET";

/// Register the stock adapters, in the order the engine sees their rules
pub fn register_defaults(registry: &mut AdapterRegistry) {
    registry
        .add_single_val("accept", Some("exts"), None)
        .add_single_val("regex", Some("pattern"), None);

    for name in ["creditcard", "date", "digits", "email", "number", "url"] {
        registry.add_bool(name, None);
    }

    registry
        .add_min_max("length", "minlength", "maxlength", "rangelength", None, None)
        .add_min_max("range", "min", "max", "range", None, None)
        .add("equalto", &["other"], adapt_equal_to)
        .add("required", &[], adapt_required)
        .add("remote", &["url", "type", "additionalfields"], adapt_remote)
        .add("password", &["min", "nonalphamin", "regex"], adapt_password);
}

/// `equalTo` against a sibling field, resolving `*.` references
fn adapt_equal_to(ctx: &mut AdaptationContext<'_>) {
    let other = ctx.param("other").unwrap_or_default();
    let name = resolve_field_reference(other, ctx.field_name());
    let element = field_control(ctx.doc, ctx.form, &name);
    trace!(field = %ctx.field_name(), other = %name, found = element.is_some(), "equalto");

    ctx.set_validation_values("equalTo", RuleValue::EqualTo(FieldRef { name, element }));
}

/// Never applied to `<input type=checkbox>`
fn adapt_required(ctx: &mut AdaptationContext<'_>) {
    if ctx.element().is_some_and(|element| element.is_checkbox()) {
        return;
    }
    ctx.set_validation_values("required", RuleValue::Flag(true));
}

fn adapt_remote(ctx: &mut AdaptationContext<'_>) {
    let field_name = ctx.field_name().to_string();
    let prefix = model_prefix(&field_name);
    let additional = ctx
        .non_empty_param("additionalfields")
        .unwrap_or(field_name.as_str());

    let request = RemoteRequest {
        url: ctx.param("url").map(str::to_string),
        method: ctx
            .non_empty_param("type")
            .unwrap_or(DEFAULT_REMOTE_METHOD)
            .to_string(),
        fields: split_and_trim(additional)
            .iter()
            .map(|field| append_model_prefix(field, prefix))
            .collect(),
    };
    ctx.set_validation_values("remote", RuleValue::Remote(request));
}

/// Each facet is added on its own, only when its parameter is non-empty
fn adapt_password(ctx: &mut AdaptationContext<'_>) {
    let facets = [("min", "minlength"), ("nonalphamin", "nonalphamin"), ("regex", "regex")];
    for (param, rule) in facets {
        if let Some(value) = ctx.non_empty_param(param).map(str::to_string) {
            ctx.set_validation_values(rule, RuleValue::Value(value));
        }
    }
}
