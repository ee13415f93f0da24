//! RHTMX Unobtrusive WASM
//!
//! WebAssembly bindings for the unobtrusive adapters.
//! Reads `data-val-*` rules out of rendered markup and validates submitted
//! values against them with the reference engine.

use indexmap::IndexMap;
use rhtmx_unobtrusive::rules::field_control;
use rhtmx_unobtrusive::{document_forms, Document, FormReport, NodeId, Unobtrusive};
use rhtmx_unobtrusive_engine::Validator;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Set panic hook for better error messages in the browser
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Validation error returned to JavaScript
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

fn parse_page(html: &str) -> (Document, Unobtrusive<Validator>, Vec<NodeId>) {
    let doc = Document::parse_html(html);
    let mut page = Unobtrusive::new(Validator::new());
    page.parse_document(&doc);
    let forms = document_forms(&doc);
    (doc, page, forms)
}

/// Parse `html` and report the rules of every form that has state
pub fn extract_rules(html: &str) -> Vec<FormReport> {
    let (doc, page, _forms) = parse_page(html);
    page.report(&doc)
}

/// Fill `values` (field name → value) into every form of `html`, validate
/// each form and collect the failures
pub fn validate_html(html: &str, values: &IndexMap<String, String>) -> Vec<ValidationError> {
    let (mut doc, mut page, forms) = parse_page(html);

    for form in &forms {
        for (field, value) in values {
            if let Some(control) = field_control(&doc, *form, field) {
                doc.set_value(control, value);
            }
        }
    }

    let mut errors = Vec::new();
    for form in forms {
        if page.validate(&mut doc, form) {
            continue;
        }
        errors.extend(page.engine().errors(form).into_iter().map(|error| ValidationError {
            field: error.field,
            message: error.message,
        }));
    }
    errors
}

// Plain objects instead of JS `Map`s for the ordered maps
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

/// Extract the rules declared by `data-val-*` attributes
///
/// # Example (JavaScript)
/// ```javascript
/// const forms = extractRules(document.body.innerHTML);
/// // [{ index: 0, id: "signup", rules: { Email: { required: true, __dummy__: true } }, messages: {...} }]
/// ```
#[wasm_bindgen(js_name = extractRules)]
pub fn extract_rules_js(html: &str) -> Result<JsValue, JsValue> {
    to_js(&extract_rules(html))
}

/// Validate field values against the rules declared in `html`
///
/// # Returns
/// Array of `{ field, message }` (empty if valid)
///
/// # Example (JavaScript)
/// ```javascript
/// const errors = validateHtml(formHtml, { Email: 'user@example.com', Age: '17' });
/// ```
#[wasm_bindgen(js_name = validateHtml)]
pub fn validate_html_js(html: &str, values: JsValue) -> Result<JsValue, JsValue> {
    let values: IndexMap<String, String> = serde_wasm_bindgen::from_value(values)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse values: {}", e)))?;

    to_js(&validate_html(html, &values))
}
