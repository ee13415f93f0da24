// File: src/messages.rs
// Purpose: Default failure messages and {n} placeholder formatting

use rhtmx_unobtrusive::RuleValue;

/// Built-in message template for a rule, if it has one
pub fn default_template(rule: &str) -> Option<&'static str> {
    let template = match rule {
        "required" => "This field is required.",
        "remote" => "Please fix this field.",
        "email" => "Please enter a valid email address.",
        "url" => "Please enter a valid URL.",
        "date" => "Please enter a valid date.",
        "number" => "Please enter a valid number.",
        "digits" => "Please enter only digits.",
        "creditcard" => "Please enter a valid credit card number.",
        "equalTo" => "Please enter the same value again.",
        "accept" => "Please enter a value with a valid extension.",
        "maxlength" => "Please enter no more than {0} characters.",
        "minlength" => "Please enter at least {0} characters.",
        "rangelength" => "Please enter a value between {0} and {1} characters long.",
        "range" => "Please enter a value between {0} and {1}.",
        "max" => "Please enter a value less than or equal to {0}.",
        "min" => "Please enter a value greater than or equal to {0}.",
        _ => return None,
    };
    Some(template)
}

/// Substitute `{0}` and `{1}` with the rule parameter
pub fn format(template: &str, param: &RuleValue) -> String {
    match param {
        RuleValue::Value(value) => template.replace("{0}", value),
        RuleValue::Range(min, max) => template.replace("{0}", min).replace("{1}", max),
        _ => template.to_string(),
    }
}

/// Message used when neither the markup nor the defaults provide one
pub fn fallback(field: &str) -> String {
    format!("Warning: No message defined for {}", field)
}

/// Default message for a failed rule on `field`
pub fn default_message(rule: &str, field: &str, param: &RuleValue) -> String {
    match default_template(rule) {
        Some(template) => format(template, param),
        None => fallback(field),
    }
}
