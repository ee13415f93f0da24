//! Integration tests for parsing and the per-form lifecycle
//!
//! Uses a recording engine double so the tests observe exactly what the
//! controller hands to the engine.

use pretty_assertions::assert_eq;
use rhtmx_unobtrusive::*;
use rstest::rstest;

#[derive(Default)]
struct RecordingEngine {
    methods: Vec<String>,
    attaches: Vec<NodeId>,
    validated: Vec<NodeId>,
    resets: Vec<NodeId>,
    forgotten: Vec<NodeId>,
}

impl ValidationEngine for RecordingEngine {
    fn add_method(&mut self, name: &str, _method: RuleMethod) {
        self.methods.push(name.to_string());
    }

    fn attach(&mut self, _doc: &Document, form: NodeId, _options: &ValidationOptions) {
        self.attaches.push(form);
    }

    fn validate_form(&mut self, _doc: &mut Document, form: NodeId, _options: &ValidationOptions) -> bool {
        self.validated.push(form);
        true
    }

    fn validate_element(
        &mut self,
        _doc: &mut Document,
        _form: NodeId,
        element: NodeId,
        _options: &ValidationOptions,
    ) -> bool {
        self.validated.push(element);
        false
    }

    fn reset_form(&mut self, _doc: &mut Document, form: NodeId) {
        self.resets.push(form);
    }

    fn forget(&mut self, form: NodeId) {
        self.forgotten.push(form);
    }
}

fn parsed(markup: &str) -> (Document, Unobtrusive<RecordingEngine>, NodeId) {
    let doc = Document::parse_html(markup);
    let mut page = Unobtrusive::new(RecordingEngine::default());
    page.parse_document(&doc);
    let form = doc.select("form").unwrap()[0];
    (doc, page, form)
}

fn rules<'a>(page: &'a Unobtrusive<RecordingEngine>, form: NodeId, field: &str) -> &'a RuleSet {
    page.form(form)
        .and_then(|info| info.options().rules_for(field))
        .expect("field was parsed")
}

#[test]
fn test_registers_custom_methods() {
    let page = Unobtrusive::new(RecordingEngine::default());
    assert_eq!(page.engine().methods, vec!["__dummy__", "regex", "nonalphamin"]);
}

#[rstest]
#[case(r#"<input type="text" name="F" data-val="true" data-val-required="r">"#, true)]
#[case(r#"<select name="F" data-val="true" data-val-required="r"><option>a</option></select>"#, true)]
#[case(r#"<textarea name="F" data-val="true" data-val-required="r"></textarea>"#, true)]
#[case(r#"<input type="checkbox" name="F" data-val="true" data-val-required="r">"#, false)]
#[case(r#"<INPUT TYPE="CHECKBOX" name="F" data-val="true" data-val-required="r">"#, false)]
fn test_required_skips_checkboxes(#[case] control: &str, #[case] expected: bool) {
    let (_doc, page, form) = parsed(&format!("<form>{}</form>", control));
    assert_eq!(rules(&page, form, "F").contains_key("required"), expected);
}

#[test]
fn test_length_min_only_and_range() {
    let (_doc, page, form) = parsed(
        r#"<form>
            <input name="A" data-val="true" data-val-length="too short" data-val-length-min="3">
            <input name="B" data-val="true" data-val-length="bad" data-val-length-min="3" data-val-length-max="9">
        </form>"#,
    );

    let a = rules(&page, form, "A");
    assert_eq!(a.get("minlength"), Some(&RuleValue::value("3")));
    assert!(!a.contains_key("rangelength"));

    let b = rules(&page, form, "B");
    assert_eq!(b.get("rangelength"), Some(&RuleValue::Range("3".into(), "9".into())));
    assert!(!b.contains_key("minlength"));
    assert!(!b.contains_key("maxlength"));
}

#[test]
fn test_equalto_resolves_model_prefix() {
    let (doc, page, form) = parsed(
        r#"<form>
            <input name="Items[0].Other">
            <input name="Items[0].Value" data-val="true" data-val-equalto="must match" data-val-equalto-other="*.Other">
        </form>"#,
    );
    let other = doc.select("[name='Items[0].Other']").unwrap()[0];

    match rules(&page, form, "Items[0].Value").get("equalTo") {
        Some(RuleValue::EqualTo(field)) => {
            assert_eq!(field.name, "Items[0].Other");
            assert_eq!(field.element, Some(other));
        }
        other => panic!("unexpected equalTo rule: {:?}", other),
    }
}

#[test]
fn test_dummy_rule_without_adapters() {
    let (_doc, page, form) = parsed(r#"<form><input name="Plain" data-val="true"></form>"#);
    let plain = rules(&page, form, "Plain");

    assert_eq!(plain.len(), 1);
    assert_eq!(plain.get("__dummy__"), Some(&RuleValue::Flag(true)));
}

#[test]
fn test_password_scenario() {
    let (_doc, page, form) = parsed(
        r#"<form><input name="Password" data-val="true" data-val-password="msg"
            data-val-password-min="8" data-val-password-nonalphamin="1"></form>"#,
    );
    let info = page.form(form).unwrap();
    let password = rules(&page, form, "Password");

    assert_eq!(password.get("minlength"), Some(&RuleValue::value("8")));
    assert_eq!(password.get("nonalphamin"), Some(&RuleValue::value("1")));
    assert!(!password.contains_key("regex"));
    assert_eq!(info.options().message_for("Password", "minlength"), Some("msg"));
    assert_eq!(info.options().message_for("Password", "nonalphamin"), Some("msg"));
}

#[test]
fn test_empty_message_is_a_trigger() {
    let (_doc, page, form) = parsed(r#"<form><input name="E" data-val="true" data-val-email=""></form>"#);
    assert_eq!(rules(&page, form, "E").get("email"), Some(&RuleValue::Flag(true)));
    assert_eq!(page.form(form).unwrap().options().message_for("E", "email"), None);
}

#[test]
fn test_remote_descriptor() {
    let (_doc, page, form) = parsed(
        r#"<form>
            <input name="User.Email" data-val="true" data-val-remote="taken"
                data-val-remote-url="/validate/email" data-val-remote-additionalfields="*.Email, *.Name">
            <input name="Login" data-val="true" data-val-remote="" data-val-remote-type="POST">
        </form>"#,
    );

    match rules(&page, form, "User.Email").get("remote") {
        Some(RuleValue::Remote(request)) => {
            assert_eq!(request.url.as_deref(), Some("/validate/email"));
            assert_eq!(request.method, "GET");
            assert_eq!(request.fields, vec!["User.Email", "User.Name"]);
        }
        other => panic!("unexpected remote rule: {:?}", other),
    }
    match rules(&page, form, "Login").get("remote") {
        Some(RuleValue::Remote(request)) => {
            assert_eq!(request.url, None);
            assert_eq!(request.method, "POST");
            assert_eq!(request.fields, vec!["Login"]);
        }
        other => panic!("unexpected remote rule: {:?}", other),
    }
}

#[test]
fn test_element_without_form_is_skipped() {
    let doc = Document::parse_html(r#"<input name="Loose" data-val="true" data-val-required="r">"#);
    let mut page = Unobtrusive::new(RecordingEngine::default());
    let input = doc.select("input").unwrap()[0];

    page.parse_element(&doc, input, false);

    assert_eq!(page.forms().count(), 0);
    assert!(page.engine().attaches.is_empty());
}

#[test]
fn test_parse_attaches_each_form_once() {
    let doc = Document::parse_html(
        r#"<div id="root">
            <form id="a"><input name="x" data-val="true" data-val-required="r"><input name="y" data-val="true"></form>
            <form id="b"></form>
        </div>"#,
    );
    let mut page = Unobtrusive::new(RecordingEngine::default());
    page.parse(&doc, "#root").unwrap();

    let a = doc.select("#a").unwrap()[0];
    let b = doc.select("#b").unwrap()[0];
    assert_eq!(page.engine().attaches, vec![a, b]);
    assert!(page.form(b).unwrap().is_attached());
    assert!(page.form(b).unwrap().options().rules.is_empty());
}

#[test]
fn test_parse_from_inside_form_attaches_ancestor() {
    let doc = Document::parse_html(
        r#"<form id="f"><div id="group"><input name="x" data-val="true" data-val-digits="d"></div></form>"#,
    );
    let mut page = Unobtrusive::new(RecordingEngine::default());
    page.parse(&doc, "#group").unwrap();

    let form = doc.select("#f").unwrap()[0];
    assert_eq!(page.engine().attaches, vec![form]);
    assert!(rules(&page, form, "x").contains_key("digits"));
}

#[test]
fn test_parse_rejects_bad_selector() {
    let doc = Document::parse_html("<form></form>");
    let mut page = Unobtrusive::new(RecordingEngine::default());
    assert!(matches!(
        page.parse(&doc, "form > input"),
        Err(UnobtrusiveError::InvalidSelector { .. })
    ));
}

#[test]
fn test_reparse_replaces_field_rules() {
    let mut doc = Document::parse_html(
        r#"<form><input name="F" data-val="true" data-val-required="r" data-val-email="e"></form>"#,
    );
    let mut page = Unobtrusive::new(RecordingEngine::default());
    page.parse_document(&doc);

    let input = doc.select("input").unwrap()[0];
    doc.element_mut(input).unwrap().remove_attr("data-val-email");
    page.parse_element(&doc, input, false);

    let form = doc.select("form").unwrap()[0];
    let field = rules(&page, form, "F");
    assert!(field.contains_key("required"));
    assert!(!field.contains_key("email"));
}

#[test]
fn test_custom_adapter_runs_after_defaults() {
    let doc = Document::parse_html(
        r#"<form><input name="Code" data-val="true" data-val-required="r" data-val-upper="u"></form>"#,
    );
    let mut page = Unobtrusive::new(RecordingEngine::default());
    page.adapters_mut()
        .add_bool("upper", Some("uppercase"))
        .add("required", &[], |ctx| ctx.set_validation_values("required", RuleValue::Flag(false)));
    page.parse_document(&doc);

    let form = doc.select("form").unwrap()[0];
    let field = rules(&page, form, "Code");
    assert_eq!(field.get("uppercase"), Some(&RuleValue::Flag(true)));
    assert_eq!(field.get("required"), Some(&RuleValue::Flag(false)));
}

#[test]
fn test_dispatch_routes_events() {
    let (mut doc, mut page, form) = parsed(r#"<form><input name="F" data-val="true"></form>"#);
    let input = doc.select("input").unwrap()[0];

    assert!(page.dispatch(&mut doc, Event::Submit(form)));
    assert!(!page.dispatch(&mut doc, Event::Blur(input)));
    assert!(page.dispatch(&mut doc, Event::Reset(form)));

    assert_eq!(page.engine().validated, vec![form, input]);
    assert_eq!(page.engine().resets, vec![form]);
}

#[test]
fn test_reset_ignored_for_unattached_form() {
    let mut doc = Document::parse_html("<form></form>");
    let form = doc.select("form").unwrap()[0];
    let mut page = Unobtrusive::new(RecordingEngine::default());

    page.dispatch(&mut doc, Event::Reset(form));
    assert!(page.engine().resets.is_empty());
}

#[test]
fn test_prune_forgets_detached_forms() {
    let (mut doc, mut page, form) = parsed(r#"<form><input name="F" data-val="true"></form>"#);
    assert_eq!(page.prune(&doc), 0);

    doc.detach(form);
    assert_eq!(page.prune(&doc), 1);
    assert!(page.form(form).is_none());
    assert_eq!(page.engine().forgotten, vec![form]);
}

#[test]
fn test_report_lists_parsed_forms_in_document_order() {
    let (doc, page, _form) = parsed(
        r#"<form id="first"><input name="A" data-val="true" data-val-required="A is required"></form>
        <div><form><input name="B" data-val="true" data-val-digits="Digits only"></form></div>"#,
    );
    let report = page.report(&doc);

    assert_eq!(report.len(), 2);
    assert_eq!(report[0].index, 0);
    assert_eq!(report[0].id.as_deref(), Some("first"));
    assert_eq!(report[0].messages["A"]["required"], "A is required");
    assert_eq!(report[1].index, 1);
    assert_eq!(report[1].id, None);
    assert_eq!(report[1].rules["B"].get("digits"), Some(&RuleValue::Flag(true)));
}
