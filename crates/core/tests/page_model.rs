//! Form extraction from wizard pages.

use pretty_assertions::assert_eq;
use slotwatch_core::form::{FieldKind, FormError, PageModel, SelectOption};

fn load_fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path, e))
}

#[test]
fn test_entry_page_form() {
    let page = PageModel::parse(&load_fixture("entry.html")).unwrap();

    assert_eq!(page.action, "/?fromSpecificInfo=True");
    assert_eq!(page.method, "post");
    assert_eq!(page.title.as_deref(), Some("Appointment Service"));

    let names: Vec<&str> = page.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Language", "__RequestVerificationToken", "Office", "Command"]);

    let kinds: Vec<FieldKind> = page.fields.iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![FieldKind::Hidden, FieldKind::Hidden, FieldKind::Selectable, FieldKind::Submit]
    );
}

#[test]
fn test_select_options_keep_case_and_order() {
    let page = PageModel::parse(&load_fixture("entry.html")).unwrap();
    let office = page.field("Office").unwrap();

    assert_eq!(
        office.options,
        vec![
            SelectOption::new("", "Please choose"),
            SelectOption::new("ABUJA", "ABUJA"),
            SelectOption::new("KAIRO", "KAIRO"),
            SelectOption::new("WIEN", "WIEN"),
        ]
    );
    // No option is marked selected, so the first one's payload value stands.
    assert_eq!(office.value, "Please choose");
}

#[test]
fn test_selected_option_is_current_value() {
    let page = PageModel::parse(&load_fixture("confirm.html")).unwrap();
    assert_eq!(page.field("PersonCount").unwrap().value, "1");

    let html = r#"<form><select name="n"><option value="a">A</option><option value="b" selected>B</option></select></form>"#;
    let page = PageModel::parse(html).unwrap();
    assert_eq!(page.field("n").unwrap().value, "b");
}

#[test]
fn test_field_lookup_by_id_or_name() {
    let html = r#"
    <form method="POST">
        <select id="CalendarId" name="Calendar"><option value="1">One</option></select>
    </form>"#;
    let page = PageModel::parse(html).unwrap();

    assert_eq!(page.method, "post");
    assert_eq!(page.field("CalendarId").unwrap().name, "Calendar");
    assert_eq!(page.field("Calendar").unwrap().id.as_deref(), Some("CalendarId"));
    assert!(page.field("Missing").is_none());
}

#[test]
fn test_nameless_fields_are_dropped() {
    let html = r#"
    <form>
        <input type="hidden" value="orphan" />
        <input type="hidden" name="" value="blank" />
        <input type="hidden" name="kept" value="yes" />
        <input type="submit" value="Next" />
    </form>"#;
    let page = PageModel::parse(html).unwrap();

    assert_eq!(page.fields.len(), 1);
    assert_eq!(page.fields[0].name, "kept");
}

#[test]
fn test_only_first_form_is_active() {
    let html = r#"
    <form action="/search"><input type="hidden" name="q" value="1" /></form>
    <form action="/book"><input type="hidden" name="token" value="2" /></form>"#;
    let page = PageModel::parse(html).unwrap();

    assert_eq!(page.action, "/search");
    assert!(page.field("token").is_none());
}

#[test]
fn test_missing_form_is_parse_error() {
    let err = PageModel::parse(&load_fixture("slots.html")).unwrap_err();
    assert_eq!(err, FormError::NoForm);

    assert_eq!(slotwatch_core::parse("").unwrap_err(), FormError::NoForm);
}

#[test]
fn test_defaults_for_missing_action_and_method() {
    let page = PageModel::parse("<form><input name=x type=text value=1></form>").unwrap();

    assert_eq!(page.action, "");
    assert_eq!(page.method, "get");
    assert_eq!(page.fields[0].kind, FieldKind::Other);
}

#[test]
fn test_button_fields() {
    let html = r#"
    <form>
        <button name="go" value="Next">Continue</button>
        <button name="label">Next</button>
        <button name="reset" type="button">Reset</button>
    </form>"#;
    let page = PageModel::parse(html).unwrap();

    assert_eq!(page.fields[0].kind, FieldKind::Submit);
    assert_eq!(page.fields[0].value, "Next");
    assert_eq!(page.fields[1].kind, FieldKind::Submit);
    assert_eq!(page.fields[1].value, "Next");
    assert_eq!(page.fields[2].kind, FieldKind::Other);
}

#[test]
fn test_submit_control_lookup() {
    let page = PageModel::parse(&load_fixture("calendar.html")).unwrap();

    assert_eq!(page.submit_control("Next").unwrap().name, "Command");
    assert_eq!(page.submit_control("Back").unwrap().value, "Back");
    assert!(page.submit_control("Finish").is_none());
    assert_eq!(page.hidden_fields().count(), 3);
}
