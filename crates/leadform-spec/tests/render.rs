use leadform_spec::{FieldValue, FormBuilderSession, build_preview, render_json, render_text};

mod support;

fn filled_session() -> FormBuilderSession {
    let mut session =
        FormBuilderSession::from_definition(None, support::fixture()).expect("session");
    session.enter_preview();
    session.set_value("budget", "yes".into()).expect("budget");
    session
        .set_value("amount", FieldValue::Number(3.0))
        .expect("amount");
    session.set_value("notes", "hi".into()).expect("notes");
    session
        .set_value("contact-email", "a@b.c".into())
        .expect("email");
    session
}

#[test]
fn text_preview_lists_values_and_errors() {
    let session = filled_session();
    let text = render_text(&build_preview(&session));
    insta::assert_snapshot!(text, @r"
    Form: Kitchen remodel enquiry
    Status: incomplete (5/5 visible)
    - [Text Block] Tell us about your project
    - [Radio Buttons] Do you have a budget?*: yes
    - [Number] Budget amount: 3
        ! Minimum value is 5
    - [Long Answer] Anything else?: hi
        ! Minimum length is 10 characters
    - [Client Details] Your details*: (empty)
        email: a@b.c
        name: (empty)
        Preferred time: (empty)
        ! This field is required
    ");
}

#[test]
fn hidden_rows_are_left_out_of_the_text() {
    let mut session = filled_session();
    session.set_value("budget", "no".into()).expect("budget");
    let payload = build_preview(&session);
    assert_eq!((payload.visible, payload.total), (4, 5));
    let text = render_text(&payload);
    assert!(!text.contains("Budget amount"));
}

#[test]
fn json_preview_carries_progress_and_rows() {
    let mut session = filled_session();
    session
        .set_value("amount", FieldValue::Number(50.0))
        .expect("amount");
    session
        .set_value("notes", "call me after lunch".into())
        .expect("notes");
    session.set_value("contact-name", "Jo".into()).expect("name");
    session
        .set_value("contact-custom-0", "Mornings".into())
        .expect("custom");

    let json = render_json(&build_preview(&session));
    assert_eq!(json["status"], "complete");
    assert_eq!(json["progress"]["visible"], 5);
    assert_eq!(json["elements"][2]["type"], "Number");
    assert_eq!(json["elements"][2]["value"], 50.0);
    assert_eq!(json["elements"][4]["sub_fields"][2]["label"], "Preferred time");
    assert!(json["elements"][2].get("error").is_none());
}
