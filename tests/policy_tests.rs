// tests/policy_tests.rs

use content_guard::rules::{HtmlPolicy, MessageCatalog, PolicyError, Violation, ViolationCategory};
use content_guard::utils::html::clean_html;

#[test]
fn default_policy_is_consistent() {
    let default = HtmlPolicy::default();
    let rebuilt = HtmlPolicy::new(
        default.version(),
        default.allowed_tags().clone(),
        default.allowed_attributes().clone(),
    )
    .unwrap();
    assert_eq!(rebuilt, default);
    assert!(default.is_tag_allowed("p"));
    assert!(default.is_attribute_allowed("a", "href"));
    assert!(!default.is_attribute_allowed("br", "class"));
}

#[test]
fn inconsistent_policies_are_refused() {
    let unknown_tag = HtmlPolicy::from_json(
        r#"{"version": "x", "allowed_tags": ["p"], "allowed_attributes": {"a": ["href"]}}"#,
    );
    assert!(matches!(unknown_tag, Err(PolicyError::Invalid(_))));

    let handler = HtmlPolicy::from_json(
        r#"{"version": "x", "allowed_tags": ["p"], "allowed_attributes": {"p": ["onclick"]}}"#,
    );
    assert!(matches!(handler, Err(PolicyError::Invalid(_))));

    let script = HtmlPolicy::from_json(r#"{"version": "x", "allowed_tags": ["script"]}"#);
    assert!(matches!(script, Err(PolicyError::Invalid(_))));

    let empty = HtmlPolicy::from_json(r#"{"version": "x", "allowed_tags": []}"#);
    assert!(matches!(empty, Err(PolicyError::Invalid(_))));

    assert!(matches!(
        HtmlPolicy::from_json("not json"),
        Err(PolicyError::Parse(_))
    ));
}

#[test]
fn messages_render_with_the_field_name() {
    let catalog = MessageCatalog::default();
    assert_eq!(
        catalog.render(ViolationCategory::ScriptContentDetected, "body_content"),
        "The body content contains potentially dangerous content."
    );

    let error = catalog.validation_error(&Violation::ScriptTag, "body");
    assert_eq!(error.code, "script_content_detected");
    assert_eq!(
        error.message.as_deref(),
        Some("The body contains potentially dangerous content.")
    );
    assert_eq!(
        error.params.get("reason"),
        Some(&serde_json::json!("script tags not allowed"))
    );
}

#[test]
fn message_templates_can_be_replaced() {
    let catalog = MessageCatalog::default()
        .with_template(ViolationCategory::UnsafeUrl, "Le champ :attribute contient des liens dangereux.");
    assert_eq!(
        catalog.render(ViolationCategory::UnsafeUrl, "link"),
        "Le champ link contient des liens dangereux."
    );
}

#[test]
fn cleaning_follows_the_policy() {
    let policy = HtmlPolicy::default();
    assert_eq!(
        clean_html(&policy, r#"<p onclick="x()">Hi<script>bad()</script></p>"#),
        "<p>Hi</p>"
    );
    assert_eq!(
        clean_html(&policy, r#"<a href="javascript:alert(1)">x</a>"#),
        "<a>x</a>"
    );
    assert_eq!(
        clean_html(&policy, r#"<a href="/about" rel="noopener">us</a>"#),
        r#"<a href="/about" rel="noopener">us</a>"#
    );
}
