// tests/sanitize_tests.rs

use content_guard::utils::sanitize::{SecretFields, sanitize_fields, sanitize_str};
use serde_json::{Map, Value, json};

fn fields(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("object")
}

#[test]
fn plain_fields_are_stripped_normalized_and_trimmed() {
    let out = sanitize_fields(fields(json!({"name": "  a\0b\r\nc  "})), &SecretFields::default());
    assert_eq!(Value::Object(out), json!({"name": "ab\nc"}));
}

#[test]
fn password_fields_are_not_trimmed() {
    let out = sanitize_fields(
        fields(json!({"password": "  a\0b\r\nc  ", "password_confirmation": " x\r"})),
        &SecretFields::default(),
    );
    assert_eq!(
        Value::Object(out),
        json!({"password": "  ab\nc  ", "password_confirmation": " x\n"})
    );
}

#[test]
fn lone_carriage_returns_become_newlines() {
    assert_eq!(sanitize_str("a\rb\r\rc", false), "a\nb\n\nc");
    assert_eq!(sanitize_str("a\r\0\nb", false), "a\nb");
}

#[test]
fn invisible_marks_are_trimmed() {
    assert_eq!(sanitize_str("\u{FEFF}\u{200B} hi \u{200E}", false), "hi");
}

#[test]
fn nested_structures_keep_their_shape() {
    let out = sanitize_fields(
        fields(json!({
            "profile": {"bio": " x\r", "password": " keep "},
            "tags": [" a ", " b", 3],
            "count": 3,
            "active": true,
            "password": [" p "],
            "nothing": null
        })),
        &SecretFields::default(),
    );

    assert_eq!(
        Value::Object(out),
        json!({
            "profile": {"bio": "x", "password": " keep "},
            "tags": ["a", "b", 3],
            "count": 3,
            "active": true,
            "password": [" p "],
            "nothing": null
        })
    );
}

#[test]
fn secrecy_is_declared_per_field_name() {
    let secrets = SecretFields::new(["api_token"]);
    assert!(secrets.is_secret("api_token"));
    assert!(!secrets.is_secret("password"));

    let extended = SecretFields::default().with_declared(["pin"]);
    assert!(extended.is_secret("pin"));
    assert!(extended.is_secret("password"));

    let out = sanitize_fields(fields(json!({"pin": " 1234 ", "name": " n "})), &extended);
    assert_eq!(Value::Object(out), json!({"pin": " 1234 ", "name": "n"}));
}

#[test]
fn sanitizing_twice_changes_nothing() {
    let samples = [
        "",
        "   ",
        "  a\0b\r\nc  ",
        "\r\n\r\n",
        "\r\0\n",
        " \0 x \0 ",
        "\u{FEFF}text\u{200B}",
        "line one\rline two\r\n",
        "already clean",
        "\r\r\n",
        "\r\n\r",
        "\0\0\0",
        " \t\n ",
        "\r\u{FEFF}\r",
        "\u{200E}\r\n\u{200B}",
        "\0\r\0\n\0",
    ];

    for secret in [false, true] {
        for sample in samples {
            let once = sanitize_str(sample, secret);
            assert_eq!(sanitize_str(&once, secret), once, "sample {:?}", sample);
        }
    }

    let secrets = SecretFields::default();
    let input = fields(json!({"a": " x\r\n", "password": " y\0 ", "list": [" z "]}));
    let once = sanitize_fields(input, &secrets);
    let twice = sanitize_fields(once.clone(), &secrets);
    assert_eq!(once, twice);
}

#[test]
fn sanitizing_is_idempotent_for_every_short_mix() {
    // Every string up to four characters over the characters the pipeline touches.
    let alphabet = ['a', ' ', '\t', '\r', '\n', '\0', '\u{FEFF}', '\u{200B}'];
    let mut inputs = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..4 {
        frontier = frontier
            .iter()
            .flat_map(|s| alphabet.iter().map(move |c| format!("{}{}", s, c)))
            .collect();
        inputs.extend(frontier.iter().cloned());
    }
    assert_eq!(inputs.len(), 1 + 8 + 64 + 512 + 4096);

    for secret in [false, true] {
        for input in &inputs {
            let once = sanitize_str(input, secret);
            assert!(!once.contains('\0'), "NUL left in {:?}", input);
            assert!(!once.contains('\r'), "CR left in {:?}", input);
            assert_eq!(sanitize_str(&once, secret), once, "input {:?}", input);
        }
    }
}
