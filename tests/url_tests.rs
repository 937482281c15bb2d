// tests/url_tests.rs

use content_guard::rules::{Rule, UrlChecker, Violation, is_safe_url};

#[test]
fn relative_and_fragment_urls_are_safe() {
    assert!(is_safe_url("/relative/path"));
    assert!(is_safe_url("#top"));
    assert!(is_safe_url("page.html?x=1"));
    assert!(is_safe_url(""));
}

#[test]
fn http_urls_must_parse() {
    assert!(is_safe_url("https://example.com"));
    assert!(is_safe_url("HTTP://Example.com/a?b=c#d"));
    assert!(!is_safe_url("http://"));
}

#[test]
fn mailto_requires_an_email_address() {
    assert!(is_safe_url("mailto:a@b.com"));
    assert!(is_safe_url("MAILTO:team@example.org"));
    assert!(!is_safe_url("mailto:not-an-email"));
    assert!(!is_safe_url("mailto:"));
}

#[test]
fn other_schemes_are_unsafe() {
    for url in [
        "javascript:alert(1)",
        "vbscript:msgbox(1)",
        "data:text/html,<b>x</b>",
        "file:///etc/passwd",
        "tel:+123456",
        "custom+app.v2-x:open",
    ] {
        assert!(!is_safe_url(url), "{} should be unsafe", url);
    }
}

#[test]
fn browser_ignored_characters_do_not_hide_a_scheme() {
    assert!(!is_safe_url("  javascript:alert(1)"));
    assert!(!is_safe_url("java\tscript:alert(1)"));
    assert!(!is_safe_url("\u{1}javascript:alert(1)"));
}

#[test]
fn protocol_relative_urls_count_as_relative() {
    assert!(is_safe_url("//cdn.example.com/app.js"));
}

#[test]
fn checker_reports_the_offending_url() {
    let verdict = UrlChecker.validate("ftp://example.com");
    assert_eq!(
        verdict.violation(),
        Some(&Violation::UnsafeUrl("ftp://example.com".to_string()))
    );
    assert_eq!(verdict.reason().as_deref(), Some("unsafe URLs"));
}
