// src/rules/url.rs

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use url::Url;
use validator::ValidateEmail;

use super::{Rule, Verdict, Violation};

static SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("scheme pattern"));

/// Classifies a URL as safe or unsafe by its scheme. Never fails.
///
/// * `/…` and `#…` are relative and safe.
/// * `mailto:` is safe when the rest is a valid email address.
/// * `http(s)://` is safe when the whole string parses as an absolute URL with a host.
/// * any other `scheme:` is unsafe.
/// * everything else is a plain relative reference and safe.
pub fn is_safe_url(url: &str) -> bool {
    let url = normalize(url);

    if url.starts_with('/') || url.starts_with('#') {
        return true;
    }

    if let Some(address) = strip_prefix_ignore_case(&url, "mailto:") {
        return address.to_owned().validate_email();
    }

    if strip_prefix_ignore_case(&url, "http://").is_some()
        || strip_prefix_ignore_case(&url, "https://").is_some()
    {
        return Url::parse(&url).is_ok_and(|parsed| parsed.has_host());
    }

    !SCHEME.is_match(&url)
}

/// Browsers drop surrounding control characters and embedded tabs/newlines
/// before resolving a URL, so `" java\tscript:"` must classify like `javascript:`.
fn normalize(url: &str) -> String {
    url.trim_matches(|c: char| c <= ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &value[prefix.len()..])
}

/// [`is_safe_url`] as a rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlChecker;

impl Rule<str> for UrlChecker {
    fn validate(&self, value: &str) -> Verdict {
        if is_safe_url(value) {
            Verdict::pass()
        } else {
            Verdict::fail(Violation::UnsafeUrl(value.to_owned()))
        }
    }
}

impl Rule<Value> for UrlChecker {
    fn validate(&self, value: &Value) -> Verdict {
        match value {
            Value::String(s) => Rule::<str>::validate(self, s),
            _ => Verdict::pass(),
        }
    }
}
