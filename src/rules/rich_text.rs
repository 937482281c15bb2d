// src/rules/rich_text.rs

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{
    AllowlistEnforcer, Fragment, HtmlPolicy, Rule, ScriptDetector, Verdict, Violation,
    is_safe_url,
};

static URL_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:href|src)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("url attribute pattern")
});

/// Raw `href=`/`src=` values, quoted or not, as written in the source.
pub fn extract_url_attributes(raw: &str) -> Vec<&str> {
    URL_ATTRIBUTE
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str())
        .collect()
}

/// The composite rule for limited-formatting body content.
///
/// Steps run in order and stop at the first failure:
/// 1. script/protocol detection on the raw value
/// 2. structural parse
/// 3. tag and attribute allow-list
/// 4. scheme check of every `href`/`src` value
#[derive(Debug, Clone)]
pub struct RichTextRule {
    detector: ScriptDetector,
    enforcer: AllowlistEnforcer,
}

impl RichTextRule {
    pub fn new(policy: Arc<HtmlPolicy>) -> Self {
        Self {
            detector: ScriptDetector,
            enforcer: AllowlistEnforcer::new(policy),
        }
    }

    /// Validates the value submitted for field `attribute`. Non-strings pass.
    pub fn check(&self, attribute: &str, value: &Value) -> Verdict {
        let verdict = Rule::<Value>::validate(self, value);
        if let Some(violation) = verdict.violation() {
            tracing::debug!(
                field = attribute,
                category = violation.category().code(),
                "rich text rejected: {}",
                violation
            );
        }
        verdict
    }

    pub fn validate_str(&self, value: &str) -> Verdict {
        let verdict = self.detector.detect(value);
        if !verdict.is_valid() {
            return verdict;
        }

        let fragment = match Fragment::parse(value) {
            Ok(fragment) => fragment,
            Err(violation) => return Verdict::fail(violation),
        };

        self.enforcer
            .enforce_parsed(value, &fragment)
            .and_then(|| check_urls(value, &fragment))
    }
}

/// Pattern-extracted values first, then the entity-decoded values the parser
/// already produced, so `&#106;avascript:` cannot slip past the scheme check.
fn check_urls(raw: &str, fragment: &Fragment) -> Verdict {
    let decoded = fragment
        .elements()
        .iter()
        .flat_map(|element| element.attributes.iter())
        .filter(|(name, _)| name == "href" || name == "src")
        .map(|(_, value)| value.as_str());

    extract_url_attributes(raw)
        .into_iter()
        .chain(decoded)
        .find(|url| !is_safe_url(url))
        .map_or_else(Verdict::pass, |url| {
            Verdict::fail(Violation::UnsafeUrl(url.to_owned()))
        })
}

impl Rule<str> for RichTextRule {
    fn validate(&self, value: &str) -> Verdict {
        self.validate_str(value)
    }
}

impl Rule<Value> for RichTextRule {
    fn validate(&self, value: &Value) -> Verdict {
        match value {
            Value::String(s) => self.validate_str(s),
            _ => Verdict::pass(),
        }
    }
}
