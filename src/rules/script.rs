// src/rules/script.rs

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{Rule, Verdict, Violation};

// `regex` guarantees linear-time matching, so adversarial input cannot
// trigger catastrophic backtracking in any of these.
static SCRIPT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("script tag pattern"));
static JAVASCRIPT_PROTOCOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)javascript\s*:").expect("javascript pattern"));
static EVENT_HANDLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bon\w+\s*=").expect("event handler pattern"));
static BASE64_DATA_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)data:[^;]*;base64").expect("data uri pattern"));
static VBSCRIPT_PROTOCOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)vbscript\s*:").expect("vbscript pattern"));

/// Pattern-based rejection of inline script vectors.
///
/// Checks run in a fixed order and the first hit is reported:
/// script blocks, `javascript:`, inline `on*=` handlers, base64 `data:` URIs,
/// then `vbscript:`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptDetector;

impl ScriptDetector {
    pub fn detect(&self, value: &str) -> Verdict {
        let checks: [(&Lazy<Regex>, Violation); 5] = [
            (&SCRIPT_TAG, Violation::ScriptTag),
            (&JAVASCRIPT_PROTOCOL, Violation::JavascriptProtocol),
            (&EVENT_HANDLER, Violation::EventHandler),
            (&BASE64_DATA_URI, Violation::Base64DataUri),
            (&VBSCRIPT_PROTOCOL, Violation::VbscriptProtocol),
        ];

        checks
            .into_iter()
            .find(|(pattern, _)| pattern.is_match(value))
            .map_or_else(Verdict::pass, |(_, violation)| Verdict::fail(violation))
    }
}

impl Rule<str> for ScriptDetector {
    fn validate(&self, value: &str) -> Verdict {
        self.detect(value)
    }
}

/// Only strings are inspected; any other JSON value passes.
impl Rule<Value> for ScriptDetector {
    fn validate(&self, value: &Value) -> Verdict {
        match value {
            Value::String(s) => self.detect(s),
            _ => Verdict::pass(),
        }
    }
}
