// src/rules/safe_text.rs

use serde_json::Value;

use super::{Rule, Verdict, Violation};

/// Plain-text fields: no markup at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafeTextRule;

impl Rule<str> for SafeTextRule {
    fn validate(&self, value: &str) -> Verdict {
        if value.contains(['<', '>']) {
            Verdict::fail(Violation::AngleBrackets)
        } else {
            Verdict::pass()
        }
    }
}

impl Rule<Value> for SafeTextRule {
    fn validate(&self, value: &Value) -> Verdict {
        match value {
            Value::String(s) => Rule::<str>::validate(self, s),
            _ => Verdict::pass(),
        }
    }
}
