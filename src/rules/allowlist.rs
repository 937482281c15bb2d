// src/rules/allowlist.rs

use std::{collections::BTreeSet, sync::Arc};

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Fragment, HtmlPolicy, Rule, Verdict, Violation};

/// Opening, self-closing and closing tags alike.
static TAG_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?([a-z][a-z0-9]*)\b[^>]*>").expect("tag name pattern"));

/// Distinct lowercase tag names appearing in raw markup.
pub fn extract_tag_names(raw: &str) -> BTreeSet<String> {
    TAG_NAME
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
        .collect()
}

/// Name-level tag and attribute allow-listing against an [`HtmlPolicy`].
///
/// Attribute values are not inspected here.
#[derive(Debug, Clone)]
pub struct AllowlistEnforcer {
    policy: Arc<HtmlPolicy>,
}

impl AllowlistEnforcer {
    pub fn new(policy: Arc<HtmlPolicy>) -> Self {
        Self { policy }
    }

    /// Parses `fragment` and enforces the allow-list on it.
    pub fn enforce(&self, fragment: &str) -> Verdict {
        match Fragment::parse(fragment) {
            Ok(parsed) => self.enforce_parsed(fragment, &parsed),
            Err(violation) => Verdict::fail(violation),
        }
    }

    /// Enforces the allow-list on an already parsed fragment.
    /// `raw` is the source the fragment was parsed from.
    pub fn enforce_parsed(&self, raw: &str, fragment: &Fragment) -> Verdict {
        if let Some(tag) = extract_tag_names(raw)
            .into_iter()
            .find(|tag| !self.policy.is_tag_allowed(tag))
        {
            return Verdict::fail(Violation::DisallowedTag(tag));
        }

        // The parser can synthesise names the raw scan never saw (`<p<`, ...).
        for element in fragment.elements() {
            if !element.is_shell() && !self.policy.is_tag_allowed(&element.name) {
                return Verdict::fail(Violation::DisallowedTag(element.name.clone()));
            }

            // Shell elements have no map entry, so attributes smuggled onto them fail too.
            if let Some((attribute, _)) = element
                .attributes
                .iter()
                .find(|(attribute, _)| !self.policy.is_attribute_allowed(&element.name, attribute))
            {
                return Verdict::fail(Violation::DisallowedAttribute {
                    tag: element.name.clone(),
                    attribute: attribute.clone(),
                });
            }
        }

        Verdict::pass()
    }
}

impl Rule<str> for AllowlistEnforcer {
    fn validate(&self, value: &str) -> Verdict {
        self.enforce(value)
    }
}
