// src/rules/messages.rs

use std::{borrow::Cow, collections::HashMap};

use validator::ValidationError;

use super::{Violation, ViolationCategory};

const PLACEHOLDER: &str = ":attribute";

/// User-facing message templates, one per failure category.
///
/// Templates contain an `:attribute` placeholder that is replaced with the
/// humanised field name. Swap templates out to translate.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    templates: HashMap<ViolationCategory, String>,
}

impl MessageCatalog {
    pub fn with_template(mut self, category: ViolationCategory, template: impl Into<String>) -> Self {
        self.templates.insert(category, template.into());
        self
    }

    pub fn template(&self, category: ViolationCategory) -> &str {
        self.templates
            .get(&category)
            .map(String::as_str)
            .unwrap_or("The :attribute is invalid.")
    }

    pub fn render(&self, category: ViolationCategory, attribute: &str) -> String {
        self.template(category)
            .replace(PLACEHOLDER, &humanize(attribute))
    }

    /// Converts a violation on `attribute` into a `validator` error carrying the
    /// category code, the rendered message and the raw reason.
    pub fn validation_error(&self, violation: &Violation, attribute: &str) -> ValidationError {
        let category = violation.category();
        let mut error = ValidationError::new(category.code())
            .with_message(Cow::Owned(self.render(category, attribute)));
        error.add_param(Cow::Borrowed("reason"), &violation.to_string());
        error
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        let templates = ViolationCategory::ALL
            .into_iter()
            .map(|category| {
                let template = match category {
                    ViolationCategory::ScriptContentDetected => {
                        "The :attribute contains potentially dangerous content."
                    }
                    ViolationCategory::Base64DataUriRejected => {
                        "The :attribute contains an embedded data URI, which is not allowed."
                    }
                    ViolationCategory::MalformedHtml => {
                        "The :attribute contains invalid HTML structure."
                    }
                    ViolationCategory::DisallowedTag => {
                        "The :attribute contains HTML tags that are not allowed."
                    }
                    ViolationCategory::DisallowedAttribute => {
                        "The :attribute contains HTML attributes that are not allowed."
                    }
                    ViolationCategory::UnsafeUrl => "The :attribute contains unsafe URLs.",
                    ViolationCategory::UnsafeText => "The :attribute may not contain HTML.",
                    ViolationCategory::UnsafeFile => "The :attribute failed the security check.",
                    ViolationCategory::Unverifiable => "The :attribute could not be verified.",
                };
                (category, template.to_string())
            })
            .collect();

        Self { templates }
    }
}

/// `password_confirmation` → `password confirmation`.
fn humanize(attribute: &str) -> String {
    attribute.replace(['_', '-'], " ").trim().to_string()
}
