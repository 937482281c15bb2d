use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::rules::{FileCategory, MessageCatalog, Verdict};

/// DTO for checking a single value against one rule.
#[derive(Debug, Deserialize, Validate)]
pub struct CheckValueRequest {
    /// Field name used in the rendered message. Defaults to "content".
    #[validate(length(min = 1, max = 64, message = "Attribute must be between 1 and 64 chars"))]
    pub attribute: Option<String>,

    /// Any JSON value; only strings are inspected.
    pub value: Value,
}

impl CheckValueRequest {
    pub fn attribute(&self) -> &str {
        self.attribute.as_deref().unwrap_or("content")
    }
}

/// DTO for checking one URL.
#[derive(Debug, Deserialize, Validate)]
pub struct CheckUrlRequest {
    #[validate(length(max = 2048, message = "URL must be at most 2048 chars"))]
    pub url: String,
}

/// Result of one rule invocation as sent to clients.
#[derive(Debug, Serialize)]
pub struct VerdictResponse {
    pub valid: bool,
    /// Category code, e.g. `script_content_detected`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Rendered user-facing message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<FileCategory>,
}

impl VerdictResponse {
    pub fn new(verdict: &Verdict, attribute: &str, messages: &MessageCatalog) -> Self {
        Self {
            valid: verdict.is_valid(),
            code: verdict.category().map(|c| c.code()),
            reason: verdict.reason(),
            message: verdict
                .category()
                .map(|category| messages.render(category, attribute)),
            category: None,
        }
    }
}
