use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

/// Which rule guards a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRule {
    /// Sanitised only.
    Plain,
    /// No markup at all.
    SafeText,
    /// Limited-formatting HTML.
    RichText,
    /// Script and protocol detection only.
    NoScript,
    Url,
}

/// Declaration of one field: its rule and whether it is secret.
/// Secret fields are not trimmed and never echoed back.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldDecl {
    pub rule: FieldRule,
    #[serde(default)]
    pub secret: bool,
}

/// DTO for validating a whole form submission.
#[derive(Debug, Deserialize, Validate)]
pub struct ValidateFieldsRequest {
    pub fields: Map<String, Value>,

    #[validate(custom(function = validate_schema_size))]
    pub schema: BTreeMap<String, FieldDecl>,
}

impl ValidateFieldsRequest {
    pub fn secret_names(&self) -> impl Iterator<Item = &str> {
        self.schema
            .iter()
            .filter(|(_, decl)| decl.secret)
            .map(|(name, _)| name.as_str())
    }
}

/// Bounds the per-request work a single submission can ask for.
fn validate_schema_size(
    schema: &BTreeMap<String, FieldDecl>,
) -> Result<(), ValidationError> {
    if schema.is_empty() {
        return Err(ValidationError::new("empty_schema"));
    }
    if schema.len() > 200 || schema.keys().any(|name| name.is_empty() || name.len() > 64) {
        return Err(ValidationError::new("schema_too_large"));
    }
    Ok(())
}

/// Outcome of a form validation.
#[derive(Debug, Serialize)]
pub struct ValidateFieldsResponse {
    pub valid: bool,
    /// Sanitised values, secret fields omitted.
    pub fields: Map<String, Value>,
    pub errors: BTreeMap<String, Vec<ValidationError>>,
}
