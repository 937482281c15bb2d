// src/handlers/validation.rs

use std::collections::BTreeMap;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::Value;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        field::{FieldRule, ValidateFieldsRequest, ValidateFieldsResponse},
        validation::{CheckUrlRequest, CheckValueRequest, VerdictResponse},
    },
    rules::{RichTextRule, Rule, SafeTextRule, ScriptDetector, UrlChecker, Verdict},
    state::AppState,
    utils::sanitize::sanitize_fields,
};

fn respond(
    verdict: &Verdict,
    attribute: &str,
    state: &AppState,
) -> (StatusCode, Json<VerdictResponse>) {
    let status = if verdict.is_valid() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (status, Json(VerdictResponse::new(verdict, attribute, &state.messages)))
}

/// Validates a rich-text value (limited-formatting HTML).
pub async fn rich_text(
    State(state): State<AppState>,
    Json(payload): Json<CheckValueRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;

    let rule = RichTextRule::new(state.policy.clone());
    let verdict = rule.check(payload.attribute(), &payload.value);

    Ok(respond(&verdict, payload.attribute(), &state))
}

/// Validates a plain-text value that must not contain markup.
pub async fn safe_text(
    State(state): State<AppState>,
    Json(payload): Json<CheckValueRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;

    let verdict = Rule::<Value>::validate(&SafeTextRule, &payload.value);

    Ok(respond(&verdict, payload.attribute(), &state))
}

/// Runs only the script/protocol detector.
pub async fn script(
    State(state): State<AppState>,
    Json(payload): Json<CheckValueRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;

    let verdict = Rule::<Value>::validate(&ScriptDetector, &payload.value);

    Ok(respond(&verdict, payload.attribute(), &state))
}

/// Classifies a single URL.
pub async fn url(
    State(state): State<AppState>,
    Json(payload): Json<CheckUrlRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;

    let verdict = Rule::<str>::validate(&UrlChecker, &payload.url);

    Ok(respond(&verdict, "url", &state))
}

/// Validates a whole form submission.
///
/// Fields are sanitised with the schema's secret flags, then each declared field
/// runs its rule. Undeclared fields are sanitised and echoed but not checked.
/// Answers 200 when every field passes, 422 with per-field errors otherwise.
pub async fn fields(
    State(state): State<AppState>,
    Json(payload): Json<ValidateFieldsRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;

    let secrets = state.secrets.with_declared(payload.secret_names());
    let mut sanitized = sanitize_fields(payload.fields, &secrets);
    let rich_text = RichTextRule::new(state.policy.clone());

    let mut errors = BTreeMap::new();
    for (name, decl) in &payload.schema {
        let Some(value) = sanitized.get(name) else {
            continue;
        };

        let verdict = match decl.rule {
            FieldRule::Plain => Verdict::pass(),
            FieldRule::SafeText => Rule::<Value>::validate(&SafeTextRule, value),
            FieldRule::RichText => rich_text.check(name, value),
            FieldRule::NoScript => Rule::<Value>::validate(&ScriptDetector, value),
            FieldRule::Url => Rule::<Value>::validate(&UrlChecker, value),
        };

        if let Some(violation) = verdict.violation() {
            tracing::debug!(field = %name, code = violation.category().code(), "field rejected");
            errors.insert(
                name.clone(),
                vec![state.messages.validation_error(violation, name)],
            );
        }
    }

    sanitized.retain(|name, _| !secrets.is_secret(name));

    let valid = errors.is_empty();
    let status = if valid {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };

    Ok((
        status,
        Json(ValidateFieldsResponse {
            valid,
            fields: sanitized,
            errors,
        }),
    ))
}
