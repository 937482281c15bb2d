// src/utils/sanitize.rs

use std::collections::BTreeSet;

use axum::{
    body::{self, Body},
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use mime_guess::mime::Mime;
use serde_json::{Map, Value};

use crate::{error::AppError, state::AppState};

const DEFAULT_SECRET_FIELDS: &[&str] = &["password", "password_confirmation", "current_password"];

/// Field names whose values must keep their surrounding whitespace.
///
/// Secrecy is declared per field name, independent of which handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretFields {
    names: BTreeSet<String>,
}

impl SecretFields {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// A copy that also treats `names` as secret.
    pub fn with_declared<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut extended = self.clone();
        extended.names.extend(names.into_iter().map(Into::into));
        extended
    }

    pub fn is_secret(&self, field: &str) -> bool {
        self.names.contains(field)
    }
}

impl Default for SecretFields {
    fn default() -> Self {
        Self::new(DEFAULT_SECRET_FIELDS.iter().copied())
    }
}

/// Normalises one string: NUL bytes removed, `\r\n` and `\r` turned into `\n`,
/// and outer whitespace trimmed unless `secret`.
pub fn sanitize_str(value: &str, secret: bool) -> String {
    let cleaned: String = value.chars().filter(|&c| c != '\0').collect();
    let normalized = cleaned.replace("\r\n", "\n").replace('\r', "\n");

    if secret {
        normalized
    } else {
        normalized.trim_matches(is_trimmable).to_string()
    }
}

/// Unicode whitespace plus the invisible marks browsers paste along with text.
fn is_trimmable(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\u{FEFF}' | '\u{200B}' | '\u{200E}')
}

/// Sanitises every string leaf below `value`. `key` is the field name the value
/// sits under; array elements inherit it.
pub fn sanitize_value(value: Value, key: Option<&str>, secrets: &SecretFields) -> Value {
    match value {
        Value::String(s) => {
            let secret = key.is_some_and(|k| secrets.is_secret(k));
            Value::String(sanitize_str(&s, secret))
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| sanitize_value(item, key, secrets))
                .collect(),
        ),
        Value::Object(fields) => Value::Object(sanitize_fields(fields, secrets)),
        other => other,
    }
}

/// Sanitises a field mapping; structure and non-string values are kept as-is.
pub fn sanitize_fields(fields: Map<String, Value>, secrets: &SecretFields) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(name, value)| {
            let value = sanitize_value(value, Some(&name), secrets);
            (name, value)
        })
        .collect()
}

/// Same media types the `Json` extractor accepts: `application/json` and any
/// `application/*+json`, case-insensitive, parameters ignored.
pub fn json_content_type(headers: &HeaderMap) -> bool {
    let Some(mime) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Mime>().ok())
    else {
        return false;
    };

    mime.type_() == "application"
        && (mime.subtype() == "json" || mime.suffix().is_some_and(|name| name == "json"))
}

/// Axum Middleware: replaces every JSON request body with its sanitised form
/// before any handler or validation rule sees it.
pub async fn sanitize_json_body(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if !json_content_type(req.headers()) {
        return Ok(next.run(req).await);
    }

    let (mut parts, body) = req.into_parts();
    let bytes = body::to_bytes(body, state.config.body_limit)
        .await
        .map_err(|e| AppError::PayloadTooLarge(e.to_string()))?;

    if bytes.is_empty() {
        return Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await);
    }

    let value: Value = serde_json::from_slice(&bytes)?;
    let cleaned = serde_json::to_vec(&sanitize_value(value, None, &state.secrets))
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    parts.headers.remove(header::CONTENT_LENGTH);
    Ok(next.run(Request::from_parts(parts, Body::from(cleaned))).await)
}
