// src/handlers/sanitize.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use crate::{error::AppError, rules::HtmlPolicy, utils::html::clean_html};

/// Echoes a JSON body. The sanitization middleware has already rewritten it,
/// so the response shows exactly what handlers receive.
pub async fn fields(Json(payload): Json<Value>) -> impl IntoResponse {
    Json(payload)
}

/// DTO for cleaning HTML.
#[derive(Debug, Deserialize, Validate)]
pub struct CleanHtmlRequest {
    #[validate(length(max = 100000, message = "HTML must be at most 100000 chars"))]
    pub html: String,
}

/// Repairs HTML instead of rejecting it, using the active allow-lists.
pub async fn clean(
    State(policy): State<Arc<HtmlPolicy>>,
    Json(payload): Json<CleanHtmlRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(Json(json!({ "html": clean_html(&policy, &payload.html) })))
}

/// Publishes the active allow-list tables.
pub async fn policy(State(policy): State<Arc<HtmlPolicy>>) -> impl IntoResponse {
    Json(policy.as_ref().clone())
}
