// src/handlers/upload.rs

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::validation::VerdictResponse,
    rules::{FileUploadRule, Rule, UploadedFile},
    state::AppState,
    utils::sanitize::sanitize_str,
};

/// Validates an uploaded file.
///
/// Multipart fields:
/// * `file`: the upload itself.
/// * `mimes`: comma-separated declared allow-list (`jpg,png` or `image/png`),
///   which also selects the category. Optional; defaults to document.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut declared: Vec<String> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("mimes") => {
                let text = sanitize_str(&field.text().await?, false);
                declared.extend(
                    text.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                );
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::BadRequest("Missing 'file' field".to_string()))?;

    let rule = FileUploadRule::for_declared(&declared);
    let verdict = rule.validate(&file);

    let status = if verdict.is_valid() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    let mut body = VerdictResponse::new(&verdict, "file", &state.messages);
    body.category = Some(rule.category());

    Ok((status, Json(body)))
}
