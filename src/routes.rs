// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{sanitize, upload, validation},
    state::AppState,
    utils::sanitize::sanitize_json_body,
};

/// Assembles the main application router.
///
/// * Single-value checks and the sanitize echo sit behind the JSON sanitization middleware.
/// * Form validation sanitises itself, because its schema can declare extra secret fields.
/// * Applies global middleware (Trace, CORS, body limit).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let sanitized_routes = Router::new()
        .route("/validate/rich-text", post(validation::rich_text))
        .route("/validate/safe-text", post(validation::safe_text))
        .route("/validate/script", post(validation::script))
        .route("/validate/url", post(validation::url))
        .route("/sanitize/fields", post(sanitize::fields))
        .route("/sanitize/html", post(sanitize::clean))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            sanitize_json_body,
        ));

    let raw_routes = Router::new()
        .route("/validate/fields", post(validation::fields))
        .route("/validate/upload", post(upload::upload))
        .route("/policy", get(sanitize::policy));

    let body_limit = state.config.body_limit;

    Router::new()
        .nest("/api", sanitized_routes.merge(raw_routes))
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
