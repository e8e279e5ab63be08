pub mod error;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::adapters::http::state::HttpState;

pub const DEFAULT_BODY_LIMIT: usize = 16 * 1024 * 1024;

pub fn router(state: HttpState, body_limit: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    Router::new()
        .route("/", get(routes::home))
        .route("/detect", post(routes::detect_by_body))
        .route("/detect/*image", get(routes::detect_by_path))
        .fallback(routes::not_found)
        .method_not_allowed_fallback(routes::method_not_allowed)
        // El límite lo aplica el extractor Json, así el 413 sale por ApiError
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
