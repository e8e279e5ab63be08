use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};

use crate::adapters::http::{error::ApiError, state::HttpState};
use crate::application::dto::DetectRequest;
use crate::domain::detection::DetectionResult;

pub async fn home() -> &'static str {
    "Wohooo!"
}

/// GET /detect/*image
pub async fn detect_by_path(
    State(st): State<HttpState>,
    image: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<DetectionResult>>, ApiError> {
    let Path(image) = image?;
    let results = st.detection.detect(&image).await?;
    Ok(Json(results))
}

/// POST /detect  {"image": "<ref>"}
pub async fn detect_by_body(
    State(st): State<HttpState>,
    body: Result<Json<DetectRequest>, JsonRejection>,
) -> Result<Json<Vec<DetectionResult>>, ApiError> {
    let Json(req) = body?;
    let image = req
        .image_reference()
        .ok_or_else(|| ApiError::BadRequest("missing 'image' field".into()))?;

    let results = st.detection.detect(image).await?;
    Ok(Json(results))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("not found".into())
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("method not allowed".into())
}
