use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::routes::images::find_image;
use crate::services::prediction::Detection;
use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct PredictionResponse {
    image_id: Uuid,
    predictions: Vec<Detection>,
}

#[utoipa::path(
    post,
    path = "/predict/{image_id}",
    params(
        ("image_id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Detections for the image", body = PredictionResponse),
        (status = 404, description = "Image not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Prediction"
)]
pub async fn predict(
    State(state): State<AppState>,
    Path(image_id): Path<Uuid>,
) -> Result<Json<PredictionResponse>, AppError> {
    let image = find_image(&state.db, image_id).await?;

    let predictions = state.predictor.predict(&image).await?;

    Ok(Json(PredictionResponse {
        image_id,
        predictions,
    }))
}
