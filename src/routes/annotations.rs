use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::annotation::{self, Entity as Annotation};
use crate::error::AppError;
use crate::extractors::AppJson;
use crate::routes::images::find_image;
use crate::routes::StatusResponse;
use crate::state::AppState;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateAnnotationRequest {
    label: String,
    #[schema(minimum = 0.0, maximum = 1.0)]
    x: f64,
    #[schema(minimum = 0.0, maximum = 1.0)]
    y: f64,
    #[schema(minimum = 0.0, maximum = 1.0)]
    width: f64,
    #[schema(minimum = 0.0, maximum = 1.0)]
    height: f64,
}

impl CreateAnnotationRequest {
    fn validate(&self) -> Result<(), AppError> {
        check_unit("x", self.x)?;
        check_unit("y", self.y)?;
        check_unit("width", self.width)?;
        check_unit("height", self.height)
    }
}

/// Partial update; omitted fields keep their stored value.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateAnnotationRequest {
    label: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
}

impl UpdateAnnotationRequest {
    fn validate(&self) -> Result<(), AppError> {
        let fields = [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                check_unit(name, value)?;
            }
        }
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.x.is_none()
            && self.y.is_none()
            && self.width.is_none()
            && self.height.is_none()
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AnnotationResponse {
    id: Uuid,
    image_id: Uuid,
    label: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl From<annotation::Model> for AnnotationResponse {
    fn from(model: annotation::Model) -> Self {
        AnnotationResponse {
            id: model.id,
            image_id: model.image_id,
            label: model.label,
            x: model.x,
            y: model.y,
            width: model.width,
            height: model.height,
        }
    }
}

/// Normalized coordinates must lie in `[0, 1]`. NaN never does.
fn check_unit(field: &str, value: f64) -> Result<(), AppError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{field} must be between 0 and 1, got {value}"
        )))
    }
}

/// Looks up an annotation through its image. An annotation that belongs to a
/// different image is reported as missing.
async fn find_owned_annotation(
    db: &DatabaseConnection,
    image_id: Uuid,
    annotation_id: Uuid,
) -> Result<annotation::Model, AppError> {
    find_image(db, image_id).await?;

    Annotation::find_by_id(annotation_id)
        .one(db)
        .await?
        .filter(|a| a.image_id == image_id)
        .ok_or_else(|| AppError::not_found("Annotation"))
}

#[utoipa::path(
    post,
    path = "/images/{image_id}/annotations",
    params(
        ("image_id" = Uuid, Path, description = "Image ID")
    ),
    request_body = CreateAnnotationRequest,
    responses(
        (status = 201, description = "Annotation created", body = AnnotationResponse),
        (status = 404, description = "Image not found"),
        (status = 422, description = "Missing field or coordinate outside [0, 1]"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Annotations"
)]
pub async fn create_annotation(
    State(state): State<AppState>,
    Path(image_id): Path<Uuid>,
    AppJson(payload): AppJson<CreateAnnotationRequest>,
) -> Result<(StatusCode, Json<AnnotationResponse>), AppError> {
    payload.validate()?;
    find_image(&state.db, image_id).await?;

    let annotation = annotation::ActiveModel {
        id: Set(Uuid::new_v4()),
        label: Set(payload.label),
        x: Set(payload.x),
        y: Set(payload.y),
        width: Set(payload.width),
        height: Set(payload.height),
        image_id: Set(image_id),
        created_at: Set(chrono::Utc::now().naive_utc()),
    };

    let created = annotation.insert(&state.db).await?;

    tracing::info!(%image_id, annotation_id = %created.id, label = %created.label, "annotation created");
    Ok((StatusCode::CREATED, Json(AnnotationResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/images/{image_id}/annotations",
    params(
        ("image_id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Annotations of the image", body = [AnnotationResponse]),
        (status = 404, description = "Image not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Annotations"
)]
pub async fn list_annotations(
    State(state): State<AppState>,
    Path(image_id): Path<Uuid>,
) -> Result<Json<Vec<AnnotationResponse>>, AppError> {
    find_image(&state.db, image_id).await?;

    let annotations = Annotation::find()
        .filter(annotation::Column::ImageId.eq(image_id))
        .order_by_asc(annotation::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(
        annotations.into_iter().map(AnnotationResponse::from).collect(),
    ))
}

#[utoipa::path(
    patch,
    path = "/images/{image_id}/annotations/{annotation_id}",
    params(
        ("image_id" = Uuid, Path, description = "Image ID"),
        ("annotation_id" = Uuid, Path, description = "Annotation ID")
    ),
    request_body = UpdateAnnotationRequest,
    responses(
        (status = 200, description = "Annotation updated", body = AnnotationResponse),
        (status = 404, description = "Image or annotation not found"),
        (status = 422, description = "Coordinate outside [0, 1]"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Annotations"
)]
pub async fn update_annotation(
    State(state): State<AppState>,
    Path((image_id, annotation_id)): Path<(Uuid, Uuid)>,
    AppJson(payload): AppJson<UpdateAnnotationRequest>,
) -> Result<Json<AnnotationResponse>, AppError> {
    payload.validate()?;
    let annotation = find_owned_annotation(&state.db, image_id, annotation_id).await?;

    if payload.is_empty() {
        return Ok(Json(AnnotationResponse::from(annotation)));
    }

    let mut active = annotation.into_active_model();
    if let Some(label) = payload.label {
        active.label = Set(label);
    }
    if let Some(x) = payload.x {
        active.x = Set(x);
    }
    if let Some(y) = payload.y {
        active.y = Set(y);
    }
    if let Some(width) = payload.width {
        active.width = Set(width);
    }
    if let Some(height) = payload.height {
        active.height = Set(height);
    }

    let updated = active.update(&state.db).await?;
    Ok(Json(AnnotationResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/images/{image_id}/annotations/{annotation_id}",
    params(
        ("image_id" = Uuid, Path, description = "Image ID"),
        ("annotation_id" = Uuid, Path, description = "Annotation ID")
    ),
    responses(
        (status = 200, description = "Annotation deleted", body = StatusResponse),
        (status = 404, description = "Image or annotation not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Annotations"
)]
pub async fn delete_annotation(
    State(state): State<AppState>,
    Path((image_id, annotation_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<StatusResponse>, AppError> {
    let annotation = find_owned_annotation(&state.db, image_id, annotation_id).await?;

    Annotation::delete_by_id(annotation.id).exec(&state.db).await?;

    Ok(Json(StatusResponse::deleted()))
}
