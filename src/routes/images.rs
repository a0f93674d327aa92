use std::path::Path as FsPath;

use axum::{
    extract::{
        multipart::{Multipart, MultipartError},
        Path, State,
    },
    http::StatusCode,
    response::Json,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::image::{self, Entity as Image};
use crate::error::AppError;
use crate::routes::projects::find_project;
use crate::routes::StatusResponse;
use crate::services::storage::FileStorage;
use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageResponse {
    id: Uuid,
    /// Name the file was uploaded under.
    filename: String,
    /// Where the stored file is served from.
    url: String,
}

impl ImageResponse {
    fn new(storage: &FileStorage, image: image::Model) -> Self {
        let url = storage.public_url(image.project_id, &image.file_path);
        ImageResponse {
            id: image.id,
            filename: image.filename,
            url,
        }
    }
}

pub(crate) async fn find_image(
    db: &DatabaseConnection,
    image_id: Uuid,
) -> Result<image::Model, AppError> {
    Image::find_by_id(image_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Image"))
}

/// Body limit violations keep their 413; anything else is malformed input.
fn multipart_error(context: &str, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{context}: {}", e.body_text()))
    } else {
        AppError::Validation(format!("{context}: {}", e.body_text()))
    }
}

/// Store one upload and record it. Each image is committed on its own.
async fn store_image(
    state: &AppState,
    project_id: Uuid,
    filename: String,
    data: &[u8],
) -> Result<image::Model, AppError> {
    let path = state.storage.save(project_id, &filename, data).await?;

    let image = image::ActiveModel {
        id: Set(Uuid::new_v4()),
        filename: Set(filename),
        file_path: Set(path.to_string_lossy().into_owned()),
        project_id: Set(project_id),
        created_at: Set(chrono::Utc::now().naive_utc()),
    };

    match image.insert(&state.db).await {
        Ok(saved) => Ok(saved),
        Err(e) => {
            if let Err(cleanup) = state.storage.remove_file(&path).await {
                tracing::warn!(path = %path.display(), error = %cleanup, "failed to remove orphaned upload");
            }
            Err(e.into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/projects/{project_id}/images",
    params(
        ("project_id" = Uuid, Path, description = "Project ID")
    ),
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "One or more `files` parts"),
    responses(
        (status = 201, description = "Images stored", body = [ImageResponse]),
        (status = 404, description = "Project not found"),
        (status = 413, description = "Upload exceeds the size limit"),
        (status = 422, description = "No files or invalid multipart data"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Images"
)]
pub async fn upload_images(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<ImageResponse>>), AppError> {
    find_project(&state.db, project_id).await?;

    let mut images = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart data", e))?
    {
        if !matches!(field.name(), Some("files") | Some("file")) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read upload", e))?;

        let saved = store_image(&state, project_id, filename, &data).await?;
        tracing::info!(%project_id, image_id = %saved.id, file = %saved.filename, size = data.len(), "image uploaded");
        images.push(ImageResponse::new(&state.storage, saved));
    }

    if images.is_empty() {
        return Err(AppError::Validation("No files provided".to_string()));
    }

    Ok((StatusCode::CREATED, Json(images)))
}

#[utoipa::path(
    get,
    path = "/projects/{project_id}/images",
    params(
        ("project_id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Images of the project", body = [ImageResponse]),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Images"
)]
pub async fn list_images(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<ImageResponse>>, AppError> {
    find_project(&state.db, project_id).await?;

    let images = Image::find()
        .filter(image::Column::ProjectId.eq(project_id))
        .order_by_asc(image::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(
        images
            .into_iter()
            .map(|img| ImageResponse::new(&state.storage, img))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/images/{image_id}",
    params(
        ("image_id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image details", body = ImageResponse),
        (status = 404, description = "Image not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Images"
)]
pub async fn get_image(
    State(state): State<AppState>,
    Path(image_id): Path<Uuid>,
) -> Result<Json<ImageResponse>, AppError> {
    let image = find_image(&state.db, image_id).await?;
    Ok(Json(ImageResponse::new(&state.storage, image)))
}

#[utoipa::path(
    delete,
    path = "/images/{image_id}",
    params(
        ("image_id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image and its annotations deleted", body = StatusResponse),
        (status = 404, description = "Image not found"),
        (status = 500, description = "Stored file could not be removed")
    ),
    tag = "Images"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    Path(image_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    let image = find_image(&state.db, image_id).await?;

    // A file that is already gone is fine; any other failure keeps the row.
    state.storage.remove_file(FsPath::new(&image.file_path)).await?;

    Image::delete_by_id(image.id).exec(&state.db).await?;

    tracing::info!(%image_id, project_id = %image.project_id, "image deleted");
    Ok(Json(StatusResponse::deleted()))
}
