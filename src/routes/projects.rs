use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::project::{self, Entity as Project};
use crate::error::AppError;
use crate::extractors::AppJson;
use crate::routes::StatusResponse;
use crate::services::cleanup::CleanupService;
use crate::state::AppState;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateProjectRequest {
    name: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateProjectRequest {
    name: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectResponse {
    id: Uuid,
    name: String,
}

impl From<project::Model> for ProjectResponse {
    fn from(project: project::Model) -> Self {
        ProjectResponse {
            id: project.id,
            name: project.name,
        }
    }
}

pub(crate) async fn find_project(
    db: &DatabaseConnection,
    project_id: Uuid,
) -> Result<project::Model, AppError> {
    Project::find_by_id(project_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Project"))
}

#[utoipa::path(
    post,
    path = "/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created successfully", body = ProjectResponse),
        (status = 422, description = "Invalid request body"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Projects"
)]
pub async fn create_project(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), AppError> {
    let project = project::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        created_at: Set(chrono::Utc::now().naive_utc()),
    };

    let created_project = project.insert(&state.db).await?;

    tracing::info!(project_id = %created_project.id, "Project '{}' created", created_project.name);
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(created_project))))
}

#[utoipa::path(
    get,
    path = "/projects",
    responses(
        (status = 200, description = "All projects", body = [ProjectResponse]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Projects"
)]
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, AppError> {
    let projects = Project::find()
        .order_by_asc(project::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let responses: Vec<ProjectResponse> = projects.into_iter().map(ProjectResponse::from).collect();
    Ok(Json(responses))
}

#[utoipa::path(
    get,
    path = "/projects/{project_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project details", body = ProjectResponse),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Projects"
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ProjectResponse>, AppError> {
    let project = find_project(&state.db, project_id).await?;
    Ok(Json(ProjectResponse::from(project)))
}

#[utoipa::path(
    patch,
    path = "/projects/{project_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID")
    ),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated successfully", body = ProjectResponse),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Projects"
)]
pub async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    let project = find_project(&state.db, project_id).await?;

    let Some(name) = payload.name else {
        return Ok(Json(ProjectResponse::from(project)));
    };

    let mut active_project = project.into_active_model();
    active_project.name = Set(name);
    let updated_project = active_project.update(&state.db).await?;

    Ok(Json(ProjectResponse::from(updated_project)))
}

#[utoipa::path(
    delete,
    path = "/projects/{project_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project, its images and annotations deleted", body = StatusResponse),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Projects"
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    let project = find_project(&state.db, project_id).await?;

    CleanupService::new(state.db.clone(), state.storage.clone())
        .delete_project(&project)
        .await?;

    Ok(Json(StatusResponse::deleted()))
}
